use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use toolbridge_application::{ChatPlatformPort, PlatformError};
use toolbridge_domain::channel::{BotIdentity, ChannelInfo};
use tracing::{debug, trace};

use super::error::SlackError;
use crate::config::SlackCredentials;

/// Page size used when walking `conversations.members`
const MEMBERS_PAGE_SIZE: u32 = 200;

/// Response data of a Web API method, minus `ok` and `error`
pub type SlackData = Map<String, Value>;

#[derive(Clone)]
pub struct SlackApiClient {
    http: reqwest::Client,
    api_base: String,
    credentials: SlackCredentials,
}

#[derive(Debug, Clone, Deserialize)]
struct SlackEnvelope<T> {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    data: T,
}

impl<T> SlackEnvelope<T> {
    fn into_result(self, method: &str) -> Result<T, SlackError> {
        if self.ok {
            Ok(self.data)
        } else {
            Err(SlackError::ApiResponse(
                self.error.unwrap_or_else(|| format!("{} failed", method)),
            ))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct AuthTestData {
    user_id: String,
    #[serde(default)]
    user: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ConversationInfoData {
    channel: ConversationInfo,
}

#[derive(Debug, Clone, Deserialize)]
struct ConversationInfo {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    is_private: bool,
}

impl From<ConversationInfo> for ChannelInfo {
    fn from(info: ConversationInfo) -> Self {
        let channel = if info.is_private {
            ChannelInfo::private(info.id)
        } else {
            ChannelInfo::public(info.id)
        };
        ChannelInfo {
            name: info.name,
            ..channel
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ConversationMembersData {
    #[serde(default)]
    members: Vec<String>,
    #[serde(default)]
    response_metadata: ResponseMetadata,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

impl SlackApiClient {
    pub fn new(
        http: reqwest::Client,
        api_base: impl Into<String>,
        credentials: SlackCredentials,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into(),
            credentials,
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), method)
    }

    async fn get_with_token<T: DeserializeOwned>(
        &self,
        method: &str,
        query: &[(&str, String)],
        token: &str,
    ) -> Result<T, SlackError> {
        trace!(method, "Slack GET");
        let response = self
            .http
            .get(self.endpoint(method))
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;
        Self::decode(method, response).await
    }

    async fn post_json_with_token<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &Value,
        token: &str,
    ) -> Result<T, SlackError> {
        trace!(method, "Slack POST");
        let response = self
            .http
            .post(self.endpoint(method))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        Self::decode(method, response).await
    }

    async fn decode<T: DeserializeOwned>(
        method: &str,
        response: reqwest::Response,
    ) -> Result<T, SlackError> {
        let status = response.status();
        if !status.is_success() {
            return Err(SlackError::ApiRequest(format!(
                "{} returned HTTP {}",
                method,
                status.as_u16()
            )));
        }
        let envelope: SlackEnvelope<T> = response.json().await?;
        envelope.into_result(method)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        method: &str,
        query: &[(&str, String)],
    ) -> Result<T, SlackError> {
        self.get_with_token(method, query, &self.credentials.bot_token)
            .await
    }

    async fn post<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T, SlackError> {
        self.post_json_with_token(method, body, &self.credentials.bot_token)
            .await
    }

    pub async fn list_channels(
        &self,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<SlackData, SlackError> {
        let query = paged_query(
            vec![
                ("types", "public_channel".to_string()),
                ("exclude_archived", "true".to_string()),
                ("team_id", self.credentials.team_id.clone()),
            ],
            limit,
            cursor,
        );
        self.get("conversations.list", &query).await
    }

    pub async fn post_message(
        &self,
        channel_id: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<SlackData, SlackError> {
        self.post("chat.postMessage", &message_body(channel_id, text, thread_ts))
            .await
    }

    pub async fn add_reaction(
        &self,
        channel_id: &str,
        timestamp: &str,
        reaction: &str,
    ) -> Result<SlackData, SlackError> {
        let body = json!({
            "channel": channel_id,
            "timestamp": timestamp,
            "name": reaction.trim_matches(':'),
        });
        self.post("reactions.add", &body).await
    }

    pub async fn channel_history(&self, channel_id: &str, limit: u32) -> Result<SlackData, SlackError> {
        let query = [
            ("channel", channel_id.to_string()),
            ("limit", limit.to_string()),
        ];
        self.get("conversations.history", &query).await
    }

    pub async fn thread_replies(&self, channel_id: &str, thread_ts: &str) -> Result<SlackData, SlackError> {
        let query = [
            ("channel", channel_id.to_string()),
            ("ts", thread_ts.to_string()),
        ];
        self.get("conversations.replies", &query).await
    }

    pub async fn users(&self, limit: u32, cursor: Option<&str>) -> Result<SlackData, SlackError> {
        let query = paged_query(
            vec![("team_id", self.credentials.team_id.clone())],
            limit,
            cursor,
        );
        self.get("users.list", &query).await
    }

    pub async fn user_profile(&self, user_id: &str) -> Result<SlackData, SlackError> {
        let query = [
            ("user", user_id.to_string()),
            ("include_labels", "true".to_string()),
        ];
        self.get("users.profile.get", &query).await
    }

    async fn all_members(&self, channel_id: &str) -> Result<Vec<String>, SlackError> {
        let mut all = Vec::new();
        let mut cursor = String::new();
        loop {
            let query = paged_query(
                vec![("channel", channel_id.to_string())],
                MEMBERS_PAGE_SIZE,
                Some(cursor.as_str()),
            );
            let data: ConversationMembersData = self.get("conversations.members", &query).await?;
            all.extend(data.members);
            cursor = data.response_metadata.next_cursor;
            if cursor.trim().is_empty() {
                break;
            }
        }
        Ok(all)
    }
}

#[async_trait]
impl ChatPlatformPort for SlackApiClient {
    async fn identity(&self) -> Result<BotIdentity, PlatformError> {
        let auth: AuthTestData = self.get("auth.test", &[]).await?;
        let identity = BotIdentity::new(auth.user_id);
        Ok(match auth.user {
            Some(name) => identity.with_name(name),
            None => identity,
        })
    }

    async fn channel_info(&self, channel_id: &str) -> Result<ChannelInfo, PlatformError> {
        let data: ConversationInfoData = self
            .get("conversations.info", &[("channel", channel_id.to_string())])
            .await?;
        Ok(data.channel.into())
    }

    async fn channel_members(&self, channel_id: &str) -> Result<Vec<String>, PlatformError> {
        let members = self.all_members(channel_id).await?;
        debug!(channel = %channel_id, count = members.len(), "Fetched channel members");
        Ok(members)
    }

    async fn join(&self, channel_id: &str) -> Result<(), PlatformError> {
        let _: SlackData = self
            .post("conversations.join", &json!({ "channel": channel_id }))
            .await?;
        Ok(())
    }

    async fn invite(&self, channel_id: &str, user_id: &str) -> Result<(), PlatformError> {
        let body = json!({ "channel": channel_id, "users": user_id });
        let _: SlackData = self
            .post_json_with_token("conversations.invite", &body, self.credentials.invite_token())
            .await?;
        Ok(())
    }
}

fn paged_query<'a>(
    mut query: Vec<(&'a str, String)>,
    limit: u32,
    cursor: Option<&str>,
) -> Vec<(&'a str, String)> {
    query.push(("limit", limit.to_string()));
    if let Some(cursor) = cursor.filter(|c| !c.trim().is_empty()) {
        query.push(("cursor", cursor.to_string()));
    }
    query
}

fn message_body(channel_id: &str, text: &str, thread_ts: Option<&str>) -> Value {
    let mut body = json!({
        "channel": channel_id,
        "text": text,
    });
    if let Some(thread_ts) = thread_ts.filter(|v| !v.trim().is_empty()) {
        body["thread_ts"] = json!(thread_ts);
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_base: &str) -> SlackApiClient {
        SlackApiClient::new(
            reqwest::Client::new(),
            api_base,
            SlackCredentials {
                bot_token: "xoxb-test".into(),
                team_id: "T1".into(),
                user_token: None,
            },
        )
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        assert_eq!(
            client("https://slack.com/api/").endpoint("auth.test"),
            "https://slack.com/api/auth.test"
        );
    }

    #[test]
    fn test_envelope_ok_keeps_data() {
        let envelope: SlackEnvelope<AuthTestData> =
            serde_json::from_str(r#"{"ok": true, "user_id": "UBOT", "user": "bridge"}"#).unwrap();
        let data = envelope.into_result("auth.test").unwrap();
        assert_eq!(data.user_id, "UBOT");
        assert_eq!(data.user.as_deref(), Some("bridge"));
    }

    #[test]
    fn test_envelope_error_is_verbatim() {
        let envelope: SlackEnvelope<SlackData> =
            serde_json::from_str(r#"{"ok": false, "error": "not_in_channel"}"#).unwrap();
        assert_eq!(
            envelope.into_result("chat.postMessage"),
            Err(SlackError::ApiResponse("not_in_channel".into()))
        );
    }

    #[test]
    fn test_envelope_error_without_code() {
        let envelope: SlackEnvelope<SlackData> = serde_json::from_str(r#"{"ok": false}"#).unwrap();
        assert_eq!(
            envelope.into_result("reactions.add"),
            Err(SlackError::ApiResponse("reactions.add failed".into()))
        );
    }

    #[test]
    fn test_flattened_data_excludes_envelope_fields() {
        let envelope: SlackEnvelope<SlackData> =
            serde_json::from_str(r#"{"ok": true, "channel": "C1", "ts": "1.2"}"#).unwrap();
        let data = envelope.into_result("chat.postMessage").unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data["ts"], "1.2");
    }

    #[test]
    fn test_conversation_info_to_channel() {
        let data: ConversationInfoData = serde_json::from_str(
            r#"{"channel": {"id": "G1", "name": "secret", "is_private": true}}"#,
        )
        .unwrap();
        let channel: ChannelInfo = data.channel.into();
        assert!(channel.is_private);
        assert_eq!(channel.name.as_deref(), Some("secret"));
        assert!(channel.known_member_ids.is_none());
    }

    #[test]
    fn test_members_page_defaults() {
        let data: ConversationMembersData = serde_json::from_str(r#"{"members": ["U1"]}"#).unwrap();
        assert_eq!(data.members, vec!["U1"]);
        assert!(data.response_metadata.next_cursor.is_empty());
    }

    #[test]
    fn test_paged_query_skips_blank_cursor() {
        let query = paged_query(vec![("team_id", "T1".into())], 50, Some(" "));
        assert_eq!(
            query,
            vec![("team_id", "T1".to_string()), ("limit", "50".to_string())]
        );

        let query = paged_query(Vec::new(), 10, Some("dXNlcjpVMDYx"));
        assert_eq!(query.last(), Some(&("cursor", "dXNlcjpVMDYx".to_string())));
    }

    #[test]
    fn test_message_body_thread() {
        assert!(message_body("C1", "hi", None).get("thread_ts").is_none());
        assert_eq!(message_body("C1", "hi", Some("1.5"))["thread_ts"], "1.5");
    }
}
