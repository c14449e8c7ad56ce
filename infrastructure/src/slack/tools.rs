//! Slack tools
//!
//! | Tool | Channel-scoped | Web API method |
//! |------|----------------|----------------|
//! | `slack_list_channels` | no | `conversations.list` |
//! | `slack_post_message` | yes | `chat.postMessage` |
//! | `slack_reply_to_thread` | yes | `chat.postMessage` |
//! | `slack_add_reaction` | yes | `reactions.add` |
//! | `slack_get_channel_history` | yes | `conversations.history` |
//! | `slack_get_thread_replies` | yes | `conversations.replies` |
//! | `slack_get_users` | no | `users.list` |
//! | `slack_get_user_profile` | no | `users.profile.get` |
//!
//! Channel-scoped tools name `channel_id` as their channel parameter; the
//! router makes sure the bot is in the channel before they run.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use toolbridge_application::{OperationRegistry, ToolExecutor};
use toolbridge_domain::DomainError;
use toolbridge_domain::tool::{
    Outcome, ParamType, SuccessValue, ToolDefinition, ToolFailure, ToolParameter, ValidatedArgs,
};

use super::api::SlackApiClient;

/// Tool name constants
pub const SLACK_LIST_CHANNELS: &str = "slack_list_channels";
pub const SLACK_POST_MESSAGE: &str = "slack_post_message";
pub const SLACK_REPLY_TO_THREAD: &str = "slack_reply_to_thread";
pub const SLACK_ADD_REACTION: &str = "slack_add_reaction";
pub const SLACK_GET_CHANNEL_HISTORY: &str = "slack_get_channel_history";
pub const SLACK_GET_THREAD_REPLIES: &str = "slack_get_thread_replies";
pub const SLACK_GET_USERS: &str = "slack_get_users";
pub const SLACK_GET_USER_PROFILE: &str = "slack_get_user_profile";

const CHANNEL_PARAM: &str = "channel_id";

/// Largest page Slack returns for list methods
const MAX_PAGE: u32 = 200;
const DEFAULT_LIST_LIMIT: u32 = 100;
const DEFAULT_HISTORY_LIMIT: u32 = 10;

fn channel_parameter() -> ToolParameter {
    ToolParameter::new(CHANNEL_PARAM, "The ID of the channel", true)
}

fn limit_parameter(default: u32) -> ToolParameter {
    ToolParameter::new(
        "limit",
        format!("Maximum number of results (default {}, max {})", default, MAX_PAGE),
        false,
    )
    .with_type(ParamType::Integer)
}

fn cursor_parameter() -> ToolParameter {
    ToolParameter::new("cursor", "Pagination cursor for the next page of results", false)
}

pub fn slack_list_channels_definition() -> ToolDefinition {
    ToolDefinition::new(
        SLACK_LIST_CHANNELS,
        "List public channels in the workspace with pagination",
    )
    .with_parameter(limit_parameter(DEFAULT_LIST_LIMIT))
    .with_parameter(cursor_parameter())
}

pub fn slack_post_message_definition() -> ToolDefinition {
    ToolDefinition::new(SLACK_POST_MESSAGE, "Post a new message to a Slack channel")
        .with_parameter(channel_parameter())
        .with_parameter(ToolParameter::new("text", "The message text to post", true))
        .channel_scoped(CHANNEL_PARAM)
}

pub fn slack_reply_to_thread_definition() -> ToolDefinition {
    ToolDefinition::new(
        SLACK_REPLY_TO_THREAD,
        "Reply to a specific message thread in Slack",
    )
    .with_parameter(channel_parameter())
    .with_parameter(ToolParameter::new(
        "thread_ts",
        "Timestamp of the parent message, e.g. '1234567890.123456'",
        true,
    ))
    .with_parameter(ToolParameter::new("text", "The reply text", true))
    .channel_scoped(CHANNEL_PARAM)
}

pub fn slack_add_reaction_definition() -> ToolDefinition {
    ToolDefinition::new(SLACK_ADD_REACTION, "Add a reaction emoji to a message")
        .with_parameter(channel_parameter())
        .with_parameter(ToolParameter::new(
            "timestamp",
            "Timestamp of the message to react to",
            true,
        ))
        .with_parameter(ToolParameter::new(
            "reaction",
            "Emoji name without colons, e.g. 'thumbsup'",
            true,
        ))
        .channel_scoped(CHANNEL_PARAM)
}

pub fn slack_get_channel_history_definition() -> ToolDefinition {
    ToolDefinition::new(
        SLACK_GET_CHANNEL_HISTORY,
        "Get recent messages from a channel",
    )
    .with_parameter(channel_parameter())
    .with_parameter(limit_parameter(DEFAULT_HISTORY_LIMIT))
    .channel_scoped(CHANNEL_PARAM)
}

pub fn slack_get_thread_replies_definition() -> ToolDefinition {
    ToolDefinition::new(
        SLACK_GET_THREAD_REPLIES,
        "Get all replies in a message thread",
    )
    .with_parameter(channel_parameter())
    .with_parameter(ToolParameter::new(
        "thread_ts",
        "Timestamp of the parent message",
        true,
    ))
    .channel_scoped(CHANNEL_PARAM)
}

pub fn slack_get_users_definition() -> ToolDefinition {
    ToolDefinition::new(
        SLACK_GET_USERS,
        "Get a list of all users in the workspace with their basic profile information",
    )
    .with_parameter(limit_parameter(DEFAULT_LIST_LIMIT))
    .with_parameter(cursor_parameter())
}

pub fn slack_get_user_profile_definition() -> ToolDefinition {
    ToolDefinition::new(
        SLACK_GET_USER_PROFILE,
        "Get detailed profile information for a specific user",
    )
    .with_parameter(ToolParameter::new("user_id", "The ID of the user", true))
}

#[derive(Debug, Deserialize)]
struct PageInput {
    #[serde(default)]
    limit: Option<u32>,
    #[serde(default)]
    cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostMessageInput {
    channel_id: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct ThreadReplyInput {
    channel_id: String,
    thread_ts: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct ReactionInput {
    channel_id: String,
    timestamp: String,
    reaction: String,
}

#[derive(Debug, Deserialize)]
struct HistoryInput {
    channel_id: String,
    #[serde(default)]
    limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ThreadInput {
    channel_id: String,
    thread_ts: String,
}

#[derive(Debug, Deserialize)]
struct UserInput {
    user_id: String,
}

fn clamp_limit(limit: Option<u32>, default: u32) -> u32 {
    limit.unwrap_or(default).clamp(1, MAX_PAGE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlackOperation {
    ListChannels,
    PostMessage,
    ReplyToThread,
    AddReaction,
    ChannelHistory,
    ThreadReplies,
    Users,
    UserProfile,
}

/// Executes one Slack tool through the shared API client.
pub struct SlackExecutor {
    client: Arc<SlackApiClient>,
    op: SlackOperation,
}

impl SlackExecutor {
    pub fn new(client: Arc<SlackApiClient>, op: SlackOperation) -> Self {
        Self { client, op }
    }

    async fn run(&self, args: &ValidatedArgs) -> Result<SuccessValue, ToolFailure> {
        let client = &self.client;
        let data = match self.op {
            SlackOperation::ListChannels => {
                let input: PageInput = args.decode()?;
                client
                    .list_channels(
                        clamp_limit(input.limit, DEFAULT_LIST_LIMIT),
                        input.cursor.as_deref(),
                    )
                    .await?
            }
            SlackOperation::PostMessage => {
                let input: PostMessageInput = args.decode()?;
                client
                    .post_message(&input.channel_id, &input.text, None)
                    .await?
            }
            SlackOperation::ReplyToThread => {
                let input: ThreadReplyInput = args.decode()?;
                client
                    .post_message(&input.channel_id, &input.text, Some(&input.thread_ts))
                    .await?
            }
            SlackOperation::AddReaction => {
                let input: ReactionInput = args.decode()?;
                let data = client
                    .add_reaction(&input.channel_id, &input.timestamp, &input.reaction)
                    .await?;
                return Ok(SuccessValue::new(Value::Object(data)).with_confirmation(format!(
                    "Added reaction '{}' to message {}",
                    input.reaction.trim_matches(':'),
                    input.timestamp
                )));
            }
            SlackOperation::ChannelHistory => {
                let input: HistoryInput = args.decode()?;
                client
                    .channel_history(
                        &input.channel_id,
                        clamp_limit(input.limit, DEFAULT_HISTORY_LIMIT),
                    )
                    .await?
            }
            SlackOperation::ThreadReplies => {
                let input: ThreadInput = args.decode()?;
                client
                    .thread_replies(&input.channel_id, &input.thread_ts)
                    .await?
            }
            SlackOperation::Users => {
                let input: PageInput = args.decode()?;
                client
                    .users(
                        clamp_limit(input.limit, DEFAULT_LIST_LIMIT),
                        input.cursor.as_deref(),
                    )
                    .await?
            }
            SlackOperation::UserProfile => {
                let input: UserInput = args.decode()?;
                client.user_profile(&input.user_id).await?
            }
        };
        Ok(SuccessValue::new(Value::Object(data)))
    }
}

#[async_trait]
impl ToolExecutor for SlackExecutor {
    async fn execute(&self, args: ValidatedArgs) -> Outcome {
        self.run(&args).await.into()
    }
}

/// Every Slack tool with the operation that backs it.
pub fn slack_tools() -> Vec<(ToolDefinition, SlackOperation)> {
    vec![
        (slack_list_channels_definition(), SlackOperation::ListChannels),
        (slack_post_message_definition(), SlackOperation::PostMessage),
        (slack_reply_to_thread_definition(), SlackOperation::ReplyToThread),
        (slack_add_reaction_definition(), SlackOperation::AddReaction),
        (
            slack_get_channel_history_definition(),
            SlackOperation::ChannelHistory,
        ),
        (
            slack_get_thread_replies_definition(),
            SlackOperation::ThreadReplies,
        ),
        (slack_get_users_definition(), SlackOperation::Users),
        (slack_get_user_profile_definition(), SlackOperation::UserProfile),
    ]
}

pub fn register_slack_tools(
    registry: &mut OperationRegistry,
    client: Arc<SlackApiClient>,
) -> Result<(), DomainError> {
    for (definition, op) in slack_tools() {
        registry.register(definition, Arc::new(SlackExecutor::new(client.clone(), op)))?;
    }
    Ok(())
}
