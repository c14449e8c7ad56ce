//! Channel access entities

use serde::{Deserialize, Serialize};

/// The identity a chat adapter acts as.
///
/// Resolved once per reconciliation run and never cached, so token or
/// permission changes between calls are always observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotIdentity {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl BotIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Channel metadata as seen by the acting identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub is_private: bool,
    /// Member ids; `None` until membership has been fetched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_member_ids: Option<Vec<String>>,
}

impl ChannelInfo {
    pub fn public(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            is_private: false,
            known_member_ids: None,
        }
    }

    pub fn private(id: impl Into<String>) -> Self {
        Self {
            is_private: true,
            ..Self::public(id)
        }
    }

    pub fn with_members(mut self, members: Vec<String>) -> Self {
        self.known_member_ids = Some(members);
        self
    }

    /// Whether `user_id` is among the known members.
    ///
    /// Returns `None` when membership has not been fetched yet.
    pub fn has_member(&self, user_id: &str) -> Option<bool> {
        self.known_member_ids
            .as_ref()
            .map(|members| members.iter().any(|m| m == user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_member_unknown_until_fetched() {
        let channel = ChannelInfo::public("C1");
        assert_eq!(channel.has_member("U1"), None);
    }

    #[test]
    fn test_has_member() {
        let channel = ChannelInfo::private("G1").with_members(vec!["U1".into(), "U2".into()]);
        assert!(channel.is_private);
        assert_eq!(channel.has_member("U2"), Some(true));
        assert_eq!(channel.has_member("U3"), Some(false));
    }
}
