//! Chat platform port
//!
//! The narrow contract the channel-access reconciler needs from a chat
//! platform client. The Slack adapter implements it; tests use recording
//! mocks.

use async_trait::async_trait;
use thiserror::Error;
use toolbridge_domain::channel::{BotIdentity, ChannelInfo};

/// Errors reported by a chat platform client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The referenced entity does not exist or is not visible
    #[error("Not found: {0}")]
    NotFound(String),

    /// The platform answered but rejected the call (verbatim error code)
    #[error("Platform rejected the request: {0}")]
    Rejected(String),

    /// The call did not reach the platform or the reply was unreadable
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Port for the chat platform operations used by channel reconciliation.
#[async_trait]
pub trait ChatPlatformPort: Send + Sync {
    /// Resolve the identity the adapter acts as.
    async fn identity(&self) -> Result<BotIdentity, PlatformError>;

    /// Fetch channel metadata. `known_member_ids` may be left unset.
    async fn channel_info(&self, channel_id: &str) -> Result<ChannelInfo, PlatformError>;

    /// List the member ids of a channel.
    async fn channel_members(&self, channel_id: &str) -> Result<Vec<String>, PlatformError>;

    /// Join a public channel as the acting identity.
    async fn join(&self, channel_id: &str) -> Result<(), PlatformError>;

    /// Invite `user_id` into a (private) channel. Requires elevated permission.
    async fn invite(&self, channel_id: &str, user_id: &str) -> Result<(), PlatformError>;
}
