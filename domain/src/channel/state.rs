//! Channel access state machine
//!
//! ```text
//! Unknown ─▶ IdentityVerified ─▶ ChannelInspected ─┬─▶ MembershipConfirmed ─▶ Settled
//!                                                  └─▶ JoinAttempted ─(settle wait)─▶ Settled
//!
//! any step ─▶ Failed (terminal)
//! ```

use serde::{Deserialize, Serialize};

/// State of one reconciliation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelAccessState {
    Unknown,
    IdentityVerified,
    ChannelInspected,
    MembershipConfirmed,
    JoinAttempted,
    Settled,
    Failed,
}

impl ChannelAccessState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChannelAccessState::Settled | ChannelAccessState::Failed)
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(&self, next: ChannelAccessState) -> bool {
        use ChannelAccessState::*;
        match (self, next) {
            (Settled | Failed, _) => false,
            (_, Failed) => true,
            (Unknown, IdentityVerified) => true,
            (IdentityVerified, ChannelInspected) => true,
            (ChannelInspected, MembershipConfirmed | JoinAttempted) => true,
            (MembershipConfirmed | JoinAttempted, Settled) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for ChannelAccessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ChannelAccessState::Unknown => "unknown",
            ChannelAccessState::IdentityVerified => "identity_verified",
            ChannelAccessState::ChannelInspected => "channel_inspected",
            ChannelAccessState::MembershipConfirmed => "membership_confirmed",
            ChannelAccessState::JoinAttempted => "join_attempted",
            ChannelAccessState::Settled => "settled",
            ChannelAccessState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// How access was obtained when the bot was not already a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinMethod {
    /// Self-join of a public channel
    Join,
    /// Invite into a private channel using the elevated identity
    Invite,
}

/// Record of a reconciliation run.
///
/// `path` lists every state visited, starting at `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelAccessReport {
    pub channel_id: String,
    pub path: Vec<ChannelAccessState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joined_via: Option<JoinMethod>,
}

impl ChannelAccessReport {
    pub fn new(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            path: vec![ChannelAccessState::Unknown],
            bot_id: None,
            joined_via: None,
        }
    }

    pub fn state(&self) -> ChannelAccessState {
        self.path
            .last()
            .copied()
            .unwrap_or(ChannelAccessState::Unknown)
    }

    /// Advance to `next`; illegal transitions are ignored and return `false`.
    pub fn advance(&mut self, next: ChannelAccessState) -> bool {
        if self.state().can_transition_to(next) {
            self.path.push(next);
            true
        } else {
            false
        }
    }

    pub fn is_settled(&self) -> bool {
        self.state() == ChannelAccessState::Settled
    }
}
