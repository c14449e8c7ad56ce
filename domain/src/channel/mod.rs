//! Channel access domain
//!
//! Value types for the reconciliation that runs before a channel-scoped chat
//! operation: who the bot is ([`BotIdentity`]), what the channel looks like
//! ([`ChannelInfo`]), and where a run currently stands
//! ([`ChannelAccessState`], recorded in a [`ChannelAccessReport`]).

pub mod entities;
pub mod state;

pub use entities::{BotIdentity, ChannelInfo};
pub use state::{ChannelAccessReport, ChannelAccessState, JoinMethod};
