//! Slack adapter
//!
//! A Web API client that doubles as the [`ChatPlatformPort`] used by channel
//! reconciliation, plus the Slack tool table.
//!
//! [`ChatPlatformPort`]: toolbridge_application::ChatPlatformPort

mod api;
mod error;
mod tools;

pub use api::{SlackApiClient, SlackData};
pub use error::SlackError;
pub use tools::{SlackExecutor, SlackOperation, register_slack_tools, slack_tools};
