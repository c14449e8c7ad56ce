//! Application-level configuration.
//!
//! Values here control how use cases behave; they are filled from the
//! infrastructure's file configuration at startup.

use std::time::Duration;

/// Default wait after a join/invite before the channel is treated as usable.
pub const DEFAULT_SETTLE_INTERVAL: Duration = Duration::from_millis(1000);

/// Channel reconciliation behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Unconditional wait after a successful join/invite, absorbing the chat
    /// platform's membership-visibility lag.
    pub settle_interval: Duration,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            settle_interval: DEFAULT_SETTLE_INTERVAL,
        }
    }
}

impl ReconcilerConfig {
    /// Creates a ReconcilerConfig with the settle interval in milliseconds.
    pub fn with_settle_interval_ms(millis: u64) -> Self {
        Self {
            settle_interval: Duration::from_millis(millis),
        }
    }
}
