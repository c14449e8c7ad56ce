//! Outbound HTTP configuration from TOML (`[http]` section)

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigIssue;

/// Raw HTTP client configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileHttpConfig {
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
    /// `User-Agent` header sent to every API
    pub user_agent: String,
}

impl Default for FileHttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: format!("toolbridge/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl FileHttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.timeout_seconds == 0 {
            issues.push(ConfigIssue::new("http.timeout_seconds", "cannot be 0"));
        }
        if self.user_agent.trim().is_empty() {
            issues.push(ConfigIssue::new("http.user_agent", "cannot be empty"));
        }
        issues
    }
}
