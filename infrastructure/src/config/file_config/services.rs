//! Per-adapter service configuration (`[slack]`, `[github]`, `[npm]`)

use serde::{Deserialize, Serialize};
use toolbridge_application::ReconcilerConfig;

use super::{ConfigIssue, check_base_url};

/// Raw Slack configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSlackConfig {
    /// Web API base, without trailing method name
    pub api_base: String,
    /// Wait after joining or inviting before the channel is used
    pub settle_interval_ms: u64,
}

impl Default for FileSlackConfig {
    fn default() -> Self {
        Self {
            api_base: "https://slack.com/api".to_string(),
            settle_interval_ms: 1000,
        }
    }
}

impl FileSlackConfig {
    pub fn reconciler_config(&self) -> ReconcilerConfig {
        ReconcilerConfig::with_settle_interval_ms(self.settle_interval_ms)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        check_base_url("slack.api_base", &self.api_base, &mut issues);
        issues
    }
}

/// Raw GitHub configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGitHubConfig {
    /// REST API base (GitHub Enterprise hosts use `https://<host>/api/v3`)
    pub api_base: String,
}

impl Default for FileGitHubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
        }
    }
}

impl FileGitHubConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        check_base_url("github.api_base", &self.api_base, &mut issues);
        issues
    }
}

/// Raw npm registry configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileNpmConfig {
    pub registry_url: String,
    /// Default number of results for `npm_search`
    pub search_size: u32,
}

impl Default for FileNpmConfig {
    fn default() -> Self {
        Self {
            registry_url: "https://registry.npmjs.org".to_string(),
            search_size: 20,
        }
    }
}

impl FileNpmConfig {
    /// Largest page the registry search endpoint accepts.
    pub const MAX_SEARCH_SIZE: u32 = 250;

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        check_base_url("npm.registry_url", &self.registry_url, &mut issues);
        if self.search_size == 0 || self.search_size > Self::MAX_SEARCH_SIZE {
            issues.push(ConfigIssue::new(
                "npm.search_size",
                format!("must be between 1 and {}", Self::MAX_SEARCH_SIZE),
            ));
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_slack_reconciler_config() {
        let config = FileSlackConfig {
            settle_interval_ms: 40,
            ..FileSlackConfig::default()
        };
        assert_eq!(
            config.reconciler_config().settle_interval,
            Duration::from_millis(40)
        );
    }

    #[test]
    fn test_npm_search_size_bounds() {
        let mut config = FileNpmConfig::default();
        assert!(config.validate().is_empty());
        config.search_size = 0;
        assert_eq!(config.validate()[0].field, "npm.search_size");
        config.search_size = 251;
        assert_eq!(config.validate().len(), 1);
    }

    #[test]
    fn test_base_url_scheme_required() {
        let config = FileGitHubConfig {
            api_base: "api.github.com".into(),
        };
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("http"));
    }
}
