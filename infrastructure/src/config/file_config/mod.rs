//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly; every section falls back to its default
//! when absent.

mod http;
mod log;
mod services;

pub use http::FileHttpConfig;
pub use log::FileLogConfig;
pub use services::{FileGitHubConfig, FileNpmConfig, FileSlackConfig};

use serde::{Deserialize, Serialize};

/// A single problem found while validating the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Dotted path of the offending key, e.g. `http.timeout_seconds`
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Logging settings
    pub log: FileLogConfig,
    /// Outbound HTTP client settings shared by every adapter
    pub http: FileHttpConfig,
    /// Slack adapter settings
    pub slack: FileSlackConfig,
    /// GitHub adapter settings
    pub github: FileGitHubConfig,
    /// npm adapter settings
    pub npm: FileNpmConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.log.validate());
        issues.extend(self.http.validate());
        issues.extend(self.slack.validate());
        issues.extend(self.github.validate());
        issues.extend(self.npm.validate());
        issues
    }
}

/// Push an issue when a base URL is blank or lacks an http(s) scheme.
pub(crate) fn check_base_url(field: &str, value: &str, issues: &mut Vec<ConfigIssue>) {
    let value = value.trim();
    if value.is_empty() {
        issues.push(ConfigIssue::new(field, "cannot be empty"));
    } else if !(value.starts_with("http://") || value.starts_with("https://")) {
        issues.push(ConfigIssue::new(
            field,
            format!("'{}' must start with http:// or https://", value),
        ));
    }
}
