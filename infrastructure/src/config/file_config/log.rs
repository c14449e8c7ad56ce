//! Logging configuration from TOML (`[log]` section)

use serde::{Deserialize, Serialize};

use super::ConfigIssue;

const LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLogConfig {
    /// Level used when neither `-v` nor `RUST_LOG` is given
    pub level: Option<String>,
    /// Write logs to this file instead of stderr
    pub file: Option<String>,
}

impl FileLogConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if let Some(level) = &self.level
            && !LEVELS.contains(&level.to_lowercase().as_str())
        {
            issues.push(ConfigIssue::new(
                "log.level",
                format!("unknown level '{}', expected one of {}", level, LEVELS.join(", ")),
            ));
        }
        if self.file.as_deref().is_some_and(|f| f.trim().is_empty()) {
            issues.push(ConfigIssue::new("log.file", "cannot be empty"));
        }
        issues
    }
}
