//! Credentials supplied through the environment.
//!
//! Tokens are only checked for presence; nothing here talks to the
//! providers.

use thiserror::Error;

pub const GITHUB_TOKEN_VAR: &str = "GITHUB_PERSONAL_ACCESS_TOKEN";
pub const SLACK_BOT_TOKEN_VAR: &str = "SLACK_BOT_TOKEN";
pub const SLACK_TEAM_ID_VAR: &str = "SLACK_TEAM_ID";
pub const SLACK_USER_TOKEN_VAR: &str = "SLACK_USER_TOKEN";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Missing required environment variable(s): {}", .0.join(", "))]
    Missing(Vec<&'static str>),
}

/// GitHub personal access token
#[derive(Clone)]
pub struct GitHubCredentials {
    pub token: String,
}

impl GitHubCredentials {
    pub fn from_env() -> Result<Self, CredentialError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CredentialError> {
        let mut missing = Vec::new();
        let token = require(&lookup, GITHUB_TOKEN_VAR, &mut missing);
        if !missing.is_empty() {
            return Err(CredentialError::Missing(missing));
        }
        Ok(Self { token })
    }
}

/// Slack bot token and workspace, plus an optional user token for invites
#[derive(Clone)]
pub struct SlackCredentials {
    pub bot_token: String,
    pub team_id: String,
    pub user_token: Option<String>,
}

impl SlackCredentials {
    pub fn from_env() -> Result<Self, CredentialError> {
        Self::from_lookup(env_lookup)
    }

    /// Every missing variable is reported, not just the first.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CredentialError> {
        let mut missing = Vec::new();
        let bot_token = require(&lookup, SLACK_BOT_TOKEN_VAR, &mut missing);
        let team_id = require(&lookup, SLACK_TEAM_ID_VAR, &mut missing);
        if !missing.is_empty() {
            return Err(CredentialError::Missing(missing));
        }
        Ok(Self {
            bot_token,
            team_id,
            user_token: present(&lookup, SLACK_USER_TOKEN_VAR),
        })
    }

    /// Token used for `conversations.invite`.
    pub fn invite_token(&self) -> &str {
        self.user_token.as_deref().unwrap_or(&self.bot_token)
    }
}

// Tokens must never reach log output.
impl std::fmt::Debug for GitHubCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubCredentials")
            .field("token", &"***")
            .finish()
    }
}

impl std::fmt::Debug for SlackCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackCredentials")
            .field("bot_token", &"***")
            .field("team_id", &self.team_id)
            .field("user_token", &self.user_token.as_ref().map(|_| "***"))
            .finish()
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn present(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).filter(|v| !v.trim().is_empty())
}

fn require(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    missing: &mut Vec<&'static str>,
) -> String {
    present(lookup, name).unwrap_or_else(|| {
        missing.push(name);
        String::new()
    })
}
