//! Error types for the Slack adapter

use thiserror::Error;
use toolbridge_application::PlatformError;
use toolbridge_domain::tool::ToolFailure;

/// Slack error codes that mean the referenced entity does not exist.
const NOT_FOUND_CODES: [&str; 4] = [
    "channel_not_found",
    "user_not_found",
    "thread_not_found",
    "message_not_found",
];

/// Errors that can occur when calling the Slack Web API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlackError {
    /// The request did not complete (connect, timeout, non-JSON reply)
    #[error("slack api request failed: {0}")]
    ApiRequest(String),

    /// Slack answered `ok: false` with this error code
    #[error("{0}")]
    ApiResponse(String),
}

impl SlackError {
    /// Upstream error code, when Slack answered.
    pub fn code(&self) -> Option<&str> {
        match self {
            SlackError::ApiResponse(code) => Some(code),
            SlackError::ApiRequest(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code().is_some_and(|code| NOT_FOUND_CODES.contains(&code))
    }
}

impl From<reqwest::Error> for SlackError {
    fn from(err: reqwest::Error) -> Self {
        SlackError::ApiRequest(err.to_string())
    }
}

impl From<SlackError> for ToolFailure {
    fn from(err: SlackError) -> Self {
        if err.is_not_found() {
            ToolFailure::not_found(err.to_string())
        } else {
            ToolFailure::external("Slack", err)
        }
    }
}

impl From<SlackError> for PlatformError {
    fn from(err: SlackError) -> Self {
        match err {
            e if e.is_not_found() => PlatformError::NotFound(e.to_string()),
            SlackError::ApiResponse(code) => PlatformError::Rejected(code),
            SlackError::ApiRequest(reason) => PlatformError::Transport(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolbridge_domain::tool::FailureKind;

    #[test]
    fn test_upstream_code_kept_verbatim() {
        let failure = ToolFailure::from(SlackError::ApiResponse("not_in_channel".into()));
        assert_eq!(failure.kind, FailureKind::ExternalServiceError);
        assert_eq!(failure.message, "Slack request failed: not_in_channel");
    }

    #[test]
    fn test_channel_not_found_is_not_found_for_plain_calls() {
        let failure = ToolFailure::from(SlackError::ApiResponse("channel_not_found".into()));
        assert_eq!(failure.kind, FailureKind::NotFound);
    }

    #[test]
    fn test_platform_error_mapping() {
        assert_eq!(
            PlatformError::from(SlackError::ApiResponse("channel_not_found".into())),
            PlatformError::NotFound("channel_not_found".into())
        );
        assert_eq!(
            PlatformError::from(SlackError::ApiResponse("missing_scope".into())),
            PlatformError::Rejected("missing_scope".into())
        );
        assert!(matches!(
            PlatformError::from(SlackError::ApiRequest("timed out".into())),
            PlatformError::Transport(_)
        ));
    }
}
