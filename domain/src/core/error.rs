//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Unknown tool: {0}")]
    ToolNotFound(String),

    #[error("Invalid tool definition: {0}")]
    InvalidDefinition(String),
}

impl DomainError {
    /// Check if this error means the requested tool does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::ToolNotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_tool_display() {
        let error = DomainError::DuplicateTool("kv_set".to_string());
        assert_eq!(error.to_string(), "Tool already registered: kv_set");
    }

    #[test]
    fn test_is_not_found_check() {
        assert!(DomainError::ToolNotFound("x".into()).is_not_found());
        assert!(!DomainError::DuplicateTool("x".into()).is_not_found());
    }
}
