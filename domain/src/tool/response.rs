//! Protocol-facing response shapes
//!
//! These mirror the `tools/list` and `tools/call` result objects of the line
//! protocol and serialize with its camelCase field names.

use serde::{Deserialize, Serialize};

use super::value_objects::FailureKind;

/// One entry of a `tools/list` result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// A content block of a `tools/call` result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn as_text(&self) -> &str {
        match self {
            ContentBlock::Text { text } => text,
        }
    }
}

/// Result object of a `tools/call` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    pub content: Vec<ContentBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<FailureKind>,
}

impl CallToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            is_error: None,
            error_kind: None,
        }
    }

    pub fn error(kind: FailureKind, text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            is_error: Some(true),
            error_kind: Some(kind),
        }
    }

    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }

    /// Concatenated text of all content blocks
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_result_omits_error_fields() {
        let json = serde_json::to_value(CallToolResult::text("done")).unwrap();
        assert_eq!(json, json!({"content": [{"type": "text", "text": "done"}]}));
    }

    #[test]
    fn test_error_result_serialization() {
        let result = CallToolResult::error(FailureKind::NotFound, "KV error: missing");
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["isError"], true);
        assert_eq!(json["errorKind"], "NotFound");
        assert_eq!(json["content"][0]["text"], "KV error: missing");
        assert!(result.is_error());
    }

    #[test]
    fn test_descriptor_uses_camel_case() {
        let descriptor = ToolDescriptor {
            name: "kv_get".into(),
            description: "Get".into(),
            input_schema: json!({"type": "object"}),
        };
        let json = serde_json::to_value(&descriptor).unwrap();
        assert!(json.get("inputSchema").is_some());
    }
}
