//! Outcome to protocol response conversion.

use serde::Serialize;
use serde_json::json;
use toolbridge_domain::tool::{CallToolResult, FailureKind, Outcome, ToolFailure};

/// JSON-RPC error code for an unknown method or tool
pub const METHOD_NOT_FOUND: i64 = -32601;
/// JSON-RPC error code for missing or malformed parameters
pub const INVALID_PARAMS: i64 = -32602;

/// A JSON-RPC error object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtocolError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ProtocolError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// What a `tools/call` request answers with
#[derive(Debug, Clone, PartialEq)]
pub enum FormattedResponse {
    /// A `result` object, possibly flagged `isError`
    Result(CallToolResult),
    /// A JSON-RPC `error` object
    Error(ProtocolError),
}

/// Folds an [`Outcome`] into the response shape of one adapter.
#[derive(Debug, Clone)]
pub struct ResponseFormatter {
    adapter_label: String,
}

impl ResponseFormatter {
    /// `adapter_label` prefixes error texts, e.g. `"Slack"`.
    pub fn new(adapter_label: impl Into<String>) -> Self {
        Self {
            adapter_label: adapter_label.into(),
        }
    }

    pub fn adapter_label(&self) -> &str {
        &self.adapter_label
    }

    pub fn format(&self, outcome: Outcome) -> FormattedResponse {
        match outcome {
            Outcome::Success(success) => {
                let text = match success.confirmation {
                    Some(text) => text,
                    None => render_value(&success.value),
                };
                FormattedResponse::Result(CallToolResult::text(text))
            }
            Outcome::Failure(failure) if failure.kind.is_protocol_error() => {
                FormattedResponse::Error(protocol_error(failure))
            }
            Outcome::Failure(failure) => FormattedResponse::Result(CallToolResult::error(
                failure.kind,
                format!("{} error: {}", self.adapter_label, failure.message),
            )),
        }
    }
}

fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn protocol_error(failure: ToolFailure) -> ProtocolError {
    let code = match failure.kind {
        FailureKind::MethodNotFound => METHOD_NOT_FOUND,
        _ => INVALID_PARAMS,
    };
    ProtocolError::new(code, failure.message).with_data(json!({
        "kind": failure.kind,
        "fields": failure.fields,
    }))
}
