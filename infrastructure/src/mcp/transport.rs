//! Classification of inbound lines.

use serde_json::Value;

/// How an inbound JSON object is handled
#[derive(Debug, PartialEq, Eq)]
pub enum MessageKind {
    /// Has `id` and `method`: answered with exactly one response.
    Request,
    /// Has `method` but no `id`: never answered.
    Notification,
    /// Neither a request nor a notification, e.g. a stray response.
    Invalid,
}

/// Classify a JSON-RPC message by inspecting `id` and `method` fields.
///
/// A null `id` counts as absent.
pub fn classify_message(json: &Value) -> MessageKind {
    let has_id = json.get("id").is_some_and(|id| !id.is_null());
    let has_method = json.get("method").and_then(Value::as_str).is_some();

    match (has_id, has_method) {
        (true, true) => MessageKind::Request,
        (false, true) => MessageKind::Notification,
        _ => MessageKind::Invalid,
    }
}
