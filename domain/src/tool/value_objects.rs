//! Tool domain value objects: the explicit outcome of every operation
//!
//! Operations never signal failure by panicking. Each one returns an
//! [`Outcome`]: either a [`SuccessValue`] or a [`ToolFailure`] tagged with a
//! stable [`FailureKind`], so the response formatter can render it without
//! looking at message text.

use serde::{Deserialize, Serialize};

/// Stable failure taxonomy.
///
/// | Kind | Raised by |
/// |------|-----------|
/// | `InvalidParams` | argument validation / decoding |
/// | `NotFound` | missing store key, channel, repository, package |
/// | `AccessError` | channel-access reconciliation did not settle |
/// | `ExternalServiceError` | the wrapped third-party call reported failure |
/// | `MethodNotFound` | tool name not in the registry |
/// | `Internal` | anything else, caught at the runner boundary |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    InvalidParams,
    NotFound,
    AccessError,
    ExternalServiceError,
    MethodNotFound,
    Internal,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InvalidParams => "InvalidParams",
            FailureKind::NotFound => "NotFound",
            FailureKind::AccessError => "AccessError",
            FailureKind::ExternalServiceError => "ExternalServiceError",
            FailureKind::MethodNotFound => "MethodNotFound",
            FailureKind::Internal => "Internal",
        }
    }

    /// Kinds reported as protocol errors rather than tool results.
    ///
    /// These are detected before any side effect and describe a malformed
    /// request, not a failed operation.
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, FailureKind::InvalidParams | FailureKind::MethodNotFound)
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure arm of an [`Outcome`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolFailure {
    pub kind: FailureKind,
    pub message: String,
    /// Offending argument names, for `InvalidParams`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

impl ToolFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(FailureKind::InvalidParams, message)
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(FailureKind::NotFound, format!("Not found: {}", resource.into()))
    }

    pub fn access(message: impl Into<String>) -> Self {
        Self::new(FailureKind::AccessError, message)
    }

    /// Wrap an upstream error; the upstream text is kept verbatim.
    pub fn external(service: &str, upstream: impl std::fmt::Display) -> Self {
        Self::new(
            FailureKind::ExternalServiceError,
            format!("{} request failed: {}", service, upstream),
        )
    }

    pub fn method_not_found(name: impl Into<String>) -> Self {
        Self::new(
            FailureKind::MethodNotFound,
            format!("Unknown tool: {}", name.into()),
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Internal, message)
    }
}

impl std::fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::error::Error for ToolFailure {}

/// Success arm of an [`Outcome`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessValue {
    /// Structured result
    pub value: serde_json::Value,
    /// Human-readable confirmation shown instead of the raw value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<String>,
}

impl SuccessValue {
    pub fn new(value: impl Into<serde_json::Value>) -> Self {
        Self {
            value: value.into(),
            confirmation: None,
        }
    }

    pub fn with_confirmation(mut self, text: impl Into<String>) -> Self {
        self.confirmation = Some(text.into());
        self
    }
}

/// Result of executing an operation: exactly one of success or failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Success(SuccessValue),
    Failure(ToolFailure),
}

impl Outcome {
    pub fn success(value: impl Into<serde_json::Value>) -> Self {
        Outcome::Success(SuccessValue::new(value))
    }

    /// Success whose response text is `text` rather than the serialized value.
    pub fn confirmed(value: impl Into<serde_json::Value>, text: impl Into<String>) -> Self {
        Outcome::Success(SuccessValue::new(value).with_confirmation(text))
    }

    pub fn failure(failure: ToolFailure) -> Self {
        Outcome::Failure(failure)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(f) => Some(f.kind),
        }
    }

    pub fn value(&self) -> Option<&serde_json::Value> {
        match self {
            Outcome::Success(s) => Some(&s.value),
            Outcome::Failure(_) => None,
        }
    }

    pub fn as_failure(&self) -> Option<&ToolFailure> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(f) => Some(f),
        }
    }
}

impl From<Result<SuccessValue, ToolFailure>> for Outcome {
    fn from(result: Result<SuccessValue, ToolFailure>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(failure) => Outcome::Failure(failure),
        }
    }
}

impl From<ToolFailure> for Outcome {
    fn from(failure: ToolFailure) -> Self {
        Outcome::Failure(failure)
    }
}
