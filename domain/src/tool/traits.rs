//! Tool domain traits
//!
//! Argument validation is pure: it turns a raw argument map into
//! [`ValidatedArgs`] or a [`ValidationFailure`] that lists every offending
//! field at once. No I/O happens here.

use serde::de::DeserializeOwned;
use serde_path_to_error::Segment;

use super::entities::{ParamType, ToolDefinition, ToolInvocation};
use super::value_objects::ToolFailure;
use crate::core::string::quoted_list;

/// Problem found with a single argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldProblem {
    Missing,
    WrongType { expected: ParamType },
}

/// A named argument that failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub problem: FieldProblem,
}

impl std::fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.problem {
            FieldProblem::Missing => write!(f, "missing required field '{}'", self.field),
            FieldProblem::WrongType { expected } => {
                write!(f, "field '{}' must be {}", self.field, expected)
            }
        }
    }
}

/// Every field that failed validation for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub tool: String,
    pub issues: Vec<FieldIssue>,
}

impl ValidationFailure {
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.issues.iter().map(|i| i.field.as_str())
    }
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let details = self
            .issues
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "Invalid arguments for '{}': {}", self.tool, details)
    }
}

impl std::error::Error for ValidationFailure {}

impl From<ValidationFailure> for ToolFailure {
    fn from(failure: ValidationFailure) -> Self {
        let fields: Vec<String> = failure.fields().map(str::to_string).collect();
        ToolFailure::invalid_params(failure.to_string()).with_fields(fields)
    }
}

/// Arguments that passed validation against a [`ToolDefinition`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedArgs {
    values: serde_json::Map<String, serde_json::Value>,
}

impl ValidatedArgs {
    /// Wrap an argument map without checking it. Intended for tests and for
    /// validators that perform their own checks.
    pub fn from_map(values: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|v| v.as_str())
    }

    /// Get a string argument, failing with `InvalidParams` when absent.
    pub fn require_str(&self, key: &str) -> Result<&str, ToolFailure> {
        self.get_str(key).ok_or_else(|| {
            ToolFailure::invalid_params(format!("missing required field '{}'", key))
                .with_fields([key])
        })
    }

    /// Decode into a typed input struct.
    ///
    /// A value that passed the parameter table but does not fit the target
    /// type (e.g. `-1` for a `u32` limit) is reported against its field.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ToolFailure> {
        let value = serde_json::Value::Object(self.values.clone());
        serde_path_to_error::deserialize(value).map_err(|error| {
            match error.path().iter().next() {
                Some(Segment::Map { key }) => ToolFailure::invalid_params(format!(
                    "field '{}' is malformed: {}",
                    key,
                    error.inner()
                ))
                .with_fields([key.as_str()]),
                _ => ToolFailure::invalid_params(format!("Malformed arguments: {}", error.inner())),
            }
        })
    }

    pub fn into_inner(self) -> serde_json::Map<String, serde_json::Value> {
        self.values
    }
}

/// Validator for tool invocations
pub trait ToolValidator: Send + Sync {
    /// Validate an invocation against its definition
    fn validate(
        &self,
        invocation: &ToolInvocation,
        definition: &ToolDefinition,
    ) -> Result<ValidatedArgs, ValidationFailure>;
}

/// Checks the declarative parameter table of a [`ToolDefinition`].
///
/// All issues are collected before returning. Arguments that the definition
/// does not declare are passed through untouched. A JSON `null` counts as
/// absent.
#[derive(Debug, Clone, Default)]
pub struct DefaultToolValidator;

impl ToolValidator for DefaultToolValidator {
    fn validate(
        &self,
        invocation: &ToolInvocation,
        definition: &ToolDefinition,
    ) -> Result<ValidatedArgs, ValidationFailure> {
        let mut issues = Vec::new();

        for param in &definition.parameters {
            match invocation.arguments.get(&param.name) {
                None | Some(serde_json::Value::Null) => {
                    if param.required {
                        issues.push(FieldIssue {
                            field: param.name.clone(),
                            problem: FieldProblem::Missing,
                        });
                    }
                }
                Some(value) if !param.param_type.accepts(value) => {
                    issues.push(FieldIssue {
                        field: param.name.clone(),
                        problem: FieldProblem::WrongType {
                            expected: param.param_type,
                        },
                    });
                }
                Some(_) => {}
            }
        }

        if !issues.is_empty() {
            return Err(ValidationFailure {
                tool: definition.name.clone(),
                issues,
            });
        }

        let values = invocation
            .arguments
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(ValidatedArgs { values })
    }
}

/// Describe the missing fields of a failure, e.g. for log lines.
pub fn describe_fields(failure: &ValidationFailure) -> String {
    quoted_list(failure.fields())
}
