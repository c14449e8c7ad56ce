//! Tool domain module
//!
//! Defines what an adapter exposes and what every operation returns.
//!
//! ```text
//! ┌────────────────┐   ┌────────────────┐   ┌──────────────┐   ┌──────────────────┐
//! │ ToolDefinition │──▶│ ToolInvocation │──▶│ ValidatedArgs│──▶│ Outcome          │
//! │ (registry)     │   │ (raw request)  │   │ (typed input)│   │ Success|Failure  │
//! └────────────────┘   └────────────────┘   └──────────────┘   └──────────────────┘
//! ```
//!
//! # Explicit outcomes
//!
//! Operations do not panic or bubble errors to the transport. They return an
//! [`Outcome`], and a failure always carries a [`FailureKind`] from a fixed
//! taxonomy so it can be rendered without parsing its message.
//!
//! # Declarative validation
//!
//! Each [`ToolDefinition`] carries a parameter table (name, type, required).
//! [`DefaultToolValidator`] checks an invocation against that table and lists
//! every missing or mistyped field in a single [`ValidationFailure`]. The same
//! table feeds the JSON Schema published by `tools/list`.
//!
//! # Channel scope
//!
//! A definition marked with [`ToolDefinition::channel_scoped`] names the
//! argument holding a channel id. The request router reconciles channel
//! access for that channel before the operation may run.

pub mod entities;
pub mod response;
pub mod traits;
pub mod value_objects;

pub use entities::{ParamType, ToolDefinition, ToolInvocation, ToolParameter};
pub use response::{CallToolResult, ContentBlock, ToolDescriptor};
pub use traits::{
    DefaultToolValidator, FieldIssue, FieldProblem, ToolValidator, ValidatedArgs,
    ValidationFailure,
};
pub use value_objects::{FailureKind, Outcome, SuccessValue, ToolFailure};
