//! Domain layer for toolbridge
//!
//! This crate contains the core types shared by every adapter. It has no
//! dependencies on I/O, transport or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Typed outcomes
//!
//! Every tool operation returns an [`Outcome`]: a success value or a
//! [`ToolFailure`] tagged with a stable [`FailureKind`].
//!
//! ## Channel access
//!
//! Chat operations that send into or read from a channel first bring the
//! channel's [`ChannelAccessState`] from `Unknown` to `Settled`.

pub mod channel;
pub mod core;
pub mod tool;

// Re-export commonly used types
pub use channel::{BotIdentity, ChannelAccessReport, ChannelAccessState, ChannelInfo, JoinMethod};
pub use core::error::DomainError;
pub use tool::{
    CallToolResult, ContentBlock, DefaultToolValidator, FailureKind, FieldIssue, FieldProblem,
    Outcome, ParamType, SuccessValue, ToolDefinition, ToolDescriptor, ToolFailure,
    ToolInvocation, ToolParameter, ToolValidator, ValidatedArgs, ValidationFailure,
};
