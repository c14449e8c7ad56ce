//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod chat_platform;
pub mod tool_executor;
pub mod tool_schema;
