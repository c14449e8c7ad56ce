//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod effect_runner;
pub mod format_response;
pub mod operation_registry;
pub mod reconcile_channel;
pub mod route_request;
