//! Tool Executor port
//!
//! Defines the interface an adapter implements for each registered tool.

use async_trait::async_trait;
use toolbridge_domain::tool::{Outcome, ValidatedArgs};

/// Port for executing one tool operation.
///
/// Implementations (adapters) live in the infrastructure layer. Side effects
/// (store mutation, outbound calls) happen only here, never during
/// validation or formatting. Failures are returned as
/// [`Outcome::Failure`], not raised.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Execute the operation with already validated arguments.
    async fn execute(&self, args: ValidatedArgs) -> Outcome;
}
