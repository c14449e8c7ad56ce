//! Effect runner: executes a tool operation and normalizes its result.
//!
//! The runner is the boundary where nothing is allowed to escape: whatever
//! happens inside [`ToolExecutor::execute`], the caller receives exactly one
//! [`Outcome`]. A panic in the executor is caught and reported as
//! `Failure { kind: Internal }`.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use toolbridge_domain::tool::{Outcome, ToolFailure, ValidatedArgs};
use tracing::{Instrument, debug, info_span, warn};

use crate::ports::tool_executor::ToolExecutor;

/// Runs executors to completion and folds the result into an [`Outcome`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EffectRunner;

impl EffectRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run `executor` with `args`, waiting for it to finish.
    ///
    /// There are no partial results; the returned outcome is final.
    pub async fn run(
        &self,
        tool_name: &str,
        executor: &Arc<dyn ToolExecutor>,
        args: ValidatedArgs,
    ) -> Outcome {
        let started = Instant::now();
        let span = info_span!("tool", name = %tool_name);

        let result = AssertUnwindSafe(executor.execute(args))
            .catch_unwind()
            .instrument(span)
            .await;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                warn!(tool = %tool_name, panic = %message, "Tool executor panicked");
                Outcome::failure(ToolFailure::internal(format!(
                    "Operation '{}' failed unexpectedly: {}",
                    tool_name, message
                )))
            }
        };

        debug!(
            tool = %tool_name,
            elapsed_ms = started.elapsed().as_millis() as u64,
            failure = ?outcome.failure_kind(),
            "Tool finished"
        );
        outcome
    }
}

/// Extract a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
