//! Request routing.
//!
//! [`RequestRouter::call_tool`] takes a decoded invocation through lookup,
//! validation, channel-access reconciliation (channel-scoped tools only) and
//! finally the [`EffectRunner`]. Every step before the runner is free of
//! side effects, so a rejected call never touches the store or the network.

use std::sync::Arc;

use toolbridge_domain::tool::{
    Outcome, ToolDescriptor, ToolFailure, ToolInvocation, traits::describe_fields,
};
use tracing::debug;

use crate::ports::tool_schema::ToolSchemaPort;
use crate::use_cases::effect_runner::EffectRunner;
use crate::use_cases::operation_registry::OperationRegistry;
use crate::use_cases::reconcile_channel::ChannelAccessReconciler;

/// Routes `tools/list` and `tools/call` requests for one adapter.
pub struct RequestRouter {
    registry: Arc<OperationRegistry>,
    schema: Arc<dyn ToolSchemaPort>,
    runner: EffectRunner,
    reconciler: Option<Arc<ChannelAccessReconciler>>,
}

impl RequestRouter {
    pub fn new(registry: Arc<OperationRegistry>, schema: Arc<dyn ToolSchemaPort>) -> Self {
        Self {
            registry,
            schema,
            runner: EffectRunner::new(),
            reconciler: None,
        }
    }

    /// Attach the reconciler guarding channel-scoped tools.
    pub fn with_reconciler(mut self, reconciler: Arc<ChannelAccessReconciler>) -> Self {
        self.reconciler = Some(reconciler);
        self
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// Catalogue of every registered tool, sorted by name.
    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.registry
            .catalogue()
            .map(|definition| self.schema.describe(definition))
            .collect()
    }

    /// Run one tool invocation to a final [`Outcome`].
    pub async fn call_tool(&self, invocation: ToolInvocation) -> Outcome {
        let entry = match self.registry.lookup(&invocation.name) {
            Ok(entry) => entry,
            Err(_) => {
                debug!(tool = %invocation.name, "Unknown tool requested");
                return ToolFailure::method_not_found(&invocation.name).into();
            }
        };
        let definition = entry.definition();

        let args = match entry.validate(&invocation) {
            Ok(args) => args,
            Err(failure) => {
                debug!(
                    tool = %invocation.name,
                    fields = %describe_fields(&failure),
                    "Rejected invalid arguments"
                );
                return ToolFailure::from(failure).into();
            }
        };

        let undeclared: Vec<&str> = invocation
            .arguments
            .keys()
            .filter(|name| definition.parameter(name).is_none())
            .map(|name| name.as_str())
            .collect();
        if !undeclared.is_empty() {
            debug!(tool = %invocation.name, ignored = ?undeclared, "Ignoring undeclared arguments");
        }

        if let Some(param) = &definition.channel_param {
            let Some(reconciler) = &self.reconciler else {
                return ToolFailure::internal(format!(
                    "Tool '{}' requires channel access but no chat client is configured",
                    invocation.name
                ))
                .into();
            };
            let channel_id = match args.require_str(param) {
                Ok(channel_id) => channel_id.to_string(),
                Err(failure) => return failure.into(),
            };
            if let Err(failure) = reconciler.ensure(&channel_id).await {
                return failure.into();
            }
        }

        self.runner
            .run(&invocation.name, entry.executor(), args)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;
    use toolbridge_domain::channel::{BotIdentity, ChannelInfo};
    use toolbridge_domain::tool::{
        FailureKind, ParamType, ToolDefinition, ToolParameter, ValidatedArgs,
    };

    use crate::config::ReconcilerConfig;
    use crate::ports::chat_platform::{ChatPlatformPort, PlatformError};
    use crate::ports::tool_executor::ToolExecutor;

    type CallLog = Arc<Mutex<Vec<(String, Instant)>>>;

    fn record(log: &CallLog, call: impl Into<String>) {
        log.lock().unwrap().push((call.into(), Instant::now()));
    }

    fn calls(log: &CallLog) -> Vec<String> {
        log.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
    }

    struct StubSchema;

    impl ToolSchemaPort for StubSchema {
        fn input_schema(&self, tool: &ToolDefinition) -> serde_json::Value {
            json!({ "type": "object", "x-params": tool.parameters.len() })
        }
    }

    /// Records every execution in the shared log.
    struct Recording {
        name: &'static str,
        log: CallLog,
    }

    #[async_trait]
    impl ToolExecutor for Recording {
        async fn execute(&self, args: ValidatedArgs) -> Outcome {
            record(&self.log, self.name);
            Outcome::success(serde_json::Value::Object(args.into_inner()))
        }
    }

    /// Chat platform where the bot belongs to no channel until it joins.
    struct Platform {
        log: CallLog,
        known_channels: Vec<&'static str>,
        joined: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatPlatformPort for Platform {
        async fn identity(&self) -> Result<BotIdentity, PlatformError> {
            record(&self.log, "identity");
            Ok(BotIdentity::new("UBOT"))
        }

        async fn channel_info(&self, channel_id: &str) -> Result<ChannelInfo, PlatformError> {
            record(&self.log, "inspect");
            if self.known_channels.contains(&channel_id) {
                Ok(ChannelInfo::public(channel_id))
            } else {
                Err(PlatformError::NotFound("channel_not_found".into()))
            }
        }

        async fn channel_members(&self, channel_id: &str) -> Result<Vec<String>, PlatformError> {
            record(&self.log, "members");
            let joined = self.joined.lock().unwrap();
            Ok(if joined.iter().any(|c| c == channel_id) {
                vec!["UBOT".to_string()]
            } else {
                Vec::new()
            })
        }

        async fn join(&self, channel_id: &str) -> Result<(), PlatformError> {
            record(&self.log, "join");
            self.joined.lock().unwrap().push(channel_id.to_string());
            Ok(())
        }

        async fn invite(&self, _channel_id: &str, _user_id: &str) -> Result<(), PlatformError> {
            record(&self.log, "invite");
            Ok(())
        }
    }

    const SETTLE: Duration = Duration::from_millis(1000);

    fn router(log: &CallLog, with_reconciler: bool) -> RequestRouter {
        let mut registry = OperationRegistry::new();
        registry
            .register(
                ToolDefinition::new("kv_get", "Get a value")
                    .with_parameter(ToolParameter::new("key", "Key", true)),
                Arc::new(Recording {
                    name: "kv_get",
                    log: log.clone(),
                }),
            )
            .unwrap();
        registry
            .register(
                ToolDefinition::new("chat_send", "Send a message")
                    .with_parameter(ToolParameter::new("channel_id", "Channel", true))
                    .with_parameter(ToolParameter::new("text", "Text", true))
                    .with_parameter(
                        ToolParameter::new("limit", "Limit", false).with_type(ParamType::Integer),
                    )
                    .channel_scoped("channel_id"),
                Arc::new(Recording {
                    name: "send",
                    log: log.clone(),
                }),
            )
            .unwrap();

        let router = RequestRouter::new(Arc::new(registry), Arc::new(StubSchema));
        if !with_reconciler {
            return router;
        }
        let platform = Arc::new(Platform {
            log: log.clone(),
            known_channels: vec!["C1"],
            joined: Mutex::new(Vec::new()),
        });
        router.with_reconciler(Arc::new(ChannelAccessReconciler::new(
            platform,
            ReconcilerConfig {
                settle_interval: SETTLE,
            },
        )))
    }

    #[test]
    fn test_list_tools_is_sorted_with_schema() {
        let log = CallLog::default();
        let tools = router(&log, false).list_tools();

        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["chat_send", "kv_get"]);
        assert_eq!(tools[0].input_schema["x-params"], 3);
        assert!(calls(&log).is_empty());
    }

    #[tokio::test]
    async fn test_unknown_tool_is_method_not_found_without_side_effect() {
        let log = CallLog::default();
        let outcome = router(&log, true)
            .call_tool(ToolInvocation::new("kv_drop").with_arg("key", "a"))
            .await;

        let failure = outcome.as_failure().unwrap();
        assert_eq!(failure.kind, FailureKind::MethodNotFound);
        assert!(failure.message.contains("kv_drop"));
        assert!(calls(&log).is_empty());
    }

    #[tokio::test]
    async fn test_missing_argument_is_invalid_params_without_side_effect() {
        let log = CallLog::default();
        let outcome = router(&log, true)
            .call_tool(ToolInvocation::new("chat_send").with_arg("limit", "ten"))
            .await;

        let failure = outcome.as_failure().unwrap();
        assert_eq!(failure.kind, FailureKind::InvalidParams);
        assert_eq!(failure.fields, vec!["channel_id", "text", "limit"]);
        assert!(calls(&log).is_empty());
    }

    #[tokio::test]
    async fn test_undeclared_arguments_are_passed_through() {
        let log = CallLog::default();
        let outcome = router(&log, false)
            .call_tool(
                ToolInvocation::new("kv_get")
                    .with_arg("key", "a")
                    .with_arg("request_id", "r-1"),
            )
            .await;

        assert!(outcome.is_success());
        assert_eq!(outcome.value().unwrap()["request_id"], "r-1");
        assert_eq!(calls(&log), vec!["kv_get"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_to_non_member_channel_orders_calls() {
        let log = CallLog::default();
        let outcome = router(&log, true)
            .call_tool(
                ToolInvocation::new("chat_send")
                    .with_arg("channel_id", "C1")
                    .with_arg("text", "hello"),
            )
            .await;

        assert!(outcome.is_success());
        assert_eq!(
            calls(&log),
            vec!["identity", "inspect", "members", "join", "send"]
        );

        let entries = log.lock().unwrap();
        let joined_at = entries[3].1;
        let sent_at = entries[4].1;
        assert!(sent_at.duration_since(joined_at) >= SETTLE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_member_channel_skips_join() {
        let log = CallLog::default();
        let router = router(&log, true);
        let send = || {
            ToolInvocation::new("chat_send")
                .with_arg("channel_id", "C1")
                .with_arg("text", "hello")
        };

        router.call_tool(send()).await;
        log.lock().unwrap().clear();
        let outcome = router.call_tool(send()).await;

        assert!(outcome.is_success());
        assert_eq!(calls(&log), vec!["identity", "inspect", "members", "send"]);
    }

    #[tokio::test]
    async fn test_failed_inspection_never_runs_operation() {
        let log = CallLog::default();
        let outcome = router(&log, true)
            .call_tool(
                ToolInvocation::new("chat_send")
                    .with_arg("channel_id", "C404")
                    .with_arg("text", "hello"),
            )
            .await;

        assert_eq!(outcome.failure_kind(), Some(FailureKind::AccessError));
        assert_eq!(calls(&log), vec!["identity", "inspect"]);
    }

    #[tokio::test]
    async fn test_channel_scoped_without_reconciler_is_internal() {
        let log = CallLog::default();
        let outcome = router(&log, false)
            .call_tool(
                ToolInvocation::new("chat_send")
                    .with_arg("channel_id", "C1")
                    .with_arg("text", "hello"),
            )
            .await;

        assert_eq!(outcome.failure_kind(), Some(FailureKind::Internal));
        assert!(calls(&log).is_empty());
    }
}
