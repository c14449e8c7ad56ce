//! Key-value tools: kv_set, kv_get, kv_delete, kv_list

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use toolbridge_application::{OperationRegistry, ToolExecutor};
use toolbridge_domain::DomainError;
use toolbridge_domain::tool::{
    Outcome, SuccessValue, ToolDefinition, ToolFailure, ToolParameter, ValidatedArgs,
};

use super::store::InMemoryStore;

/// Tool name constants
pub const KV_SET: &str = "kv_set";
pub const KV_GET: &str = "kv_get";
pub const KV_DELETE: &str = "kv_delete";
pub const KV_LIST: &str = "kv_list";

fn key_parameter(description: &str) -> ToolParameter {
    ToolParameter::new("key", description, true)
}

pub fn kv_set_definition() -> ToolDefinition {
    ToolDefinition::new(
        KV_SET,
        "Store a string value under a key. Overwrites any existing value.",
    )
    .with_parameter(key_parameter("Key to store the value under"))
    .with_parameter(ToolParameter::new("value", "Value to store", true))
}

pub fn kv_get_definition() -> ToolDefinition {
    ToolDefinition::new(KV_GET, "Get the value stored under a key")
        .with_parameter(key_parameter("Key to look up"))
}

pub fn kv_delete_definition() -> ToolDefinition {
    ToolDefinition::new(KV_DELETE, "Delete a key and its value")
        .with_parameter(key_parameter("Key to delete"))
}

pub fn kv_list_definition() -> ToolDefinition {
    ToolDefinition::new(KV_LIST, "List every stored key and value, sorted by key")
}

#[derive(Debug, Deserialize)]
struct KeyInput {
    key: String,
}

#[derive(Debug, Deserialize)]
struct SetInput {
    key: String,
    value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KvOperation {
    Set,
    Get,
    Delete,
    List,
}

/// Executes one kv operation against the shared store.
pub struct KvExecutor {
    store: Arc<InMemoryStore>,
    op: KvOperation,
}

impl KvExecutor {
    pub fn new(store: Arc<InMemoryStore>, op: KvOperation) -> Self {
        Self { store, op }
    }

    fn run(&self, args: &ValidatedArgs) -> Result<SuccessValue, ToolFailure> {
        match self.op {
            KvOperation::Set => {
                let input: SetInput = args.decode()?;
                let replaced = self.store.set(&input.key, &input.value).is_some();
                let verb = if replaced { "Updated" } else { "Stored" };
                Ok(SuccessValue::new(json!({ input.key.clone(): input.value }))
                    .with_confirmation(format!("{} key '{}'", verb, input.key)))
            }
            KvOperation::Get => {
                let input: KeyInput = args.decode()?;
                let value = self.store.get(&input.key)?;
                Ok(SuccessValue::new(json!({ input.key: value })))
            }
            KvOperation::Delete => {
                let input: KeyInput = args.decode()?;
                self.store.delete(&input.key)?;
                Ok(SuccessValue::new(json!({ "deleted": input.key.clone() }))
                    .with_confirmation(format!("Deleted key '{}'", input.key)))
            }
            KvOperation::List => Ok(SuccessValue::new(json!(self.store.list()))),
        }
    }
}

#[async_trait]
impl ToolExecutor for KvExecutor {
    async fn execute(&self, args: ValidatedArgs) -> Outcome {
        self.run(&args).into()
    }
}

pub fn kv_tools() -> Vec<(ToolDefinition, KvOperation)> {
    vec![
        (kv_set_definition(), KvOperation::Set),
        (kv_get_definition(), KvOperation::Get),
        (kv_delete_definition(), KvOperation::Delete),
        (kv_list_definition(), KvOperation::List),
    ]
}

/// Register the four kv tools against one shared store.
pub fn register_kv_tools(
    registry: &mut OperationRegistry,
    store: Arc<InMemoryStore>,
) -> Result<(), DomainError> {
    for (definition, op) in kv_tools() {
        registry.register(definition, Arc::new(KvExecutor::new(store.clone(), op)))?;
    }
    Ok(())
}
