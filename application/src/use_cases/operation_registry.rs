//! Operation Registry
//!
//! The [`OperationRegistry`] holds, per tool name, the declarative
//! [`ToolDefinition`], the validator applied to raw arguments, and the
//! [`ToolExecutor`] that performs the operation.
//!
//! # Usage
//!
//! ```ignore
//! let mut registry = OperationRegistry::new();
//! registry.register(kv_set_definition(), Arc::new(KvExecutor::new(store, KvOperation::Set)))?;
//!
//! let entry = registry.lookup("kv_set")?;
//! let args = entry.validate(&invocation)?;
//! ```
//!
//! Entries are registered once at startup and never change afterwards; the
//! registry is shared read-only behind an `Arc` while serving.

use std::collections::BTreeMap;
use std::sync::Arc;

use toolbridge_domain::DomainError;
use toolbridge_domain::tool::{
    DefaultToolValidator, ToolDefinition, ToolInvocation, ToolValidator, ValidatedArgs,
    ValidationFailure,
};

use crate::ports::tool_executor::ToolExecutor;

/// A registered tool: definition, validator and executor.
pub struct RegisteredTool {
    definition: ToolDefinition,
    validator: Arc<dyn ToolValidator>,
    executor: Arc<dyn ToolExecutor>,
}

impl RegisteredTool {
    pub fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    pub fn executor(&self) -> &Arc<dyn ToolExecutor> {
        &self.executor
    }

    /// Validate raw arguments against this tool's parameter table.
    pub fn validate(&self, invocation: &ToolInvocation) -> Result<ValidatedArgs, ValidationFailure> {
        self.validator.validate(invocation, &self.definition)
    }
}

impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

/// Registry of the tools one adapter exposes
#[derive(Debug, Default)]
pub struct OperationRegistry {
    tools: BTreeMap<String, RegisteredTool>,
}

impl OperationRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool validated by [`DefaultToolValidator`].
    ///
    /// Fails with [`DomainError::DuplicateTool`] if the name is taken.
    pub fn register(
        &mut self,
        definition: ToolDefinition,
        executor: Arc<dyn ToolExecutor>,
    ) -> Result<(), DomainError> {
        self.register_with_validator(definition, Arc::new(DefaultToolValidator), executor)
    }

    /// Register a tool with a custom validator.
    pub fn register_with_validator(
        &mut self,
        definition: ToolDefinition,
        validator: Arc<dyn ToolValidator>,
        executor: Arc<dyn ToolExecutor>,
    ) -> Result<(), DomainError> {
        if definition.name.trim().is_empty() {
            return Err(DomainError::InvalidDefinition(
                "tool name cannot be empty".to_string(),
            ));
        }
        if let Some(param) = &definition.channel_param
            && definition.parameter(param).is_none_or(|p| !p.required)
        {
            return Err(DomainError::InvalidDefinition(format!(
                "channel parameter '{}' of '{}' must be a declared required parameter",
                param, definition.name
            )));
        }
        if self.tools.contains_key(&definition.name) {
            return Err(DomainError::DuplicateTool(definition.name));
        }

        tracing::debug!(
            tool = %definition.name,
            channel_scoped = definition.is_channel_scoped(),
            "Registered tool"
        );
        self.tools.insert(
            definition.name.clone(),
            RegisteredTool {
                definition,
                validator,
                executor,
            },
        );
        Ok(())
    }

    /// Look up a tool by name.
    ///
    /// Unknown names are detected here, before any side effect.
    pub fn lookup(&self, name: &str) -> Result<&RegisteredTool, DomainError> {
        self.tools
            .get(name)
            .ok_or_else(|| DomainError::ToolNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Definitions of all registered tools, sorted by name
    pub fn catalogue(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values().map(|t| &t.definition)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get statistics about registered tools
    pub fn stats(&self) -> RegistryStats {
        let channel_scoped = self
            .tools
            .values()
            .filter(|t| t.definition.is_channel_scoped())
            .count();
        RegistryStats {
            total_tools: self.tools.len(),
            channel_scoped_tools: channel_scoped,
        }
    }
}

/// Statistics about the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStats {
    pub total_tools: usize,
    pub channel_scoped_tools: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use toolbridge_domain::tool::{Outcome, ToolParameter};

    struct EchoExecutor;

    #[async_trait]
    impl ToolExecutor for EchoExecutor {
        async fn execute(&self, args: ValidatedArgs) -> Outcome {
            Outcome::success(serde_json::Value::Object(args.into_inner()))
        }
    }

    fn echo() -> Arc<dyn ToolExecutor> {
        Arc::new(EchoExecutor)
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = OperationRegistry::new();
        registry
            .register(ToolDefinition::new("kv_get", "Get"), echo())
            .unwrap();

        assert!(registry.contains("kv_get"));
        assert_eq!(registry.lookup("kv_get").unwrap().definition().name, "kv_get");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_duplicate_fails() {
        let mut registry = OperationRegistry::new();
        registry
            .register(ToolDefinition::new("kv_get", "Get"), echo())
            .unwrap();

        let err = registry
            .register(ToolDefinition::new("kv_get", "Other"), echo())
            .unwrap_err();
        assert_eq!(err, DomainError::DuplicateTool("kv_get".into()));
        assert_eq!(registry.lookup("kv_get").unwrap().definition().description, "Get");
    }

    #[test]
    fn test_lookup_unknown() {
        let registry = OperationRegistry::new();
        assert!(registry.lookup("nope").unwrap_err().is_not_found());
    }

    #[test]
    fn test_channel_param_must_be_required() {
        let mut registry = OperationRegistry::new();
        let undeclared = ToolDefinition::new("send", "Send").channel_scoped("channel_id");
        assert!(matches!(
            registry.register(undeclared, echo()),
            Err(DomainError::InvalidDefinition(_))
        ));

        let optional = ToolDefinition::new("send", "Send")
            .with_parameter(ToolParameter::new("channel_id", "Channel", false))
            .channel_scoped("channel_id");
        assert!(registry.register(optional, echo()).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_catalogue_is_sorted_and_stats() {
        let mut registry = OperationRegistry::new();
        registry
            .register(ToolDefinition::new("kv_set", "Set"), echo())
            .unwrap();
        registry
            .register(
                ToolDefinition::new("chat_send", "Send")
                    .with_parameter(ToolParameter::new("channel_id", "Channel", true))
                    .channel_scoped("channel_id"),
                echo(),
            )
            .unwrap();

        let names: Vec<&str> = registry.catalogue().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["chat_send", "kv_set"]);
        assert_eq!(
            registry.stats(),
            RegistryStats {
                total_tools: 2,
                channel_scoped_tools: 1
            }
        );
    }

    #[test]
    fn test_entry_validate() {
        let mut registry = OperationRegistry::new();
        registry
            .register(
                ToolDefinition::new("kv_get", "Get")
                    .with_parameter(ToolParameter::new("key", "Key", true)),
                echo(),
            )
            .unwrap();

        let entry = registry.lookup("kv_get").unwrap();
        assert!(entry.validate(&ToolInvocation::new("kv_get")).is_err());
        assert!(
            entry
                .validate(&ToolInvocation::new("kv_get").with_arg("key", "a"))
                .is_ok()
        );
    }
}
