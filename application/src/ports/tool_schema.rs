//! Tool schema conversion port.
//!
//! Separates "which tools exist" (the registry) from "how their input shape
//! is published" (infrastructure). The domain's declarative parameter table
//! is turned into JSON Schema by an adapter implementing this port.

use toolbridge_domain::tool::{ToolDefinition, ToolDescriptor};

/// Port for converting tool definitions to the published catalogue format.
pub trait ToolSchemaPort: Send + Sync {
    /// JSON Schema describing the tool's arguments.
    fn input_schema(&self, tool: &ToolDefinition) -> serde_json::Value;

    /// Catalogue entry for a single tool.
    fn describe(&self, tool: &ToolDefinition) -> ToolDescriptor {
        ToolDescriptor {
            name: tool.name.clone(),
            description: tool.description.clone(),
            input_schema: self.input_schema(tool),
        }
    }
}
