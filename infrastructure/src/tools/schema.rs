//! JSON Schema tool converter.
//!
//! Default implementation of [`ToolSchemaPort`] that publishes each tool's
//! parameter table as the `inputSchema` of a `tools/list` entry.

use serde_json::{Map, Value, json};
use toolbridge_application::ports::tool_schema::ToolSchemaPort;
use toolbridge_domain::tool::{ParamType, ToolDefinition};

/// Default implementation producing JSON Schema objects.
///
/// Handles param_type → JSON Schema type mapping:
/// - `String` → `"string"`
/// - `Integer` → `"integer"`
/// - `Number` → `"number"`
/// - `Boolean` → `"boolean"`
/// - `StringArray` → `"array"` of `"string"`
pub struct JsonSchemaToolConverter;

impl ToolSchemaPort for JsonSchemaToolConverter {
    fn input_schema(&self, tool: &ToolDefinition) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in &tool.parameters {
            let mut prop = match param.param_type {
                ParamType::StringArray => {
                    json!({ "type": "array", "items": { "type": "string" } })
                }
                other => json!({ "type": other.as_str() }),
            };
            prop["description"] = json!(param.description);
            properties.insert(param.name.clone(), prop);

            if param.required {
                required.push(json!(param.name));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolbridge_domain::tool::ToolParameter;

    #[test]
    fn test_input_schema() {
        let converter = JsonSchemaToolConverter;
        let tool = ToolDefinition::new("github_create_issue", "Create an issue")
            .with_parameter(ToolParameter::new("title", "Issue title", true))
            .with_parameter(
                ToolParameter::new("labels", "Labels to apply", false)
                    .with_type(ParamType::StringArray),
            )
            .with_parameter(
                ToolParameter::new("issue_number", "Issue number", true)
                    .with_type(ParamType::Integer),
            );

        let schema = converter.input_schema(&tool);

        assert_eq!(schema["type"], "object");
        let title = &schema["properties"]["title"];
        assert_eq!(title["type"], "string");
        assert_eq!(title["description"], "Issue title");

        let labels = &schema["properties"]["labels"];
        assert_eq!(labels["type"], "array");
        assert_eq!(labels["items"]["type"], "string");

        assert_eq!(schema["properties"]["issue_number"]["type"], "integer");
        assert_eq!(schema["required"], json!(["title", "issue_number"]));
    }

    #[test]
    fn test_describe_uses_camel_case_schema_key() {
        let converter = JsonSchemaToolConverter;
        let tool = ToolDefinition::new("kv_list", "List all entries");

        let descriptor = serde_json::to_value(converter.describe(&tool)).unwrap();

        assert_eq!(descriptor["name"], "kv_list");
        assert_eq!(descriptor["description"], "List all entries");
        assert_eq!(descriptor["inputSchema"]["type"], "object");
        assert_eq!(descriptor["inputSchema"]["required"], json!([]));
    }
}
