//! Console output for tool catalogues and configuration sources

use colored::Colorize;
use toolbridge_domain::tool::{ParamType, ToolDefinition, ToolDescriptor};

/// One configuration source as shown by `toolbridge config`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub label: String,
    pub location: String,
    pub found: bool,
}

/// Formats catalogues and config listings for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format an adapter's tool catalogue
    pub fn format_catalogue(adapter: &str, tools: &[ToolDefinition]) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(&format!("{} tools", adapter)));
        output.push('\n');

        for tool in tools {
            let mut title = tool.name.yellow().bold().to_string();
            if let Some(param) = &tool.channel_param {
                title.push_str(&format!(" {}", format!("[channel: {}]", param).magenta()));
            }
            output.push_str(&format!("\n{}\n", title));
            output.push_str(&Self::indent(&tool.description, "  "));
            output.push('\n');

            for param in &tool.parameters {
                let marker = if param.required {
                    "*".red().bold().to_string()
                } else {
                    " ".to_string()
                };
                output.push_str(&format!(
                    "    {}{} {} {}\n",
                    marker,
                    param.name.cyan(),
                    format!("<{}>", Self::type_name(param.param_type)).dimmed(),
                    param.description
                ));
            }
        }

        output.push_str(&format!(
            "\n{} {}\n",
            tools.len().to_string().bold(),
            "tools (* = required)".dimmed()
        ));
        output
    }

    /// Format published catalogue entries as JSON
    pub fn format_json(descriptors: &[ToolDescriptor]) -> String {
        serde_json::to_string_pretty(descriptors).unwrap_or_else(|_| "[]".to_string())
    }

    /// Format configuration sources, highest priority first
    pub fn format_sources(sources: &[SourceRow]) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n", "Configuration sources:".cyan().bold()));
        for source in sources {
            let status = if source.found {
                "found".green().to_string()
            } else {
                "not found".dimmed().to_string()
            };
            output.push_str(&format!(
                "  {:<10} {} ({})\n",
                source.label,
                source.location,
                status
            ));
        }
        output
    }

    fn type_name(param_type: ParamType) -> &'static str {
        match param_type {
            ParamType::StringArray => "string[]",
            other => other.as_str(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolbridge_domain::tool::ToolParameter;

    fn plain<T>(f: impl FnOnce() -> T) -> T {
        colored::control::set_override(false);
        f()
    }

    #[test]
    fn test_format_catalogue() {
        let tools = vec![
            ToolDefinition::new("slack_post_message", "Post a message")
                .with_parameter(ToolParameter::new("channel_id", "Channel id", true))
                .with_parameter(
                    ToolParameter::new("limit", "Max", false).with_type(ParamType::Integer),
                )
                .channel_scoped("channel_id"),
        ];
        let output = plain(|| ConsoleFormatter::format_catalogue("Slack", &tools));

        assert!(output.contains("Slack tools"));
        assert!(output.contains("slack_post_message [channel: channel_id]"));
        assert!(output.contains("*channel_id <string> Channel id"));
        assert!(output.contains(" limit <integer> Max"));
        assert!(output.contains("1 tools"));
    }

    #[test]
    fn test_format_sources() {
        let sources = vec![
            SourceRow {
                label: "project".into(),
                location: "./toolbridge.toml".into(),
                found: true,
            },
            SourceRow {
                label: "global".into(),
                location: "/home/u/.config/toolbridge/config.toml".into(),
                found: false,
            },
        ];
        let output = plain(|| ConsoleFormatter::format_sources(&sources));
        assert!(output.contains("./toolbridge.toml (found)"));
        assert!(output.contains("config.toml (not found)"));
    }

    #[test]
    fn test_format_json() {
        let descriptors = vec![ToolDescriptor {
            name: "kv_get".into(),
            description: "Get".into(),
            input_schema: serde_json::json!({"type": "object"}),
        }];
        let output = ConsoleFormatter::format_json(&descriptors);
        assert!(output.contains("\"inputSchema\""));
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "  "), "  a\n  b");
    }
}
