//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Tool family served by one process
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AdapterArg {
    /// In-memory key-value store
    Kv,
    /// npm registry lookups
    Npm,
    /// GitHub issues, comments, files and branches
    Github,
    /// Slack channels, messages, reactions and users
    Slack,
}

/// CLI arguments for toolbridge
#[derive(Parser, Debug)]
#[command(name = "toolbridge")]
#[command(author, version, about = "Tool adapters served over line-delimited JSON-RPC")]
#[command(long_about = r#"
toolbridge exposes one tool adapter per process over newline-delimited
JSON-RPC 2.0 on stdin/stdout (MCP `tools/list` and `tools/call`).

Credentials are read from the environment:
  github   GITHUB_PERSONAL_ACCESS_TOKEN
  slack    SLACK_BOT_TOKEN, SLACK_TEAM_ID (optional SLACK_USER_TOKEN)

Configuration files are loaded from (in priority order):
1. TOOLBRIDGE_<SECTION>__<KEY>   Environment overrides
2. --config <path>               Explicit config file
3. ./toolbridge.toml             Project-level config
4. ~/.config/toolbridge/config.toml   Global config

Example:
  toolbridge serve kv
  toolbridge -vv serve slack
  toolbridge tools github
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true, conflicts_with = "config")]
    pub no_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve an adapter on stdin/stdout
    Serve {
        #[arg(value_enum)]
        adapter: AdapterArg,
    },
    /// Print the tool catalogue of an adapter
    Tools {
        #[arg(value_enum)]
        adapter: AdapterArg,

        /// Print the catalogue as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show configuration file locations and the effective configuration
    Config,
}
