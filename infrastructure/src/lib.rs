//! Infrastructure layer for toolbridge
//!
//! This crate contains the adapters that implement the ports defined in the
//! application layer: the in-memory store, the Slack / GitHub / npm HTTP
//! clients and their tool tables, configuration loading, and the stdio
//! JSON-RPC server.

pub mod adapters;
pub mod config;
pub mod github;
pub mod kv;
pub mod mcp;
pub mod npm;
pub mod slack;
pub mod tools;

// Re-export commonly used types
pub use adapters::{AdapterError, AdapterKind, AdapterRuntime, build_adapter, catalogue};
pub use config::{
    ConfigError, ConfigIssue, ConfigLoader, ConfigSource, CredentialError, FileConfig,
    GitHubCredentials, SlackCredentials,
};
pub use mcp::{McpServer, ServerError};
pub use tools::{JsonSchemaToolConverter, build_http_client};
