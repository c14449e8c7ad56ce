//! Line-delimited JSON-RPC 2.0 server speaking the MCP tool methods
//!
//! One JSON object per line on stdin, one response per line on stdout.
//! Requests are handled concurrently; a single writer task owns stdout.

pub mod protocol;
pub mod server;
pub mod transport;

pub use protocol::{JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION};
pub use server::{McpServer, ServerError};
pub use transport::{MessageKind, classify_message};
