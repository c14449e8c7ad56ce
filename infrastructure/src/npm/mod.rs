//! npm registry adapter (read-only, no credential)

mod client;
mod tools;

pub use client::{NpmClient, NpmError, encode_package_name};
pub use tools::{NpmExecutor, NpmOperation, npm_tools, register_npm_tools};
