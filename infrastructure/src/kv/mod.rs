//! Key-value adapter
//!
//! An in-memory string store that lives as long as the serving process.

mod store;
mod tools;

pub use store::{InMemoryStore, StoreError};
pub use tools::{
    KV_DELETE, KV_GET, KV_LIST, KV_SET, KvExecutor, KvOperation, kv_tools, register_kv_tools,
};
