//! Shared plumbing for the tool adapters
//!
//! - `schema`: publishes parameter tables as JSON Schema
//! - `http`: the outbound client every HTTP-backed adapter shares

pub mod http;
pub mod schema;

pub use http::build_http_client;
pub use schema::JsonSchemaToolConverter;
