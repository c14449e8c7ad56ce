//! Application layer for toolbridge
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ReconcilerConfig;
pub use ports::{
    chat_platform::{ChatPlatformPort, PlatformError},
    tool_executor::ToolExecutor,
    tool_schema::ToolSchemaPort,
};
pub use use_cases::effect_runner::EffectRunner;
pub use use_cases::format_response::{FormattedResponse, ProtocolError, ResponseFormatter};
pub use use_cases::operation_registry::{OperationRegistry, RegisteredTool, RegistryStats};
pub use use_cases::reconcile_channel::ChannelAccessReconciler;
pub use use_cases::route_request::RequestRouter;
