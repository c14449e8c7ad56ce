//! Presentation layer for toolbridge
//!
//! This crate contains the CLI definition and console rendering of tool
//! catalogues and configuration sources.

pub mod cli;
pub mod output;

// Re-export commonly used types
pub use cli::commands::{AdapterArg, Cli, Command};
pub use output::console::{ConsoleFormatter, SourceRow};
