//! Configuration file loading for toolbridge
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment: `TOOLBRIDGE_<SECTION>__<KEY>`
//! 2. `--config <path>` specified file
//! 3. Project root: `./toolbridge.toml` or `./.toolbridge.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/toolbridge/config.toml`
//! 5. Default values

mod credentials;
mod file_config;
mod loader;

pub use credentials::{CredentialError, GitHubCredentials, SlackCredentials};
pub use file_config::{
    ConfigIssue, FileConfig, FileGitHubConfig, FileHttpConfig, FileLogConfig, FileNpmConfig,
    FileSlackConfig,
};
pub use loader::{ConfigError, ConfigLoader, ConfigSource};
