//! Configuration file loader with multi-source merging

use super::file_config::{ConfigIssue, FileConfig};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Project-level config file names, checked in order
const PROJECT_FILES: [&str; 2] = ["toolbridge.toml", ".toolbridge.toml"];

/// Prefix of environment overrides, e.g. `TOOLBRIDGE_HTTP__TIMEOUT_SECONDS`
const ENV_PREFIX: &str = "TOOLBRIDGE_";

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Invalid configuration: {}", join_issues(.0))]
    Invalid(Vec<ConfigIssue>),
}

fn join_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// One place configuration may come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub label: &'static str,
    pub location: String,
    pub found: bool,
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment: `TOOLBRIDGE_<SECTION>__<KEY>`
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./toolbridge.toml` or `./.toolbridge.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/toolbridge/config.toml`
    /// 5. Default values
    ///
    /// The merged result is validated; every issue is reported at once.
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigError> {
        if let Some(path) = config_path
            && !path.exists()
        {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }

        let config: FileConfig = Self::figment(config_path)
            .extract()
            .map_err(Box::new)?;

        let issues = config.validate();
        if !issues.is_empty() {
            return Err(ConfigError::Invalid(issues));
        }
        Ok(config)
    }

    /// Build the merged figment without extracting it.
    pub fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/toolbridge/config.toml if set,
    /// otherwise falls back to ~/.config/toolbridge/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("toolbridge").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Describe every source, highest priority first.
    pub fn sources(config_path: Option<&Path>) -> Vec<ConfigSource> {
        let mut sources = vec![ConfigSource {
            label: "Env",
            location: format!("{}<SECTION>__<KEY>", ENV_PREFIX),
            found: std::env::vars().any(|(k, _)| k.starts_with(ENV_PREFIX)),
        }];

        if let Some(path) = config_path {
            sources.push(ConfigSource {
                label: "Explicit",
                location: path.display().to_string(),
                found: path.exists(),
            });
        }

        sources.push(match Self::project_config_path() {
            Some(path) => ConfigSource {
                label: "Project",
                location: path.display().to_string(),
                found: true,
            },
            None => ConfigSource {
                label: "Project",
                location: format!("./{} or ./{}", PROJECT_FILES[0], PROJECT_FILES[1]),
                found: false,
            },
        });

        if let Some(path) = Self::global_config_path() {
            sources.push(ConfigSource {
                label: "Global",
                location: path.display().to_string(),
                found: path.exists(),
            });
        }

        sources.push(ConfigSource {
            label: "Default",
            location: "built-in defaults".to_string(),
            found: true,
        });
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use std::io::Write;

    /// Point the global config lookup into the jail.
    fn isolate(jail: &mut Jail) {
        let home = jail.directory().join("xdg");
        jail.set_env("XDG_CONFIG_HOME", home.display());
    }

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config, FileConfig::default());
        assert_eq!(config.slack.settle_interval_ms, 1000);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        // Should return a path (even if file doesn't exist)
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("toolbridge"));
    }

    #[test]
    fn test_project_file_and_env_merge() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.create_file(
                "toolbridge.toml",
                r#"
[http]
timeout_seconds = 5

[slack]
settle_interval_ms = 200
"#,
            )?;
            jail.set_env("TOOLBRIDGE_SLACK__SETTLE_INTERVAL_MS", "20");

            let config = ConfigLoader::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.http.timeout_seconds, 5);
            assert_eq!(config.slack.settle_interval_ms, 20);
            assert_eq!(config.npm, Default::default());
            Ok(())
        });
    }

    #[test]
    fn test_hidden_project_file_is_found() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.create_file(".toolbridge.toml", "[npm]\nsearch_size = 3\n")?;

            assert_eq!(
                ConfigLoader::project_config_path(),
                Some(PathBuf::from(".toolbridge.toml"))
            );
            let config = ConfigLoader::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.npm.search_size, 3);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_overrides_project() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.create_file("toolbridge.toml", "[http]\ntimeout_seconds = 5\n")?;

            let dir = tempfile::tempdir().map_err(|e| e.to_string())?;
            let path = dir.path().join("custom.toml");
            let mut file = std::fs::File::create(&path).map_err(|e| e.to_string())?;
            writeln!(file, "[http]\ntimeout_seconds = 9").map_err(|e| e.to_string())?;

            let config = ConfigLoader::load(Some(&path)).map_err(|e| e.to_string())?;
            assert_eq!(config.http.timeout_seconds, 9);
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = ConfigLoader::load(Some(Path::new("/nonexistent/toolbridge.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile(_)));
    }

    #[test]
    fn test_invalid_values_are_reported_together() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.create_file(
                "toolbridge.toml",
                "[http]\ntimeout_seconds = 0\n\n[github]\napi_base = \"\"\n",
            )?;

            match ConfigLoader::load(None) {
                Err(ConfigError::Invalid(issues)) => {
                    assert_eq!(issues.len(), 2);
                    assert_eq!(issues[0].field, "http.timeout_seconds");
                    assert_eq!(issues[1].field, "github.api_base");
                }
                other => panic!("expected invalid config, got {:?}", other),
            }
            Ok(())
        });
    }

    #[test]
    fn test_sources_listing() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.create_file("toolbridge.toml", "")?;

            let sources = ConfigLoader::sources(Some(Path::new("missing.toml")));
            let labels: Vec<&str> = sources.iter().map(|s| s.label).collect();
            assert_eq!(labels, vec!["Env", "Explicit", "Project", "Global", "Default"]);
            assert!(!sources[1].found);
            assert!(sources[2].found);
            assert!(!sources[3].found);
            Ok(())
        });
    }
}
