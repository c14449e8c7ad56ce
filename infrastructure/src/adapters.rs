//! Adapter wiring: one tool family per serving process.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use toolbridge_application::{
    ChannelAccessReconciler, ChatPlatformPort, OperationRegistry, RequestRouter, ResponseFormatter,
};
use toolbridge_domain::{DomainError, ToolDefinition};
use tracing::info;

use crate::config::{CredentialError, FileConfig, GitHubCredentials, SlackCredentials};
use crate::github::{GitHubClient, github_tools, register_github_tools};
use crate::kv::{InMemoryStore, kv_tools, register_kv_tools};
use crate::npm::{NpmClient, npm_tools, register_npm_tools};
use crate::slack::{SlackApiClient, register_slack_tools, slack_tools};
use crate::tools::{JsonSchemaToolConverter, build_http_client};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterKind {
    Kv,
    Npm,
    Github,
    Slack,
}

impl AdapterKind {
    pub const ALL: [AdapterKind; 4] = [
        AdapterKind::Kv,
        AdapterKind::Npm,
        AdapterKind::Github,
        AdapterKind::Slack,
    ];

    /// Short name used on the command line and in `serverInfo`.
    pub fn name(&self) -> &'static str {
        match self {
            AdapterKind::Kv => "kv",
            AdapterKind::Npm => "npm",
            AdapterKind::Github => "github",
            AdapterKind::Slack => "slack",
        }
    }

    /// Prefix of error texts returned to the caller.
    pub fn label(&self) -> &'static str {
        match self {
            AdapterKind::Kv => "KV",
            AdapterKind::Npm => "npm",
            AdapterKind::Github => "GitHub",
            AdapterKind::Slack => "Slack",
        }
    }

    pub fn server_name(&self) -> String {
        format!("toolbridge-{}", self.name())
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to register tools: {0}")]
    Registration(#[from] DomainError),
}

/// The router and formatter serving one adapter.
pub struct AdapterRuntime {
    pub kind: AdapterKind,
    pub router: RequestRouter,
    pub formatter: ResponseFormatter,
}

/// Tool definitions of an adapter, sorted by name. Needs no credentials.
pub fn catalogue(kind: AdapterKind) -> Vec<ToolDefinition> {
    let mut definitions: Vec<ToolDefinition> = match kind {
        AdapterKind::Kv => kv_tools().into_iter().map(|(d, _)| d).collect(),
        AdapterKind::Npm => npm_tools().into_iter().map(|(d, _)| d).collect(),
        AdapterKind::Github => github_tools().into_iter().map(|(d, _)| d).collect(),
        AdapterKind::Slack => slack_tools().into_iter().map(|(d, _)| d).collect(),
    };
    definitions.sort_by(|a, b| a.name.cmp(&b.name));
    definitions
}

/// Build the runtime for `kind`, reading credentials from the environment.
///
/// Missing credentials fail here, before anything is served.
pub fn build_adapter(kind: AdapterKind, config: &FileConfig) -> Result<AdapterRuntime, AdapterError> {
    let mut registry = OperationRegistry::new();
    let mut reconciler = None;

    match kind {
        AdapterKind::Kv => {
            register_kv_tools(&mut registry, Arc::new(InMemoryStore::new()))?;
        }
        AdapterKind::Npm => {
            let http = build_http_client(&config.http)?;
            let client = Arc::new(NpmClient::new(http, config.npm.registry_url.clone()));
            register_npm_tools(&mut registry, client, config.npm.search_size)?;
        }
        AdapterKind::Github => {
            let credentials = GitHubCredentials::from_env()?;
            let http = build_http_client(&config.http)?;
            let client = Arc::new(GitHubClient::new(
                http,
                config.github.api_base.clone(),
                credentials,
            ));
            register_github_tools(&mut registry, client)?;
        }
        AdapterKind::Slack => {
            let credentials = SlackCredentials::from_env()?;
            let http = build_http_client(&config.http)?;
            let client = Arc::new(SlackApiClient::new(
                http,
                config.slack.api_base.clone(),
                credentials,
            ));
            let platform: Arc<dyn ChatPlatformPort> = client.clone();
            reconciler = Some(Arc::new(ChannelAccessReconciler::new(
                platform,
                config.slack.reconciler_config(),
            )));
            register_slack_tools(&mut registry, client)?;
        }
    }

    let stats = registry.stats();
    info!(
        adapter = kind.name(),
        tools = stats.total_tools,
        channel_scoped = stats.channel_scoped_tools,
        "Adapter ready"
    );

    let mut router = RequestRouter::new(Arc::new(registry), Arc::new(JsonSchemaToolConverter));
    if let Some(reconciler) = reconciler {
        router = router.with_reconciler(reconciler);
    }

    Ok(AdapterRuntime {
        kind,
        router,
        formatter: ResponseFormatter::new(kind.label()),
    })
}
