//! GitHub REST v3 client for the mutation tools.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;
use toolbridge_domain::core::string::truncate;
use toolbridge_domain::tool::ToolFailure;
use tracing::trace;

use crate::config::GitHubCredentials;

const API_VERSION: &str = "2022-11-28";
const MAX_ERROR_BODY: usize = 200;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GitHubError {
    #[error("{0}")]
    NotFound(String),

    #[error("GitHub API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("GitHub request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for GitHubError {
    fn from(err: reqwest::Error) -> Self {
        GitHubError::Request(err.to_string())
    }
}

impl From<GitHubError> for ToolFailure {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::NotFound(what) => ToolFailure::not_found(what),
            GitHubError::Api { message, .. } => ToolFailure::external("GitHub", message),
            GitHubError::Request(reason) => ToolFailure::external("GitHub", reason),
        }
    }
}

/// Fields of a new issue
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewIssue {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

/// A file write; `content` is plain text and encoded on upload
#[derive(Debug, Clone, Default)]
pub struct FileWrite {
    pub path: String,
    pub content: String,
    pub message: String,
    pub branch: Option<String>,
    /// Blob sha of the file being replaced; required for updates
    pub sha: Option<String>,
}

impl FileWrite {
    fn request_body(&self) -> Value {
        let mut body = json!({
            "message": self.message,
            "content": STANDARD.encode(self.content.as_bytes()),
        });
        if let Some(branch) = &self.branch {
            body["branch"] = json!(branch);
        }
        if let Some(sha) = &self.sha {
            body["sha"] = json!(sha);
        }
        body
    }
}

#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: String,
    credentials: GitHubCredentials,
}

impl GitHubClient {
    pub fn new(
        http: reqwest::Client,
        api_base: impl Into<String>,
        credentials: GitHubCredentials,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into(),
            credentials,
        }
    }

    fn repo_url(&self, owner: &str, repo: &str, rest: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.api_base.trim_end_matches('/'),
            urlencoding::encode(owner),
            urlencoding::encode(repo),
            rest
        )
    }

    async fn send(&self, request: RequestBuilder, resource: String) -> Result<Value, GitHubError> {
        let response = request
            .bearer_auth(&self.credentials.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => Err(GitHubError::NotFound(resource)),
            _ => Err(GitHubError::Api {
                status: status.as_u16(),
                message: upstream_message(&body),
            }),
        }
    }

    pub async fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        issue: &NewIssue,
    ) -> Result<Value, GitHubError> {
        let url = self.repo_url(owner, repo, "/issues");
        trace!(%url, "GitHub POST");
        self.send(self.http.post(url).json(issue), repository(owner, repo))
            .await
    }

    pub async fn add_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<Value, GitHubError> {
        let url = self.repo_url(owner, repo, &format!("/issues/{}/comments", issue_number));
        self.send(
            self.http.post(url).json(&json!({ "body": body })),
            format!("issue #{} in {}", issue_number, repository(owner, repo)),
        )
        .await
    }

    pub async fn create_or_update_file(
        &self,
        owner: &str,
        repo: &str,
        file: &FileWrite,
    ) -> Result<Value, GitHubError> {
        let url = self.repo_url(owner, repo, &format!("/contents/{}", encode_path(&file.path)));
        self.send(
            self.http.put(url).json(&file.request_body()),
            repository(owner, repo),
        )
        .await
    }

    pub async fn default_branch(&self, owner: &str, repo: &str) -> Result<String, GitHubError> {
        let info = self
            .send(self.http.get(self.repo_url(owner, repo, "")), repository(owner, repo))
            .await?;
        info["default_branch"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| GitHubError::Request("repository has no default_branch".into()))
    }

    /// Resolve the commit sha a branch points at.
    pub async fn branch_sha(&self, owner: &str, repo: &str, branch: &str) -> Result<String, GitHubError> {
        let url = self.repo_url(owner, repo, &format!("/git/ref/heads/{}", encode_path(branch)));
        let reference = self
            .send(
                self.http.get(url),
                format!("branch '{}' in {}", branch, repository(owner, repo)),
            )
            .await?;
        reference["object"]["sha"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| GitHubError::Request("ref response has no object.sha".into()))
    }

    pub async fn create_branch(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        sha: &str,
    ) -> Result<Value, GitHubError> {
        let body = json!({
            "ref": format!("refs/heads/{}", branch),
            "sha": sha,
        });
        self.send(
            self.http.post(self.repo_url(owner, repo, "/git/refs")).json(&body),
            repository(owner, repo),
        )
        .await
    }
}

fn repository(owner: &str, repo: &str) -> String {
    format!("repository '{}/{}'", owner, repo)
}

/// Encode each segment of a slash-separated path.
fn encode_path(path: &str) -> String {
    path.trim_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// The `message` field of a GitHub error body, or the body itself.
fn upstream_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| truncate(body.trim(), MAX_ERROR_BODY))
}
