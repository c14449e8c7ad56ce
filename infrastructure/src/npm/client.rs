//! npm registry HTTP client

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use toolbridge_domain::core::string::truncate;
use toolbridge_domain::tool::ToolFailure;
use tracing::trace;

/// Longest upstream error body carried into a failure message
const MAX_ERROR_BODY: usize = 200;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NpmError {
    #[error("package '{0}'")]
    PackageNotFound(String),

    #[error("registry returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("registry request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for NpmError {
    fn from(err: reqwest::Error) -> Self {
        NpmError::Request(err.to_string())
    }
}

impl From<NpmError> for ToolFailure {
    fn from(err: NpmError) -> Self {
        match err {
            NpmError::PackageNotFound(_) => ToolFailure::not_found(err.to_string()),
            other => ToolFailure::external("npm registry", other),
        }
    }
}

/// Read-only client for the public registry API.
#[derive(Debug, Clone)]
pub struct NpmClient {
    http: reqwest::Client,
    registry_url: String,
}

impl NpmClient {
    pub fn new(http: reqwest::Client, registry_url: impl Into<String>) -> Self {
        Self {
            http,
            registry_url: registry_url.into(),
        }
    }

    fn package_url(&self, name: &str) -> String {
        format!(
            "{}/{}",
            self.registry_url.trim_end_matches('/'),
            encode_package_name(name)
        )
    }

    fn search_url(&self) -> String {
        format!("{}/-/v1/search", self.registry_url.trim_end_matches('/'))
    }

    /// Fetch the full package document (all versions and dist-tags).
    pub async fn package(&self, name: &str) -> Result<Value, NpmError> {
        let url = self.package_url(name);
        trace!(%url, "npm GET");
        let response = self.http.get(&url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(NpmError::PackageNotFound(name.to_string())),
            status if !status.is_success() => Err(NpmError::Status {
                status: status.as_u16(),
                message: truncate(&response.text().await.unwrap_or_default(), MAX_ERROR_BODY),
            }),
            _ => Ok(response.json().await?),
        }
    }

    pub async fn search(&self, text: &str, size: u32) -> Result<Value, NpmError> {
        let response = self
            .http
            .get(self.search_url())
            .query(&[("text", text.to_string()), ("size", size.to_string())])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NpmError::Status {
                status: status.as_u16(),
                message: truncate(&response.text().await.unwrap_or_default(), MAX_ERROR_BODY),
            });
        }
        Ok(response.json().await?)
    }
}

/// Encode a package name for use as a single path segment.
///
/// Scoped names keep their leading `@` and have the `/` escaped, which is the
/// form the registry documents (`@scope%2Fname`).
pub fn encode_package_name(name: &str) -> String {
    match name.strip_prefix('@') {
        Some(scoped) => format!("@{}", urlencoding::encode(scoped)),
        None => urlencoding::encode(name).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolbridge_domain::tool::FailureKind;

    #[test]
    fn test_encode_package_name() {
        assert_eq!(encode_package_name("serde"), "serde");
        assert_eq!(encode_package_name("@types/node"), "@types%2Fnode");
    }

    #[test]
    fn test_urls() {
        let client = NpmClient::new(reqwest::Client::new(), "https://registry.npmjs.org/");
        assert_eq!(
            client.package_url("@scope/pkg"),
            "https://registry.npmjs.org/@scope%2Fpkg"
        );
        assert_eq!(client.search_url(), "https://registry.npmjs.org/-/v1/search");
    }

    #[test]
    fn test_error_mapping() {
        let failure = ToolFailure::from(NpmError::PackageNotFound("left-pad2".into()));
        assert_eq!(failure.kind, FailureKind::NotFound);
        assert_eq!(failure.message, "Not found: package 'left-pad2'");

        let failure = ToolFailure::from(NpmError::Status {
            status: 503,
            message: "unavailable".into(),
        });
        assert_eq!(failure.kind, FailureKind::ExternalServiceError);
        assert!(failure.message.contains("HTTP 503"));
    }
}
