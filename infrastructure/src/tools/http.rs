//! Outbound HTTP client construction.

use crate::config::FileHttpConfig;

/// Build the `reqwest` client used by an adapter.
///
/// The timeout applies to every request; the user agent identifies this
/// bridge to the upstream API (GitHub rejects requests without one).
pub fn build_http_client(config: &FileHttpConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(config.timeout())
        .user_agent(config.user_agent.clone())
        .build()
}
