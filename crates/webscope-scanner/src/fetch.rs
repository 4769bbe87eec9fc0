//! Raw page-source retrieval.
//!
//! Rendered DOM snapshots lose comments that only exist in the served HTML,
//! so the extractor refetches the raw source over HTTP. The fetch is
//! best-effort: callers degrade to DOM-only extraction when it fails.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors from a raw-source fetch attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-success status.
    #[error("unexpected status {0}")]
    Status(u16),

    /// Transport-level failure.
    #[error("request failed: {0}")]
    Http(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout;
        }
        if let Some(status) = err.status() {
            return Self::Status(status.as_u16());
        }
        Self::Http(err.to_string())
    }
}

/// Retrieves the raw, unrendered source of a page.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Fetch the raw source text for `url`.
    async fn fetch_source(&self, url: &str) -> std::result::Result<String, FetchError>;
}

/// [`SourceFetcher`] backed by an HTTP client with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpSourceFetcher {
    client: reqwest::Client,
}

impl HttpSourceFetcher {
    /// Build a fetcher with the timeout from the scanning configuration.
    pub fn from_config(
        config: &webscope_core::ScanningConfig,
    ) -> std::result::Result<Self, FetchError> {
        Self::new(Duration::from_secs(config.fetch_timeout_secs))
    }

    /// Build a fetcher with the given request timeout.
    pub fn new(timeout: Duration) -> std::result::Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("WebScope/1.0")
            .build()
            .map_err(|e| FetchError::Http(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SourceFetcher for HttpSourceFetcher {
    async fn fetch_source(&self, url: &str) -> std::result::Result<String, FetchError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}
