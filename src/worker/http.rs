//! HTTP client for fetching manifests and artifacts from the parent task

use super::manifest::ManifestEntry;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Connection timeout")]
    Timeout,

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),
}

pub type Result<T> = std::result::Result<T, FetchError>;

/// Source of the parent task's manifest and artifacts
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    async fn fetch_manifest(&self, url: &str) -> Result<Vec<ManifestEntry>>;

    async fn fetch_artifact(&self, url: &str) -> Result<Bytes>;
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(300),
            user_agent: concat!("balrogworker/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

fn request_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::RequestFailed(e.to_string())
    }
}

/// Fetches over plain HTTP(S), one attempt per request
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::RequestFailed(e.to_string()))?;

        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        debug!(url, "Starting download");

        let response = self.client.get(url).send().await.map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::RequestFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl ArtifactFetcher for HttpFetcher {
    async fn fetch_manifest(&self, url: &str) -> Result<Vec<ManifestEntry>> {
        let response = self.get(url).await?;
        let entries = response
            .json::<Vec<ManifestEntry>>()
            .await
            .map_err(|e| FetchError::InvalidManifest(e.to_string()))?;

        debug!(url, entries = entries.len(), "Manifest fetched");

        Ok(entries)
    }

    async fn fetch_artifact(&self, url: &str) -> Result<Bytes> {
        let response = self.get(url).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::RequestFailed(format!("Failed to read body: {}", e)))?;

        debug!(url, size = bytes.len(), "Download completed");

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_config_defaults() {
        let config = HttpConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(300));
        assert!(config.user_agent.starts_with("balrogworker/"));
    }

    #[test]
    fn test_fetcher_builds() {
        assert!(HttpFetcher::new(HttpConfig::default()).is_ok());
    }
}
