// src/sync/fetch.rs

//! Fetching configuration documents
//!
//! The fetcher returns the complete body or an error. Dropping the future
//! aborts the request, and because nothing is merged until the whole body has
//! been read, a cancelled fetch never leaves a partial document behind.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::error::{Error, Result};

/// Source of configuration document text
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch the document at `url` as text
    async fn fetch(&self, url: &Url) -> Result<String>;

    /// Human-readable name for this fetcher (for logging)
    fn name(&self) -> &str;
}

/// HTTP(S) fetcher using reqwest
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with no request timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(None)
    }

    /// Create a fetcher, optionally bounding each request
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("searchsync/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        info!("Fetching configuration from {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::NetworkError(format!("Failed to fetch {url}: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::NetworkError(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::NetworkError(format!("Failed to read response: {e}")))?;

        debug!("Fetched {} bytes", body.len());
        Ok(body)
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Check that `raw` is an absolute http(s) URL with a host
pub fn validate_config_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| Error::InvalidConfigurationUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some_and(|h| !h.is_empty()) => Ok(url),
        _ => Err(Error::InvalidConfigurationUrl(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_config_url() {
        assert!(validate_config_url("https://cfg.example/config.json").is_ok());
        assert!(validate_config_url("http://10.0.0.1:8080/c").is_ok());
        assert!(validate_config_url(" https://cfg.example/ ").is_ok());

        for bad in ["", "cfg.example/config.json", "ftp://cfg.example/c", "file:///etc/passwd", "/relative"] {
            assert!(
                matches!(validate_config_url(bad), Err(Error::InvalidConfigurationUrl(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_http_fetcher_builds() {
        assert!(HttpFetcher::new().is_ok());
        assert!(HttpFetcher::with_timeout(Some(Duration::from_secs(5))).is_ok());
    }
}
