//! Static page fetching for douyin-dl
//!
//! A redirect-following GET with browser-like headers. The share link is a
//! short URL, so the interesting part of the response is the final URL and
//! the HTML body.

use std::time::Duration;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder};

use crate::core::error::{Error, Result};
use crate::core::source::SourceConfig;

/// Maximum redirect hops followed for a share link
const MAX_REDIRECTS: usize = 10;

/// Shared client for callers that do not bring their own configuration
pub(crate) static GLOBAL_CLIENT: Lazy<Client> = Lazy::new(|| {
    build_client(&SourceConfig::default()).unwrap_or_else(|_| Client::new())
});

/// Builds an HTTP client carrying the configured browser headers
pub fn build_client(config: &SourceConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&config.accept) {
        headers.insert(ACCEPT, value);
    }
    if let Ok(value) = HeaderValue::from_str(&config.accept_language) {
        headers.insert(ACCEPT_LANGUAGE, value);
    }

    ClientBuilder::new()
        .default_headers(headers)
        .user_agent(config.user_agent.clone())
        .redirect(Policy::limited(MAX_REDIRECTS))
        .tcp_keepalive(Duration::from_secs(60))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(Error::from)
}

/// A fetched page after all redirects were followed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    pub final_url: String,
    pub body: String,
}

/// Fetch collaborator used by the extraction pipeline
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Follows redirects from `url` and returns the final page.
    ///
    /// Connection failures, timeouts and non-success statuses are errors.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedPage>;
}

/// reqwest-backed fetcher
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    /// Create a fetcher on the shared client
    pub fn new() -> Self {
        Self {
            client: GLOBAL_CLIENT.clone(),
        }
    }

    /// Create a fetcher with headers taken from `config`
    pub fn with_config(config: &SourceConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedPage> {
        let response = self.client.get(url).timeout(timeout).send().await?;

        let status = response.status();
        let final_url = response.url().to_string();
        if !status.is_success() {
            return Err(Error::HttpError(format!(
                "Failed to fetch page: {status} ({final_url})"
            )));
        }

        let body = response.text().await?;
        Ok(FetchedPage {
            status: status.as_u16(),
            final_url,
            body,
        })
    }
}
