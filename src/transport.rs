//! The "fetch JSON by URL" collaborator.
//!
//! The harvester only talks to [`JsonFetcher`]. [`HttpFetcher`] is the production
//! implementation on top of `reqwest`; tests substitute scripted fetchers.

use serde_json::Value;
use url::Url;

use crate::config::FetchConfig;
use crate::error::{Error, TransportError};

/// Abstraction over JSON fetching, enabling testability.
#[async_trait::async_trait]
pub trait JsonFetcher: Send + Sync {
    /// Fetch `url` and parse the body as JSON
    async fn fetch_json(&self, url: &Url) -> Result<Value, TransportError>;
}

/// Production [`JsonFetcher`] backed by a shared `reqwest::Client`.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with the configured timeout and user agent
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the HTTP client cannot be built.
    pub fn new(config: &FetchConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::Config {
                message: format!("Failed to create HTTP client: {}", e),
                key: None,
            })?;

        Ok(Self { client })
    }

    /// Wrap an already configured client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl JsonFetcher for HttpFetcher {
    async fn fetch_json(&self, url: &Url) -> Result<Value, TransportError> {
        tracing::debug!(url = %url, "Fetching");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;

        // Check HTTP status before trying to parse the response body
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|source| TransportError::Body {
                url: url.to_string(),
                source,
            })
    }
}
