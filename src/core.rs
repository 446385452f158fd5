use governor::{
    Quota, RateLimiter, clock::DefaultClock, middleware::NoOpMiddleware, state::InMemoryState,
    state::NotKeyed,
};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

use super::config::{RegistryConfig, RegistryUrls};
use super::error::{FilingError, Result};
use super::resolver::TickerSnapshot;

type Governor = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// HTTP client for the public filings registry.
///
/// `Registry` is the entry point for the retrieval side of the pipeline:
/// ticker resolution, filing location, and document download are all
/// implemented as trait methods on it. Every request passes through a token
/// bucket rate limiter so successive calls against the registry host are
/// paced to respect its fair access policy (5 req/s by default, i.e. at
/// least 200ms between requests).
///
/// There is deliberately no retry or backoff machinery here: the pipeline
/// serves an interactive caller and keeps worst-case latency predictable.
/// The only retry anywhere is the downloader's single alternate-URL attempt.
///
/// # Examples
///
/// ```rust
/// # use filingkit::Registry;
/// let registry = Registry::new("my_app/1.0 (me@example.com)")?;
/// # Ok::<(), filingkit::FilingError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Registry {
    /// HTTP client for making requests
    pub(crate) client: reqwest::Client,

    /// Token bucket rate limiter for registry compliance
    pub(crate) rate_limiter: Arc<Governor>,

    /// Timeout applied to filing document downloads
    pub(crate) download_timeout: Duration,

    /// Base URLs for the registry services
    pub(crate) urls: RegistryUrls,

    /// Ticker snapshot, fetched once per process and shared across clones
    pub(crate) snapshot: Arc<OnceCell<Arc<TickerSnapshot>>>,
}

impl Registry {
    /// Creates a new registry client with sensible defaults.
    ///
    /// The `user_agent` identifies your application to the registry, which
    /// requires a contact address in the header per its etiquette policy.
    pub fn new(user_agent: &str) -> Result<Self> {
        let config = RegistryConfig {
            user_agent: user_agent.to_string(),
            ..RegistryConfig::default()
        };
        Self::with_config(config)
    }

    /// Creates a registry client with custom configuration.
    ///
    /// Useful for pointing the client at a mock server in tests or for
    /// adjusting the rate limit and timeouts.
    ///
    /// # Errors
    ///
    /// Returns `FilingError::ConfigError` if the user agent is malformed,
    /// the rate limit is zero, or the HTTP client cannot be built.
    pub fn with_config(config: RegistryConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| FilingError::ConfigError(format!("Invalid user agent: {}", e)))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| FilingError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        let rate = NonZeroU32::new(config.rate_limit).ok_or_else(|| {
            FilingError::ConfigError("Rate limit must be greater than zero".to_string())
        })?;
        // Burst capacity of one: consecutive requests are spaced a full
        // replenish interval apart (200ms at the default 5 req/s) rather
        // than passing unthrottled until the bucket drains.
        let rate_limiter = Arc::new(RateLimiter::direct(
            Quota::per_second(rate).allow_burst(NonZeroU32::MIN),
        ));

        Ok(Registry {
            client,
            rate_limiter,
            download_timeout: config.download_timeout,
            urls: config.base_urls,
            snapshot: Arc::new(OnceCell::new()),
        })
    }

    /// Fetches text content from a URL with rate limiting.
    ///
    /// This is the primary method for registry lookups: the ticker snapshot
    /// and the ATOM company feed. Non-success statuses map directly onto the
    /// error taxonomy; there are no retries.
    ///
    /// # Errors
    ///
    /// * `FilingError::NotFound` - the resource doesn't exist (HTTP 404)
    /// * `FilingError::RequestError` - network failure
    /// * `FilingError::InvalidResponse` - any other non-success status
    pub async fn get(&self, url: &str) -> Result<String> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FilingError::RequestError)?;

        match response.status() {
            reqwest::StatusCode::OK => response.text().await.map_err(FilingError::RequestError),
            reqwest::StatusCode::NOT_FOUND => Err(FilingError::NotFound),
            status => {
                let preview = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Failed to read error body".to_string())
                    .chars()
                    .take(200)
                    .collect::<String>();
                Err(FilingError::InvalidResponse(format!(
                    "Unexpected status code: {} for URL: {}. Response preview: {}",
                    status, url, preview
                )))
            }
        }
    }

    /// Fetches binary data from a URL with rate limiting.
    ///
    /// Used for filing document downloads, which are written to the cache
    /// verbatim. The longer download timeout applies here since filings can
    /// run to several megabytes.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(url)
            .timeout(self.download_timeout)
            .send()
            .await
            .map_err(FilingError::RequestError)?;

        match response.status() {
            reqwest::StatusCode::OK => response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(FilingError::RequestError),
            reqwest::StatusCode::NOT_FOUND => Err(FilingError::NotFound),
            status => Err(FilingError::InvalidResponse(format!(
                "Unexpected status code: {} for URL: {}",
                status, url
            ))),
        }
    }

    /// Returns the base URL for the filing archives.
    pub fn archives_url(&self) -> &str {
        &self.urls.archives
    }

    /// Returns the base URL for bulk registry files.
    pub fn files_url(&self) -> &str {
        &self.urls.files
    }

    /// Returns the base URL for the browse endpoint.
    pub fn browse_url(&self) -> &str {
        &self.urls.browse
    }
}
