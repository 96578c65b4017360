use async_trait::async_trait;
use governor::{
    Quota, RateLimiter, clock::DefaultClock, middleware::NoOpMiddleware, state::InMemoryState,
    state::NotKeyed,
};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use std::num::NonZeroU32;
use std::sync::Arc;

use super::config::{HkexConfig, HkexUrls};
use super::error::{HkexError, Result};
use super::traits::Transport;

const PREVIEW_CHARS: usize = 200;

type Governor = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Reqwest-backed [`Transport`] with a token bucket in front of every request.
///
/// There is no retry loop: a failed exchange is reported to the caller as-is
/// and the batch decides what to do with it.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    rate_limiter: Arc<Governor>,
}

impl HttpTransport {
    /// Builds the HTTP client from the user agent, timeouts and rate limit in `config`.
    ///
    /// # Errors
    ///
    /// Returns `HkexError::ConfigError` if the user agent is not a valid header
    /// value, the rate limit is zero, or the client cannot be built.
    pub fn new(config: &HkexConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| HkexError::ConfigError(format!("Invalid user agent: {}", e)))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| HkexError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(
            NonZeroU32::new(config.rate_limit).ok_or_else(|| {
                HkexError::ConfigError("Rate limit must be greater than zero".to_string())
            })?,
        )));

        Ok(Self {
            client,
            rate_limiter,
        })
    }

    /// Turns a response into an error unless it is a 200.
    async fn check_status(url: &str, response: reqwest::Response) -> Result<reqwest::Response> {
        match response.status() {
            reqwest::StatusCode::OK => Ok(response),
            reqwest::StatusCode::NOT_FOUND => Err(HkexError::NotFound(url.to_string())),
            status => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Failed to read error body".to_string());
                Err(HkexError::InvalidResponse(format!(
                    "Unexpected status code: {} for URL: {}. Response preview: {}",
                    status,
                    url,
                    body.chars().take(PREVIEW_CHARS).collect::<String>()
                )))
            }
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_text(&self, url: &str) -> Result<String> {
        self.rate_limiter.until_ready().await;
        tracing::debug!(url, "GET");

        let response = self.client.get(url).send().await?;
        let response = Self::check_status(url, response).await?;
        Ok(response.text().await?)
    }

    async fn post_form(&self, url: &str, form: &[(String, String)]) -> Result<String> {
        let body = serde_urlencoded::to_string(form)
            .map_err(|e| HkexError::InvalidResponse(format!("Unencodable form: {}", e)))?;

        self.rate_limiter.until_ready().await;
        tracing::debug!(url, fields = form.len(), "POST");

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;
        let response = Self::check_status(url, response).await?;
        Ok(response.text().await?)
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.rate_limiter.until_ready().await;
        tracing::debug!(url, "GET (binary)");

        let response = self.client.get(url).send().await?;
        let response = Self::check_status(url, response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Client for the HKEXnews disclosure portal.
///
/// `Hkex` ties the portal endpoints to a [`Transport`] and implements the
/// per-stage operation traits ([`TickerOperations`](crate::TickerOperations),
/// [`SearchOperations`](crate::SearchOperations),
/// [`DownloadOperations`](crate::DownloadOperations)) on top of it.
///
/// # Examples
///
/// Basic client initialization:
///
/// ```rust
/// # use hkexkit::Hkex;
/// let hkex = Hkex::new("reports-bot/1.0 (ops@example.com)")?;
/// # Ok::<(), hkexkit::HkexError>(())
/// ```
///
/// With custom configuration:
///
/// ```rust
/// # use hkexkit::{Hkex, HkexConfig, HkexUrls};
/// # use std::time::Duration;
/// let config = HkexConfig {
///     user_agent: "reports-bot/2.0".to_string(),
///     rate_limit: 2,
///     timeout: Duration::from_secs(60),
///     connect_timeout: Duration::from_secs(5),
///     base_urls: HkexUrls::default(),
/// };
/// let hkex = Hkex::with_config(config)?;
/// # Ok::<(), hkexkit::HkexError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Hkex {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) urls: HkexUrls,
}

impl Hkex {
    /// Creates a client with default timeouts, rate limit and portal URLs.
    pub fn new(user_agent: &str) -> Result<Self> {
        let config = HkexConfig {
            user_agent: user_agent.to_string(),
            ..HkexConfig::default()
        };
        Self::with_config(config)
    }

    /// Creates a client backed by [`HttpTransport`] built from `config`.
    pub fn with_config(config: HkexConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self {
            transport: Arc::new(transport),
            urls: config.base_urls,
        })
    }

    /// Creates a client over an arbitrary transport, e.g. a recorded one in tests.
    pub fn with_transport(transport: Arc<dyn Transport>, urls: HkexUrls) -> Self {
        Self { transport, urls }
    }

    /// Returns the portal endpoints this client talks to.
    pub fn urls(&self) -> &HkexUrls {
        &self.urls
    }
}
