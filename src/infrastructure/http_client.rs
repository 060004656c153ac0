//! HTTP client for web crawling with rate limiting and error handling
//!
//! Wraps `reqwest` with a request-rate limiter, default outbound headers, and
//! status checking. The crawl engines only see the [`Fetcher`] trait, so
//! tests can substitute an in-memory page map.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Used by test fetchers for URLs they have no page for.
    #[error("no response available for {url}")]
    NotFound { url: String },
}

/// Issues a fetch and resolves to the response body.
///
/// Production impl is [`HttpClient`]; tests use a static URL->HTML map.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// HTTP client configuration for crawling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpClientConfig {
    pub user_agent: String,
    pub accept_language: String,
    pub timeout_seconds: u64,
    pub max_requests_per_second: u32,
    pub follow_redirects: bool,

    /// Extra outbound headers, typically from a site's `custom_settings`.
    #[serde(default)]
    pub extra_headers: HashMap<String, String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64)".to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            timeout_seconds: 30,
            max_requests_per_second: 5,
            follow_redirects: true,
            extra_headers: HashMap::new(),
        }
    }
}

impl HttpClientConfig {
    /// Apply per-site header overrides on top of these settings.
    ///
    /// `User-Agent` and `Accept-Language` override the dedicated fields; any
    /// other header lands in `extra_headers`.
    pub fn with_header_overrides(mut self, headers: &HashMap<String, String>) -> Self {
        for (name, value) in headers {
            if name.eq_ignore_ascii_case("user-agent") {
                self.user_agent = value.clone();
            } else if name.eq_ignore_ascii_case("accept-language") {
                self.accept_language = value.clone();
            } else {
                self.extra_headers.insert(name.clone(), value.clone());
            }
        }
        self
    }
}

/// Rate-limited HTTP client for respectful crawling.
pub struct HttpClient {
    client: Client,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("Invalid user agent")?,
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language).context("Invalid accept-language")?,
        );
        for (name, value) in &config.extra_headers {
            let name: HeaderName =
                name.parse().with_context(|| format!("Invalid header name '{name}'"))?;
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("Invalid value for header '{name}'"))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .context("Failed to create HTTP client")?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.max_requests_per_second)
                .context("Rate limit must be greater than 0")?,
        );
        let rate_limiter = RateLimiter::direct(quota);

        Ok(Self {
            client,
            rate_limiter,
            config,
        })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.rate_limiter.until_ready().await;

        tracing::debug!("fetching {}", url);

        let response = self.client.get(url).send().await.map_err(|source| {
            FetchError::Transport {
                url: url.to_string(),
                source,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })?;

        tracing::debug!("fetched {} ({} bytes)", url, body.len());
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn client_builds_with_default_config() {
        let client = HttpClient::new(HttpClientConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn header_overrides_replace_dedicated_fields() {
        let mut overrides = HashMap::new();
        overrides.insert("User-Agent".to_string(), "GrsBot/1.0".to_string());
        overrides.insert("X-Shop-Token".to_string(), "abc".to_string());

        let config = HttpClientConfig::default().with_header_overrides(&overrides);
        assert_eq!(config.user_agent, "GrsBot/1.0");
        assert_eq!(config.extra_headers.get("X-Shop-Token").unwrap(), "abc");
    }

    #[test]
    fn zero_rate_limit_is_rejected() {
        let config = HttpClientConfig {
            max_requests_per_second: 0,
            ..Default::default()
        };
        assert!(HttpClient::new(config).is_err());
    }
}
