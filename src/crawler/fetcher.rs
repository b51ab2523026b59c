//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the crawler's user agent and timeout
//! - GET requests to fetch page content
//! - Retry logic for transient failures
//! - Error classification

use crate::config::UserAgentConfig;
use reqwest::{redirect::Policy, Client};
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};
use url::Url;

/// Maximum redirect hops followed for a single request
const MAX_REDIRECTS: usize = 10;

/// Classification of a failed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The request exceeded the configured timeout
    Timeout,
    /// Connection refused, DNS failure, TLS handshake error
    ConnectionError,
    /// The server answered with a non-success status
    HttpError(u16),
    /// Anything else (redirect limit, body decoding, builder errors)
    Other,
}

impl FailureKind {
    /// Returns true if another attempt may succeed
    ///
    /// Only timeouts and connection errors are retried; HTTP errors are
    /// terminal for the URL.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::ConnectionError)
    }

    /// Stable label used in logs and statistics
    pub fn label(&self) -> String {
        match self {
            Self::Timeout => "timeout".to_string(),
            Self::ConnectionError => "connection_error".to_string(),
            Self::HttpError(code) => format!("http_{}", code),
            Self::Other => "other".to_string(),
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Result of a fetch operation
#[derive(Debug, Clone)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// HTTP status code (2xx, after redirects)
        status_code: u16,
        /// Page body content
        body: String,
        /// Response headers, lowercase names
        headers: HashMap<String, String>,
        /// Wall-clock time of the successful attempt
        elapsed: Duration,
    },

    /// The page could not be fetched
    Failure {
        kind: FailureKind,
        message: String,
    },
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Per-request timeout shared by every fetch, robots.txt included
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use site_auditor::config::UserAgentConfig;
/// use site_auditor::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "SiteAuditor".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: Some("https://example.com/about".to_string()),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Performs single GETs with bounded retries
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx | Success |
/// | HTTP 4xx/5xx | Immediate → HttpError |
/// | Timeout | Retry, `max_attempts` attempts in total |
/// | Connection error | Retry, `max_attempts` attempts in total |
/// | Anything else | Immediate → Other |
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_attempts: u32,
    retry_backoff: Duration,
}

impl Fetcher {
    /// Creates a fetcher around a configured client
    ///
    /// `max_attempts` is clamped to at least one attempt. `retry_backoff` is
    /// the delay before the second attempt and doubles for each following
    /// one; zero disables backoff.
    pub fn new(client: Client, max_attempts: u32, retry_backoff: Duration) -> Self {
        Self {
            client,
            max_attempts: max_attempts.max(1),
            retry_backoff,
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Fetches a URL, retrying transient failures
    ///
    /// Never returns an error value: every outcome is a `FetchResult`.
    pub async fn fetch(&self, url: &Url) -> FetchResult {
        let mut attempt = 1;

        loop {
            let result = self.fetch_once(url).await;

            let kind = match &result {
                FetchResult::Success { .. } => return result,
                FetchResult::Failure { kind, .. } => *kind,
            };

            if !kind.is_retryable() || attempt >= self.max_attempts {
                return result;
            }

            tracing::debug!(
                "Attempt {}/{} for {} failed ({}), retrying",
                attempt,
                self.max_attempts,
                url,
                kind
            );

            if !self.retry_backoff.is_zero() {
                let factor = 1u32 << (attempt - 1).min(16);
                tokio::time::sleep(self.retry_backoff * factor).await;
            }

            attempt += 1;
        }
    }

    async fn fetch_once(&self, url: &Url) -> FetchResult {
        let started = Instant::now();

        let response = match self.client.get(url.clone()).send().await {
            Ok(r) => r,
            Err(e) => return classify_error(&e),
        };

        let status = response.status();
        if !status.is_success() {
            return FetchResult::Failure {
                kind: FailureKind::HttpError(status.as_u16()),
                message: format!("HTTP {}", status),
            };
        }

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        match response.text().await {
            Ok(body) => FetchResult::Success {
                status_code: status.as_u16(),
                body,
                headers,
                elapsed: started.elapsed(),
            },
            Err(e) => classify_error(&e),
        }
    }
}

/// Maps a reqwest error onto a failure kind
fn classify_error(e: &reqwest::Error) -> FetchResult {
    let kind = if e.is_timeout() {
        FailureKind::Timeout
    } else if e.is_connect() {
        FailureKind::ConnectionError
    } else if let Some(status) = e.status() {
        FailureKind::HttpError(status.as_u16())
    } else {
        FailureKind::Other
    };

    FetchResult::Failure {
        kind,
        message: e.to_string(),
    }
}
