//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler:
//! - Building the HTTP client with a proper user agent string
//! - Sending the age-verification cookie the board requires
//! - Retrying network failures and unexpected statuses
//!
//! # Status Handling
//!
//! | Condition | Action |
//! |-----------|--------|
//! | HTTP 200 | Terminal, page returned |
//! | HTTP 404 | Terminal, page returned (deleted article, discarded later as damaged) |
//! | Other status | Retry after the policy delay |
//! | Timeout / connection / DNS error | Retry after the policy delay |

use crate::crawler::retry::RetryPolicy;
use reqwest::{header, Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Cookie confirming the reader is over 18; boards such as Gossiping
/// redirect to a confirmation form without it
pub const AGE_COOKIE: &str = "over18=1";

/// Errors from a single fetch attempt
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("unexpected HTTP {status} for {url}")]
    UnexpectedStatus { url: String, status: u16 },
}

impl FetchError {
    /// Every fetch failure is transient as far as the crawler is concerned
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::UnexpectedStatus { .. })
    }
}

/// A fetched page: raw HTML plus the status it was served with
#[derive(Debug, Clone)]
pub struct Page {
    /// The requested URL
    pub url: String,

    /// HTTP status code (200 or 404)
    pub status: u16,

    /// Page body
    pub body: String,
}

impl Page {
    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND.as_u16()
    }
}

/// Builds the shared HTTP client
///
/// # Example
///
/// ```no_run
/// use board_harvest::crawler::build_http_client;
///
/// let client = build_http_client().unwrap();
/// ```
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let user_agent = format!(
        "{}/{} (+{})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        "https://www.ptt.cc"
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true for the statuses that end a fetch
pub fn is_terminal_status(status: StatusCode) -> bool {
    status == StatusCode::OK || status == StatusCode::NOT_FOUND
}

/// Page fetcher with a retry policy
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    retry: RetryPolicy,
}

impl Fetcher {
    pub fn new(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Fetches a URL, retrying until a terminal status arrives
    ///
    /// Only returns an error if the retry policy is bounded and exhausted.
    pub async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        self.retry
            .run(
                "Fetching page",
                move || self.fetch_once(url),
                FetchError::is_retryable,
            )
            .await
    }

    async fn fetch_once(&self, url: &str) -> Result<Page, FetchError> {
        let response = self
            .client
            .get(url)
            .header(header::COOKIE, AGE_COOKIE)
            .send()
            .await
            .map_err(|source| FetchError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !is_terminal_status(status) {
            return Err(FetchError::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Network {
            url: url.to_string(),
            source,
        })?;

        tracing::trace!("Fetched {} ({} bytes, HTTP {})", url, body.len(), status);

        Ok(Page {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}
