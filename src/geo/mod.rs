//! IP geolocation
//!
//! [`GeoResolver`] maps an IP address to a city and country. Answers come
//! from the [`GeoCache`] when possible; misses go to the provider endpoint,
//! throttled by a [`RateWindow`] and retried under the crawler's
//! [`RetryPolicy`].

mod cache;
mod limiter;

pub use cache::GeoCache;
pub use limiter::RateWindow;

use crate::config::GeolocationConfig;
use crate::crawler::RetryPolicy;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

/// A resolved location; null provider values become empty strings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub city: String,
    pub country: String,
}

/// Geolocation errors
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("network error looking up {ip}: {source}")]
    Network { ip: String, source: reqwest::Error },

    #[error("unexpected HTTP {status} looking up {ip}")]
    UnexpectedStatus { ip: String, status: u16 },

    #[error("malformed response for {ip}: {message}")]
    Malformed { ip: String, message: String },

    #[error("response for {ip} has no field {field:?}")]
    MissingField { ip: String, field: String },
}

impl GeoError {
    /// Network failures and bad statuses are retried, bad payloads are not
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::UnexpectedStatus { .. })
    }
}

/// Fragment the provider emits for Myanmar that breaks JSON parsing,
/// e.g. `"Myanmar" [Burma]`
fn burma_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s\[]*Burma[\s\]]*").expect("valid repair regex"))
}

/// Parses a provider response into a [`Location`]
///
/// If the body is not valid JSON and contains the known Myanmar fragment,
/// the fragment is removed and parsing is retried once.
pub fn parse_location(
    ip: &str,
    body: &str,
    city_field: &str,
    country_field: &str,
) -> Result<Location, GeoError> {
    let json: Value = match serde_json::from_str(body) {
        Ok(json) => json,
        Err(first) => {
            if !burma_regex().is_match(body) {
                return Err(GeoError::Malformed {
                    ip: ip.to_string(),
                    message: first.to_string(),
                });
            }
            let repaired = burma_regex().replace_all(body, "");
            tracing::debug!("Repaired provider response for {}", ip);
            serde_json::from_str(&repaired).map_err(|e| GeoError::Malformed {
                ip: ip.to_string(),
                message: e.to_string(),
            })?
        }
    };

    Ok(Location {
        city: field_text(ip, &json, city_field)?,
        country: field_text(ip, &json, country_field)?,
    })
}

fn field_text(ip: &str, json: &Value, field: &str) -> Result<String, GeoError> {
    match json.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Null) => Ok(String::new()),
        Some(other) => Ok(other.to_string()),
        None => Err(GeoError::MissingField {
            ip: ip.to_string(),
            field: field.to_string(),
        }),
    }
}

/// Cache-backed, rate-limited geolocation client
pub struct GeoResolver {
    client: Client,
    endpoint: String,
    city_field: String,
    country_field: String,
    cache: GeoCache,
    limiter: RateWindow,
    retry: RetryPolicy,
    lookups: u64,
    cache_hits: u64,
}

impl GeoResolver {
    /// Builds a resolver from configuration
    ///
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client
    /// * `config` - Endpoint, field names and request budget
    /// * `cache` - Cache loaded at run start
    /// * `retry` - Policy for failed lookups
    pub fn new(
        client: Client,
        config: &GeolocationConfig,
        cache: GeoCache,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            city_field: config.city_field.clone(),
            country_field: config.country_field.clone(),
            cache,
            limiter: RateWindow::new(
                config.max_requests,
                Duration::from_secs(config.window_secs),
            ),
            retry,
            lookups: 0,
            cache_hits: 0,
        }
    }

    /// Resolves an IP, consulting the cache first
    pub async fn resolve(&mut self, ip: &str) -> Result<Location, GeoError> {
        if let Some(location) = self.cache.get(ip) {
            self.cache_hits += 1;
            return Ok(location.clone());
        }

        let body = self.lookup(ip).await?;
        let location = parse_location(ip, &body, &self.city_field, &self.country_field)?;
        tracing::debug!(
            "Resolved {} to {}, {}",
            ip,
            location.city,
            location.country
        );

        self.cache.insert(ip, location.clone());
        Ok(location)
    }

    /// Requests the provider until it answers with HTTP 200
    async fn lookup(&mut self, ip: &str) -> Result<String, GeoError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            self.limiter.acquire().await;
            self.lookups += 1;

            match self.lookup_once(ip).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && self.retry.allows_retry(attempt) => {
                    self.retry.pause("Geolocation lookup", attempt, &e).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn lookup_once(&self, ip: &str) -> Result<String, GeoError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("ip", ip)])
            .send()
            .await
            .map_err(|source| GeoError::Network {
                ip: ip.to_string(),
                source,
            })?;

        if response.status() != StatusCode::OK {
            return Err(GeoError::UnexpectedStatus {
                ip: ip.to_string(),
                status: response.status().as_u16(),
            });
        }

        response.text().await.map_err(|source| GeoError::Network {
            ip: ip.to_string(),
            source,
        })
    }

    pub fn cache(&self) -> &GeoCache {
        &self.cache
    }

    /// Persists newly resolved entries
    pub fn flush(&mut self) -> crate::storage::StorageResult<usize> {
        self.cache.flush()
    }

    /// Provider requests sent so far, retries included
    pub fn lookups(&self) -> u64 {
        self.lookups
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits
    }
}
