//! Board-Harvest: a PTT board crawler
//!
//! This crate walks the index pages of one PTT board, extracts article
//! metadata and push comments from every thread, optionally geolocates the
//! posters' IP addresses, and appends the results to CSV tables.

pub mod article;
pub mod config;
pub mod crawler;
pub mod geo;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for Board-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Index page error for {url}: {message}")]
    Index { url: String, message: String },

    #[error("Extraction error: {0}")]
    Extract(#[from] article::ExtractError),

    #[error("Geolocation error: {0}")]
    Geo(#[from] geo::GeoError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid title pattern: {0}")]
    InvalidPattern(String),
}

/// Result type alias for Board-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use article::{ArticleClassification, ArticleRecord, CommentRecord, Vote};
pub use config::Config;
pub use geo::{GeoResolver, Location};
