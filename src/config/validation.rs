use crate::config::types::{Config, CrawlerConfig, GeolocationConfig};
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_geolocation_config(&config.geolocation)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_board(&config.board)?;

    if config.pages < 1 {
        return Err(ConfigError::Validation(format!(
            "pages must be >= 1, got {}",
            config.pages
        )));
    }

    let host = Url::parse(&config.host)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid host '{}': {}", config.host, e)))?;
    if host.scheme() != "http" && host.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "host '{}' must use http or https",
            config.host
        )));
    }

    for pattern in &config.skip_titles {
        Regex::new(pattern)
            .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))?;
    }

    Ok(())
}

/// Validates geolocation configuration
///
/// Checked even when geolocation is disabled so a later `-l` does not
/// surface a broken file halfway through a crawl.
fn validate_geolocation_config(config: &GeolocationConfig) -> Result<(), ConfigError> {
    Url::parse(&config.endpoint).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid endpoint '{}': {}", config.endpoint, e))
    })?;

    if config.cache_path.is_empty() {
        return Err(ConfigError::Validation(
            "cache_path cannot be empty".to_string(),
        ));
    }

    if config.max_requests < 1 {
        return Err(ConfigError::Validation(format!(
            "max_requests must be >= 1, got {}",
            config.max_requests
        )));
    }

    if config.window_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "window_secs must be >= 1, got {}",
            config.window_secs
        )));
    }

    if config.city_field.is_empty() || config.country_field.is_empty() {
        return Err(ConfigError::Validation(
            "city_field and country_field cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a board name: non-empty, ASCII alphanumerics, `-` and `_` only
fn validate_board(board: &str) -> Result<(), ConfigError> {
    if board.is_empty() {
        return Err(ConfigError::Validation("board cannot be empty".to_string()));
    }

    if !board
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "board must contain only ASCII letters, digits, '-' or '_', got '{}'",
            board
        )));
    }

    Ok(())
}
