use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Title patterns of index entries that are not regular articles
///
/// Announcements, pinned posts, missing-person requests and signed polls use
/// their own layouts and are skipped before any thread fetch.
pub const DEFAULT_SKIP_TITLES: &[&str] = &[r"^\[公告\]", "置底", r"^\[協尋\]", r"^\[記名公投\]"];

/// Main configuration structure for Board-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub geolocation: GeolocationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Board name as it appears in `/bbs/{board}/` URLs
    #[serde(default = "default_board")]
    pub board: String,

    /// Number of index pages to crawl, counting the newest page
    #[serde(default = "default_pages")]
    pub pages: u32,

    /// Site root prepended to relative links
    #[serde(default = "default_host")]
    pub host: String,

    /// Minimum processing time per index page when geolocation is off (milliseconds)
    #[serde(rename = "page-floor-ms", default = "default_page_floor_ms")]
    pub page_floor_ms: u64,

    /// Fixed delay between retries of a failed request (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Regex patterns; index entries whose title matches any are skipped
    #[serde(rename = "skip-titles", default = "default_skip_titles")]
    pub skip_titles: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            board: default_board(),
            pages: default_pages(),
            host: default_host(),
            page_floor_ms: default_page_floor_ms(),
            retry_delay_ms: default_retry_delay_ms(),
            skip_titles: default_skip_titles(),
        }
    }
}

/// IP geolocation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeolocationConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Lookup endpoint; the IP is passed as the `ip` query parameter
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// SQLite file holding resolved IPs across runs
    #[serde(rename = "cache-path", default = "default_cache_path")]
    pub cache_path: String,

    /// Lookups allowed per window
    #[serde(rename = "max-requests", default = "default_max_requests")]
    pub max_requests: u32,

    /// Length of the rate-limit window (seconds)
    #[serde(rename = "window-secs", default = "default_window_secs")]
    pub window_secs: u64,

    #[serde(rename = "city-field", default = "default_city_field")]
    pub city_field: String,

    #[serde(rename = "country-field", default = "default_country_field")]
    pub country_field: String,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_endpoint(),
            cache_path: default_cache_path(),
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            city_field: default_city_field(),
            country_field: default_country_field(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Article table path; the comment table is written next to it
    #[serde(rename = "articles-path")]
    pub articles_path: Option<String>,
}

impl OutputConfig {
    /// Resolves the article and comment table paths for a board and run date
    pub fn resolve_paths(&self, board: &str, today: NaiveDate) -> (PathBuf, PathBuf) {
        let articles = self
            .articles_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| default_articles_path(board, today));
        let comments = comments_path_for(&articles);
        (articles, comments)
    }
}

/// Default article table name: `{board}_{YYYYMMDD}.csv`
pub fn default_articles_path(board: &str, today: NaiveDate) -> PathBuf {
    PathBuf::from(format!("{}_{}.csv", board, today.format("%Y%m%d")))
}

/// Comment table path derived from the article table: `{stem}_push.csv`
pub fn comments_path_for(articles: &Path) -> PathBuf {
    let stem = articles
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = articles
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "csv".to_string());
    articles.with_file_name(format!("{}_push.{}", stem, extension))
}

fn default_board() -> String {
    "Gossiping".to_string()
}

fn default_pages() -> u32 {
    50
}

fn default_host() -> String {
    "https://www.ptt.cc".to_string()
}

fn default_page_floor_ms() -> u64 {
    10_000
}

fn default_retry_delay_ms() -> u64 {
    5_000
}

fn default_skip_titles() -> Vec<String> {
    DEFAULT_SKIP_TITLES.iter().map(|s| s.to_string()).collect()
}

fn default_endpoint() -> String {
    "http://www.geoplugin.net/json.gp".to_string()
}

fn default_cache_path() -> String {
    "ip_cache.db".to_string()
}

fn default_max_requests() -> u32 {
    120
}

fn default_window_secs() -> u64 {
    60
}

fn default_city_field() -> String {
    "geoplugin_city".to_string()
}

fn default_country_field() -> String {
    "geoplugin_countryName".to_string()
}
