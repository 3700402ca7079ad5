//! Crawler module for board traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with the age cookie and retry logic
//! - Index page parsing and crawl planning
//! - The pagination walker that ties extraction and output together

mod fetcher;
mod index;
mod retry;
mod walker;

pub use fetcher::{build_http_client, is_terminal_status, FetchError, Fetcher, Page, AGE_COOKIE};
pub use index::{
    crawl_plan, index_url, previous_page_number, thread_links, ThreadLink, TitleFilter,
};
pub use retry::{RetryPolicy, DEFAULT_RETRY_DELAY};
pub use walker::{Walker, FLUSH_EVERY_PAGES};

use crate::config::{validate, Config};
use crate::geo::{GeoCache, GeoResolver};
use crate::output::{CrawlStatistics, CsvSink};
use crate::storage::open_cache_store;
use crate::Result;
use chrono::Local;
use std::path::Path;
use std::time::Duration;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration
/// 2. Build the HTTP client and retry policy
/// 3. Load the geolocation cache when geolocation is enabled
/// 4. Open the output tables
/// 5. Walk the planned index pages
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Crawl completed successfully
/// * `Err(HarvestError)` - Crawl failed
pub async fn harvest(config: Config) -> Result<CrawlStatistics> {
    validate(&config)?;

    let client = build_http_client()?;
    let retry = RetryPolicy::unbounded(Duration::from_millis(config.crawler.retry_delay_ms));
    let fetcher = Fetcher::new(client.clone(), retry);

    let geo = if config.geolocation.enabled {
        let store = open_cache_store(Path::new(&config.geolocation.cache_path))?;
        let cache = GeoCache::load(store)?;
        Some(GeoResolver::new(client, &config.geolocation, cache, retry))
    } else {
        None
    };

    let (articles, comments) = config
        .output
        .resolve_paths(&config.crawler.board, Local::now().date_naive());
    let mut sink = CsvSink::new(&articles, &comments)?;

    let mut walker = Walker::new(config.crawler, fetcher, geo)?;
    walker.run(&mut sink).await
}
