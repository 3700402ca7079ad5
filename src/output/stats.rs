//! Run statistics
//!
//! Counters collected by the walker and printed when a run ends.

use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Index pages visited
    pub pages: u64,

    /// Thread links listed on visited index pages
    pub threads_seen: u64,

    /// Threads skipped by title pattern
    pub skipped: u64,

    /// Threads discarded by the integrity check
    pub damaged: u64,

    /// Threads discarded as reposts
    pub forwarded: u64,

    /// Threads whose extraction failed
    pub failed: u64,

    /// Article records written
    pub articles: u64,

    /// Comment records written
    pub comments: u64,

    /// Geolocation requests sent, retries included
    pub geo_lookups: u64,

    /// Geolocation answers served from the cache
    pub cache_hits: u64,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl CrawlStatistics {
    /// Threads that were fetched and classified
    pub fn threads_fetched(&self) -> u64 {
        self.threads_seen - self.skipped
    }

    /// Share of fetched threads that produced an article, as a percentage
    pub fn yield_rate(&self) -> f64 {
        let fetched = self.threads_fetched();
        if fetched == 0 {
            return 0.0;
        }
        (self.articles as f64 / fetched as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Index pages visited: {}", stats.pages);
    println!("  Threads listed: {}", stats.threads_seen);
    println!("  Skipped by title: {}", stats.skipped);
    println!("  Duration: {:.1}s", stats.elapsed.as_secs_f64());
    println!();

    println!("Threads:");
    println!("  Articles: {}", stats.articles);
    println!("  Damaged: {}", stats.damaged);
    println!("  Forwarded: {}", stats.forwarded);
    println!("  Failed: {}", stats.failed);
    println!("  Comments: {}", stats.comments);
    println!();

    if stats.geo_lookups > 0 || stats.cache_hits > 0 {
        println!("Geolocation:");
        println!("  Lookups: {}", stats.geo_lookups);
        println!("  Cache hits: {}", stats.cache_hits);
        println!();
    }

    println!(
        "Yield: {:.1}% ({} / {} threads produced an article)",
        stats.yield_rate(),
        stats.articles,
        stats.threads_fetched()
    );
}
