//! Pagination walker
//!
//! Drives one crawl: reads the newest index page to find where the board
//! ends, then visits the planned index pages oldest first. Every thread on a
//! page is fetched and extracted in turn; the intact records of a page go to
//! the [`RecordSink`] before the next page is requested.

use crate::article::{extract_article, ArticleClassification, ArticleRecord, CommentRecord};
use crate::config::CrawlerConfig;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::index::{
    crawl_plan, index_url, previous_page_number, thread_links, ThreadLink, TitleFilter,
};
use crate::geo::GeoResolver;
use crate::output::{CrawlStatistics, RecordSink};
use crate::{ConfigError, HarvestError, Result};
use chrono::{Datelike, Local};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// Pages between two geolocation cache flushes
pub const FLUSH_EVERY_PAGES: u64 = 10;

/// Sleeps out the rest of a page's time floor
///
/// No wait follows the last page of a run.
async fn pace(floor: Option<Duration>, page_started: Instant, is_last: bool) {
    let Some(floor) = floor else {
        return;
    };
    if is_last {
        return;
    }

    let spent = page_started.elapsed();
    if spent < floor {
        tracing::debug!("Pacing: waiting {:?}", floor - spent);
        tokio::time::sleep(floor - spent).await;
    }
}

/// Records harvested from one index page
#[derive(Debug, Default)]
struct PageHarvest {
    articles: Vec<ArticleRecord>,
    comments: Vec<CommentRecord>,
}

/// Sequential crawler for one board
pub struct Walker {
    config: CrawlerConfig,
    base: Url,
    fetcher: Fetcher,
    filter: TitleFilter,
    geo: Option<GeoResolver>,
    current_year: i32,
    stats: CrawlStatistics,
}

impl Walker {
    /// Creates a walker
    ///
    /// # Arguments
    ///
    /// * `config` - Board, page count, host and pacing
    /// * `fetcher` - Page fetcher shared by index and thread requests
    /// * `geo` - Resolver when geolocation is enabled
    pub fn new(config: CrawlerConfig, fetcher: Fetcher, geo: Option<GeoResolver>) -> Result<Self> {
        let filter = TitleFilter::new(&config.skip_titles)
            .map_err(|e| ConfigError::InvalidPattern(e.to_string()))?;
        let base = Url::parse(&config.host)?;

        Ok(Self {
            config,
            base,
            fetcher,
            filter,
            geo,
            current_year: Local::now().year(),
            stats: CrawlStatistics::default(),
        })
    }

    /// Overrides the year assumed for dates that lack one
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    pub fn stats(&self) -> &CrawlStatistics {
        &self.stats
    }

    /// Reads the newest index page and returns the pages to visit
    pub async fn plan(&self) -> Result<Vec<Option<u32>>> {
        let url = index_url(&self.config.host, &self.config.board, None);
        let page = self.fetcher.fetch(&url).await?;

        let last = previous_page_number(&page.body).ok_or_else(|| HarvestError::Index {
            url: url.clone(),
            message: "no previous-page link".to_string(),
        })?;

        tracing::info!("Newest index page of {} follows page {}", self.config.board, last);
        Ok(crawl_plan(last, self.config.pages))
    }

    /// Runs the whole crawl
    ///
    /// Only index-page, cache and sink failures end the run. Threads that
    /// cannot be extracted are logged and dropped.
    pub async fn run(&mut self, sink: &mut dyn RecordSink) -> Result<CrawlStatistics> {
        let started = Instant::now();
        let plan = self.plan().await?;
        let floor = self.page_floor();

        tracing::info!(
            "Crawling {} index pages of {}",
            plan.len(),
            self.config.board
        );

        for (i, number) in plan.iter().enumerate() {
            let page_started = Instant::now();

            let harvest = self.harvest_page(*number).await?;
            self.stats.articles += harvest.articles.len() as u64;
            self.stats.comments += harvest.comments.len() as u64;
            sink.write_page(&harvest.articles, &harvest.comments)?;
            self.stats.pages += 1;

            tracing::info!(
                "Page {}/{} done: {} articles, {} comments in {:?}",
                i + 1,
                plan.len(),
                harvest.articles.len(),
                harvest.comments.len(),
                page_started.elapsed()
            );

            if self.stats.pages % FLUSH_EVERY_PAGES == 0 {
                self.flush_cache()?;
            }

            pace(floor, page_started, i + 1 == plan.len()).await;
        }

        self.flush_cache()?;
        sink.finish()?;

        if let Some(geo) = &self.geo {
            self.stats.geo_lookups = geo.lookups();
            self.stats.cache_hits = geo.cache_hits();
        }
        self.stats.elapsed = started.elapsed();

        tracing::info!(
            "Crawl completed: {} articles, {} comments from {} pages in {:?}",
            self.stats.articles,
            self.stats.comments,
            self.stats.pages,
            self.stats.elapsed
        );

        Ok(self.stats.clone())
    }

    /// Minimum time per index page; only applies without geolocation, where
    /// nothing else throttles the crawl
    fn page_floor(&self) -> Option<Duration> {
        if self.geo.is_some() || self.config.page_floor_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.config.page_floor_ms))
        }
    }

    fn flush_cache(&mut self) -> Result<()> {
        if let Some(geo) = self.geo.as_mut() {
            let written = geo.flush()?;
            if written > 0 {
                tracing::info!("Saved {} new IP locations", written);
            }
        }
        Ok(())
    }

    async fn harvest_page(&mut self, number: Option<u32>) -> Result<PageHarvest> {
        let url = index_url(&self.config.host, &self.config.board, number);
        tracing::info!("Fetching index page {}", url);

        let page = self.fetcher.fetch(&url).await?;
        let links = thread_links(&page.body, &self.base);
        self.stats.threads_seen += links.len() as u64;

        let mut harvest = PageHarvest::default();
        for link in links {
            if self.filter.is_skipped(&link.title) {
                tracing::debug!("Skipping {:?}", link.title);
                self.stats.skipped += 1;
                continue;
            }

            if let Some((article, comments)) = self.harvest_thread(&link).await {
                harvest.articles.push(article);
                harvest.comments.extend(comments);
            }
        }

        Ok(harvest)
    }

    async fn harvest_thread(
        &mut self,
        link: &ThreadLink,
    ) -> Option<(ArticleRecord, Vec<CommentRecord>)> {
        let page = match self.fetcher.fetch(&link.url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Dropping {}: {}", link.url, e);
                self.stats.failed += 1;
                return None;
            }
        };

        match extract_article(&page, self.current_year, self.geo.as_mut()).await {
            Ok(ArticleClassification::Intact(article, comments)) => {
                tracing::debug!("Extracted {:?} ({} comments)", article.title, comments.len());
                Some((article, comments))
            }
            Ok(ArticleClassification::Damaged) => {
                tracing::debug!("Damaged thread {}", link.url);
                self.stats.damaged += 1;
                None
            }
            Ok(ArticleClassification::Forward) => {
                tracing::debug!("Forwarded thread {}", link.url);
                self.stats.forwarded += 1;
                None
            }
            Err(e) => {
                tracing::warn!("Dropping {}: {}", link.url, e);
                self.stats.failed += 1;
                None
            }
        }
    }
}
