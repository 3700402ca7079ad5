//! Index page parsing
//!
//! An index page lists one page of threads for a board. This module reads
//! the "previous page" navigation link, the thread links, and decides which
//! index pages a crawl visits.

use regex::{Regex, RegexSet};
use scraper::{Html, Selector};
use std::sync::OnceLock;
use url::Url;

/// A thread listed on an index page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadLink {
    /// Title as shown on the index page
    pub title: String,

    /// Absolute thread URL
    pub url: String,
}

fn index_number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"index(\d+)\.html").expect("valid index regex"))
}

/// Builds the URL of an index page; `None` is the unnumbered newest page
pub fn index_url(host: &str, board: &str, page: Option<u32>) -> String {
    let host = host.trim_end_matches('/');
    match page {
        Some(n) => format!("{}/bbs/{}/index{}.html", host, board, n),
        None => format!("{}/bbs/{}/index.html", host, board),
    }
}

/// Reads the page number behind the "previous page" button
///
/// The navigation bar holds four `btn wide` links (oldest, previous, next,
/// newest); the second one points at `index{N}.html`.
pub fn previous_page_number(html: &str) -> Option<u32> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"a[class*="btn wide"]"#).ok()?;

    let href = document.select(&selector).nth(1)?.value().attr("href")?;
    index_number_regex()
        .captures(href)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}

/// Extracts every thread link on an index page
///
/// Deleted threads have no anchor in their title cell and are therefore
/// never returned.
pub fn thread_links(html: &str, base: &Url) -> Vec<ThreadLink> {
    let document = Html::parse_document(html);
    let selector = match Selector::parse(".title a") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            let url = base.join(href.trim()).ok()?;
            Some(ThreadLink {
                title: anchor.text().collect::<String>(),
                url: url.to_string(),
            })
        })
        .collect()
}

/// Returns the index pages to visit, oldest first
///
/// `last` is the previous-page number reported by the newest index page.
/// Pages `last - pages + 2 ..= last` are visited in ascending order, followed
/// by the unnumbered newest page (`None`). Numbers never go below 1.
pub fn crawl_plan(last: u32, pages: u32) -> Vec<Option<u32>> {
    let first = (i64::from(last) - i64::from(pages) + 2).max(1);
    let mut plan: Vec<Option<u32>> = (first..=i64::from(last))
        .filter_map(|n| u32::try_from(n).ok())
        .map(Some)
        .collect();
    plan.push(None);
    plan
}

/// Filter for index entries that are not regular articles
#[derive(Debug, Clone)]
pub struct TitleFilter {
    patterns: RegexSet,
}

impl TitleFilter {
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            patterns: RegexSet::new(patterns)?,
        })
    }

    /// Returns true if the title matches any skip pattern
    pub fn is_skipped(&self, title: &str) -> bool {
        self.patterns.is_match(title)
    }
}
