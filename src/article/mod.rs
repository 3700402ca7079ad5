//! Article extraction
//!
//! Turns one fetched thread page into an [`ArticleClassification`]:
//! damaged and forwarded pages are discarded, intact pages yield an
//! [`ArticleRecord`] plus its [`CommentRecord`]s.
//!
//! Extraction runs in two steps. [`parse_article`] is synchronous and owns
//! the parsed HTML tree; [`extract_article`] then resolves IP locations,
//! which needs the network.

mod classify;
mod comments;
mod fields;
mod records;

pub use classify::{board_from_url, classify, is_forward, is_intact, PageClass, META_FIELD_COUNT};
pub use comments::{parse_comment_ip, parse_comment_time, parse_comments, PUSH_BLOCK_MARKER};
pub use fields::{
    parse_alias, parse_author, parse_date, parse_origin_ip, FieldError, VoteTally,
    EDITED_PREFIX, FORWARD_MARKER, POSTED_FROM_PREFIX,
};
pub use records::{ArticleRecord, CommentRecord, Vote, TIMESTAMP_FORMAT};

use crate::crawler::Page;
use crate::geo::{GeoError, GeoResolver, Location};
use chrono::Datelike;
use scraper::{Html, Selector};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that abort the extraction of a single article
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{url}: {source}")]
    Field { url: String, source: FieldError },

    #[error("{url}: unknown push tag {tag:?}")]
    UnknownVote { url: String, tag: String },

    #[error("geolocation failed: {0}")]
    Geo(#[from] GeoError),
}

/// Result of extracting one thread page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleClassification {
    /// Structurally broken or deleted page
    Damaged,
    /// Repost of another board's article
    Forward,
    Intact(ArticleRecord, Vec<CommentRecord>),
}

fn texts(document: &Html, css: &str) -> Vec<String> {
    match Selector::parse(css) {
        Ok(selector) => document
            .select(&selector)
            .map(|e| e.text().collect::<String>())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Parses a thread page without resolving any location
///
/// City and country are empty strings on every returned record.
///
/// # Arguments
///
/// * `url` - The thread URL; its `/bbs/{board}/` segment drives the integrity check
/// * `html` - The page body
/// * `current_year` - Substituted when the posting date lacks a year
pub fn parse_article(
    url: &str,
    html: &str,
    current_year: i32,
) -> Result<ArticleClassification, ExtractError> {
    let document = Html::parse_document(html);
    let metas = texts(&document, ".article-meta-value");
    let annotations = texts(&document, ".f2");

    match classify(&metas, &annotations, url) {
        PageClass::Damaged => return Ok(ArticleClassification::Damaged),
        PageClass::Forward => return Ok(ArticleClassification::Forward),
        PageClass::Intact => {}
    }

    let field_error = |source| ExtractError::Field {
        url: url.to_string(),
        source,
    };

    let date = parse_date(&metas[3], current_year).map_err(field_error)?;
    let ip = parse_origin_ip(&annotations).map_err(field_error)?;

    let tags = texts(&document, r#"span[class*="push-tag"]"#);
    let tally = VoteTally::from_tags(tags.iter().map(String::as_str));

    let comments = parse_comments(&document, url, date.year())?;

    let article = ArticleRecord {
        author: parse_author(&metas[0]),
        alias: parse_alias(&metas[0]),
        title: metas[2].clone(),
        date,
        ip,
        city: String::new(),
        country: String::new(),
        ups: tally.ups,
        downs: tally.downs,
        comments: tally.neutral,
        url: url.to_string(),
    };

    Ok(ArticleClassification::Intact(article, comments))
}

/// Extracts a fetched thread page, geolocating IPs when a resolver is given
pub async fn extract_article(
    page: &Page,
    current_year: i32,
    resolver: Option<&mut GeoResolver>,
) -> Result<ArticleClassification, ExtractError> {
    let classification = parse_article(&page.url, &page.body, current_year)?;

    match (classification, resolver) {
        (ArticleClassification::Intact(mut article, mut comments), Some(resolver)) => {
            locate(&mut article, &mut comments, resolver).await?;
            Ok(ArticleClassification::Intact(article, comments))
        }
        (classification, _) => Ok(classification),
    }
}

/// Fills in city and country for an article and its comments
///
/// Each distinct comment IP is resolved once and the result shared by every
/// comment carrying it. Comments without an IP get no location.
pub async fn locate(
    article: &mut ArticleRecord,
    comments: &mut [CommentRecord],
    resolver: &mut GeoResolver,
) -> Result<(), GeoError> {
    let location = resolver.resolve(&article.ip).await?;
    article.city = location.city;
    article.country = location.country;

    let mut resolved: HashMap<String, Location> = HashMap::new();
    for comment in comments.iter() {
        if let Some(ip) = &comment.ip {
            if !resolved.contains_key(ip) {
                let location = resolver.resolve(ip).await?;
                resolved.insert(ip.clone(), location);
            }
        }
    }

    for comment in comments.iter_mut() {
        let location = comment.ip.as_ref().and_then(|ip| resolved.get(ip));
        comment.city = location.map(|l| l.city.clone());
        comment.country = location.map(|l| l.country.clone());
    }

    Ok(())
}
