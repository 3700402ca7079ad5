//! Push comment extraction
//!
//! The push block always follows the site's signature line, so comments are
//! read only from the part of `#main-content` that starts there. Pushes
//! quoted inside the article body are never picked up.

use crate::article::records::{CommentRecord, Vote};
use crate::article::ExtractError;
use chrono::NaiveDateTime;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

/// Serialized start of the signature line that precedes the push block
pub const PUSH_BLOCK_MARKER: &str = r#"<span class="f2">※ 發信站: 批踢踢實業坊(ptt.cc)"#;

fn comment_ip_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}").expect("valid ip regex"))
}

fn comment_time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{2}/\d{2} \d{2}:\d{2}").expect("valid time regex"))
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Extracts all push comments of a thread
///
/// Returns an empty list when the page has no push block. City and country
/// are left as empty strings; the geolocation pass fills them in.
///
/// # Arguments
///
/// * `document` - The parsed thread page
/// * `url` - The thread URL, copied into every record
/// * `year` - The article's posting year, used to complete comment timestamps
pub fn parse_comments(
    document: &Html,
    url: &str,
    year: i32,
) -> Result<Vec<CommentRecord>, ExtractError> {
    let Some(main) = document.select(&selector("div#main-content")).next() else {
        return Ok(Vec::new());
    };

    let html = main.html();
    let Some(start) = html.find(PUSH_BLOCK_MARKER) else {
        return Ok(Vec::new());
    };
    let block = Html::parse_fragment(&html[start..]);

    let push = selector("div.push");
    let tag = selector("span.push-tag");
    let user = selector("span.push-userid");
    let content = selector("span.push-content");
    let ip_time = selector("span.push-ipdatetime");

    let mut comments = Vec::new();
    for div in block.select(&push) {
        let Some(author) = div.select(&user).next().map(text_of) else {
            // Notices such as "檔案過大！部分文章無法顯示" reuse the push layout
            continue;
        };

        let tag_text = div.select(&tag).next().map(text_of).unwrap_or_default();
        let vote = Vote::from_tag(&tag_text).ok_or_else(|| ExtractError::UnknownVote {
            url: url.to_string(),
            tag: tag_text.clone(),
        })?;

        let raw_text = div.select(&content).next().map(text_of).unwrap_or_default();
        let text = raw_text
            .strip_prefix(": ")
            .unwrap_or(&raw_text)
            .to_string();

        let ip_time_text = div
            .select(&ip_time)
            .next()
            .map(text_of)
            .unwrap_or_default();
        let ip_time_text = ip_time_text.trim();

        comments.push(CommentRecord {
            url: url.to_string(),
            author,
            vote,
            text,
            ip: parse_comment_ip(ip_time_text),
            city: Some(String::new()),
            country: Some(String::new()),
            timestamp: parse_comment_time(ip_time_text, year),
        });
    }

    Ok(comments)
}

/// Leading dotted IP of the ip/datetime field; `None` if the user removed it
pub fn parse_comment_ip(ip_time: &str) -> Option<String> {
    comment_ip_regex()
        .find(ip_time)
        .map(|m| m.as_str().to_string())
}

/// Combines the `MM/DD HH:MM` fragment with the article's year
pub fn parse_comment_time(ip_time: &str, year: i32) -> Option<NaiveDateTime> {
    let fragment = comment_time_regex().find(ip_time)?.as_str();
    NaiveDateTime::parse_from_str(
        &format!("{}/{}:00", year, fragment),
        "%Y/%m/%d %H:%M:%S",
    )
    .ok()
}
