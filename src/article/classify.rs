//! Thread page classification
//!
//! Before any field is read, a thread page is checked for structural damage
//! and for being a repost of another board's article.

use crate::article::fields::FORWARD_MARKER;
use regex::Regex;
use std::sync::OnceLock;

/// Number of header fields (author, board, title, date) on an intact page
pub const META_FIELD_COUNT: usize = 4;

/// Outcome of the structural checks on a thread page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageClass {
    /// Wrong header field count, board mismatch, or missing page
    Damaged,
    /// Repost of an article captured at its origin board
    Forward,
    Intact,
}

fn board_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"bbs/(.*?)/").expect("valid board regex"))
}

/// Extracts the board name from a thread URL (`.../bbs/{board}/M....html`)
pub fn board_from_url(url: &str) -> Option<&str> {
    board_regex().captures(url)?.get(1).map(|m| m.as_str())
}

/// Integrity check: exactly four header fields, the second naming the board
/// the URL belongs to
pub fn is_intact(meta_values: &[String], url: &str) -> bool {
    let Some(board) = board_from_url(url) else {
        return false;
    };
    meta_values.len() == META_FIELD_COUNT && meta_values[1] == board
}

/// Forward check on the first annotation line
pub fn is_forward(annotations: &[String]) -> bool {
    annotations
        .first()
        .map(|line| line.contains(FORWARD_MARKER))
        .unwrap_or(false)
}

/// Runs the integrity check, then the forward check
pub fn classify(meta_values: &[String], annotations: &[String], url: &str) -> PageClass {
    if !is_intact(meta_values, url) {
        PageClass::Damaged
    } else if is_forward(annotations) {
        PageClass::Forward
    } else {
        PageClass::Intact
    }
}
