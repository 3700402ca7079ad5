//! Metadata field extraction rules
//!
//! Users edit their posts by hand, so most fields have more than one
//! accepted shape. Each field is read by an ordered list of rules; the first
//! rule that matches wins, and a field no rule can read is reported as
//! [`FieldError::Unparseable`].

use chrono::{NaiveDateTime, Weekday};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// A metadata field that none of its rules could read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("unparseable {field}: {value:?}")]
    Unparseable { field: &'static str, value: String },
}

impl FieldError {
    fn unparseable(field: &'static str, value: impl Into<String>) -> Self {
        Self::Unparseable {
            field,
            value: value.into(),
        }
    }
}

/// Signature line appended by the site to every post
pub const POSTED_FROM_PREFIX: &str = "※ 發信站: 批踢踢實業坊(ptt.cc), 來自:";

/// Annotation left when a post is edited
pub const EDITED_PREFIX: &str = "※ 編輯:";

/// Marker of an article reposted from another board
pub const FORWARD_MARKER: &str = "本文轉錄自";

struct DateRule {
    name: &'static str,
    parse: fn(&str, i32) -> Option<NaiveDateTime>,
}

const DATE_RULES: &[DateRule] = &[
    DateRule {
        name: "full",
        parse: parse_full_date,
    },
    DateRule {
        name: "missing-year",
        parse: parse_date_without_year,
    },
];

struct IpRule {
    name: &'static str,
    parse: fn(&[String]) -> Option<String>,
}

const IP_RULES: &[IpRule] = &[
    IpRule {
        name: "posted-from",
        parse: ip_from_signature,
    },
    IpRule {
        name: "edited",
        parse: ip_from_edit_note,
    },
];

fn time_prefix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.*\d{2}:\d{2}:\d{2})").expect("valid time regex"))
}

fn signature_ip_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"來自: *(\d{1,3}(?:\.\d{1,3}){3})").expect("valid signature regex")
    })
}

fn edit_ip_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\((\d{1,3}(?:\.\d{1,3}){3})").expect("valid edit regex"))
}

/// Author handle: everything before the alias parenthesis
pub fn parse_author(field: &str) -> String {
    field.split('(').next().unwrap_or_default().trim_end().to_string()
}

/// Alias inside the outermost parentheses; empty if the user removed it
pub fn parse_alias(field: &str) -> String {
    match (field.find('('), field.rfind(')')) {
        (Some(open), Some(close)) if open < close => field[open + 1..close].to_string(),
        _ => String::new(),
    }
}

/// Parses the posting date, falling back to the current year when the
/// year was truncated or edited out
pub fn parse_date(field: &str, current_year: i32) -> Result<NaiveDateTime, FieldError> {
    for rule in DATE_RULES {
        if let Some(date) = (rule.parse)(field, current_year) {
            tracing::trace!("date {:?} read by rule {}", field, rule.name);
            return Ok(date);
        }
    }
    Err(FieldError::unparseable("date", field))
}

/// `Weekday Mon D HH:MM:SS YYYY`
///
/// The weekday name must be valid but is not checked against the date.
fn parse_full_date(field: &str, _current_year: i32) -> Option<NaiveDateTime> {
    let tokens: Vec<&str> = field.split_whitespace().collect();
    let [weekday, month, day, time, year] = tokens.as_slice() else {
        return None;
    };
    if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    weekday.parse::<Weekday>().ok()?;
    NaiveDateTime::parse_from_str(
        &format!("{} {} {} {}", month, day, time, year),
        "%b %d %H:%M:%S %Y",
    )
    .ok()
}

/// `Weekday Mon D HH:MM:SS`, anything after the time ignored
fn parse_date_without_year(field: &str, current_year: i32) -> Option<NaiveDateTime> {
    let prefix = time_prefix_regex().captures(field)?.get(1)?.as_str();
    let tokens: Vec<&str> = prefix.split_whitespace().collect();
    let [weekday, month, day, time] = tokens.as_slice() else {
        return None;
    };
    weekday.parse::<Weekday>().ok()?;
    NaiveDateTime::parse_from_str(
        &format!("{} {} {} {}", month, day, time, current_year),
        "%b %d %H:%M:%S %Y",
    )
    .ok()
}

/// Finds the poster's IP in the article's annotation lines
pub fn parse_origin_ip(annotations: &[String]) -> Result<String, FieldError> {
    for rule in IP_RULES {
        if let Some(ip) = (rule.parse)(annotations) {
            tracing::trace!("origin ip {} read by rule {}", ip, rule.name);
            return Ok(ip);
        }
    }
    Err(FieldError::unparseable(
        "origin ip",
        annotations.first().cloned().unwrap_or_default(),
    ))
}

fn ip_from_signature(annotations: &[String]) -> Option<String> {
    annotations
        .iter()
        .filter(|line| line.trim_start().starts_with(POSTED_FROM_PREFIX))
        .find_map(|line| capture_first(signature_ip_regex(), line))
}

fn ip_from_edit_note(annotations: &[String]) -> Option<String> {
    annotations
        .iter()
        .filter(|line| line.trim_start().starts_with(EDITED_PREFIX))
        .find_map(|line| capture_first(edit_ip_regex(), line))
}

fn capture_first(re: &Regex, text: &str) -> Option<String> {
    Some(re.captures(text)?.get(1)?.as_str().to_string())
}

/// Push counts by symbol
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteTally {
    pub ups: u32,
    pub downs: u32,
    pub neutral: u32,
}

impl VoteTally {
    /// Counts push tags; unknown symbols are ignored
    pub fn from_tags<'a, I: IntoIterator<Item = &'a str>>(tags: I) -> Self {
        let mut tally = Self::default();
        for tag in tags {
            match tag.trim_end() {
                "推" => tally.ups += 1,
                "噓" => tally.downs += 1,
                "→" => tally.neutral += 1,
                _ => {}
            }
        }
        tally
    }
}
