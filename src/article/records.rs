//! Article and comment records
//!
//! Serialized field names double as the CSV column headers.

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

/// Output format for all timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A push reaction attached to an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vote {
    /// 推
    Up,
    /// →
    Neutral,
    /// 噓
    Down,
}

impl Vote {
    /// Maps a push tag to a vote by its first character
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().chars().next()? {
            '推' => Some(Self::Up),
            '→' => Some(Self::Neutral),
            '噓' => Some(Self::Down),
            _ => None,
        }
    }

    pub fn value(&self) -> i8 {
        match self {
            Self::Up => 1,
            Self::Neutral => 0,
            Self::Down => -1,
        }
    }
}

impl Serialize for Vote {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.value())
    }
}

/// Metadata for one intact, non-forwarded article
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleRecord {
    pub author: String,
    pub alias: String,
    pub title: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub date: NaiveDateTime,
    pub ip: String,
    pub city: String,
    pub country: String,
    pub ups: u32,
    pub downs: u32,
    /// Number of neutral (→) pushes
    pub comments: u32,
    pub url: String,
}

/// One push comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentRecord {
    pub url: String,
    pub author: String,
    #[serde(rename = "push")]
    pub vote: Vote,
    pub text: String,
    pub ip: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    #[serde(rename = "dt", serialize_with = "serialize_optional_timestamp")]
    pub timestamp: Option<NaiveDateTime>,
}

fn serialize_timestamp<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
}

fn serialize_optional_timestamp<S: Serializer>(
    value: &Option<NaiveDateTime>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(ts) => serializer.collect_str(&ts.format(TIMESTAMP_FORMAT)),
        None => serializer.serialize_none(),
    }
}
