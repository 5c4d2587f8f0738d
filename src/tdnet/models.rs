// src/tdnet/models.rs
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// One announcement from the TDnet feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub summary: String,
    pub link: Option<String>,
    /// Raw timestamp text, parsed lazily.
    pub published: Option<String>,
}

impl FeedEntry {
    /// Calendar date of `published`, in the timestamp's own offset.
    /// `None` when absent or unparsable.
    pub fn published_date(&self) -> Option<NaiveDate> {
        self.published.as_deref().and_then(parse_timestamp_date)
    }

    /// Title and summary joined by a space; the text searched for codes and names.
    pub fn search_text(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }
}

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

pub fn parse_timestamp_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.date_naive());
    }
    // ISO 8601 with a compact offset, e.g. +0900
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.date_naive());
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}
