use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored feed entry. `url` is the identity key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub source: String,
    pub source_title: String,
    pub title: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub read: bool,
    pub read_at: Option<DateTime<Utc>>,
}

impl Article {
    /// A fresh, unread article built from a parsed entry.
    pub fn from_entry(source: &str, source_title: &str, entry: RawEntry) -> Self {
        Self {
            source: source.to_string(),
            source_title: source_title.to_string(),
            title: entry.title,
            url: entry.link,
            published_at: entry.published_at,
            read: false,
            read_at: None,
        }
    }
}

/// One entry as it came out of a feed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub title: String,
    pub link: String,
    pub published_at: DateTime<Utc>,
}

/// A feed document reduced to what the store needs.
#[derive(Debug, Clone, Default)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub entries: Vec<RawEntry>,
}

/// Outcome of merging one batch into the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeResult {
    pub inserted: usize,
    pub skipped: usize,
}

impl MergeResult {
    pub fn total(&self) -> usize {
        self.inserted + self.skipped
    }
}
