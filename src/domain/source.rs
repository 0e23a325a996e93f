use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::app::{FeedkeeperError, Result};

/// A named feed endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub url: String,
}

impl Source {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// The configured sources, in the order they were added, plus the location
/// of the article database.
///
/// Names are unique. A `SourceSet` is handed to every core operation; nothing
/// in the core keeps its own copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSet {
    storage_location: PathBuf,
    sources: Vec<Source>,
}

impl SourceSet {
    pub fn new(storage_location: impl Into<PathBuf>) -> Self {
        Self {
            storage_location: storage_location.into(),
            sources: Vec::new(),
        }
    }

    /// Build a set from already-loaded sources, validating each one.
    pub fn from_sources(
        storage_location: impl Into<PathBuf>,
        sources: impl IntoIterator<Item = Source>,
    ) -> Result<Self> {
        let mut set = Self::new(storage_location);
        for source in sources {
            set.insert(source.name, source.url)?;
        }
        Ok(set)
    }

    pub fn storage_location(&self) -> &Path {
        &self.storage_location
    }

    /// Append a source. Rejects empty or duplicate names and URLs that are
    /// not absolute http(s) URLs.
    pub fn insert(&mut self, name: impl Into<String>, url: impl Into<String>) -> Result<()> {
        let name = name.into().trim().to_string();
        let url = url.into().trim().to_string();

        if name.is_empty() {
            return Err(FeedkeeperError::InvalidSource("source name is empty".into()));
        }
        if self.get(&name).is_some() {
            return Err(FeedkeeperError::InvalidSource(format!(
                "duplicate source name: {}",
                name
            )));
        }

        let parsed = Url::parse(&url)
            .map_err(|e| FeedkeeperError::InvalidSource(format!("{}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FeedkeeperError::InvalidSource(format!(
                "unsupported scheme in {}",
                url
            )));
        }

        self.sources.push(Source { name, url });
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<Source> {
        let index = self.sources.iter().position(|s| s.name == name)?;
        Some(self.sources.remove(index))
    }

    pub fn get(&self, name: &str) -> Option<&Source> {
        self.sources.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Source> {
        self.sources.iter()
    }

    pub fn names(&self) -> HashSet<String> {
        self.sources.iter().map(|s| s.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn into_sources(self) -> Vec<Source> {
        self.sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_is_kept() {
        let mut set = SourceSet::new("articles.db");
        set.insert("zeta", "https://z.example.com/feed").unwrap();
        set.insert("alpha", "https://a.example.com/feed").unwrap();

        let names: Vec<&str> = set.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut set = SourceSet::new("articles.db");
        set.insert("blog", "https://example.com/feed").unwrap();
        let err = set.insert("blog", "https://other.example.com/feed");
        assert!(matches!(err, Err(FeedkeeperError::InvalidSource(_))));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_invalid_urls_rejected() {
        let mut set = SourceSet::new("articles.db");
        assert!(set.insert("a", "not a url").is_err());
        assert!(set.insert("b", "ftp://example.com/feed").is_err());
        assert!(set.insert("  ", "https://example.com/feed").is_err());
        assert!(set.is_empty());
    }

    #[test]
    fn test_remove_and_names() {
        let mut set = SourceSet::new("articles.db");
        set.insert("a", "https://a.example.com/feed").unwrap();
        set.insert("b", "https://b.example.com/feed").unwrap();

        let removed = set.remove("a").unwrap();
        assert_eq!(removed.url, "https://a.example.com/feed");
        assert!(set.remove("a").is_none());

        let names = set.names();
        assert_eq!(names.len(), 1);
        assert!(names.contains("b"));
    }
}
