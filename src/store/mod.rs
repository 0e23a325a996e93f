pub mod sqlite;

use std::collections::HashSet;

use crate::app::Result;
use crate::domain::{Article, MergeResult};

pub use sqlite::SqliteStore;

/// Sort orders for article listings. Every order ends with `url` ascending
/// so equal timestamps list deterministically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListOrder {
    /// Unread first, then newest first.
    #[default]
    ByReadThenDateDesc,
    /// Newest first, read state ignored.
    DateDesc,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFilter {
    pub source: Option<String>,
    pub unread_only: bool,
    pub limit: Option<usize>,
}

impl ArticleFilter {
    pub fn unread() -> Self {
        Self {
            unread_only: true,
            ..Default::default()
        }
    }
}

/// Durable article repository keyed by URL.
///
/// Mutations are serialized by the implementation; readers always see a
/// consistent snapshot.
pub trait ArticleStore {
    /// Insert every candidate whose URL is not stored yet, in one
    /// transaction. Existing rows are never touched.
    fn merge_all(&self, candidates: &[Article]) -> Result<MergeResult>;

    /// Mark an article read. Marking it again is a no-op.
    fn mark_read(&self, url: &str) -> Result<()>;

    /// Delete every article whose source is not in `valid_names`.
    fn prune_sources_not_in(&self, valid_names: &HashSet<String>) -> Result<usize>;

    fn list_filtered(&self, filter: &ArticleFilter, order: ListOrder) -> Result<Vec<Article>>;

    fn count(&self, filter: &ArticleFilter) -> Result<usize>;

    fn get(&self, url: &str) -> Result<Option<Article>>;

    fn list(&self, order: ListOrder) -> Result<Vec<Article>> {
        self.list_filtered(&ArticleFilter::default(), order)
    }

    fn count_unread(&self) -> Result<usize> {
        self.count(&ArticleFilter::unread())
    }
}
