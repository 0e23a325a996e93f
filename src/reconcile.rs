use std::sync::Arc;

use crate::app::Result;
use crate::domain::SourceSet;
use crate::store::ArticleStore;

/// Keeps stored articles in line with the configured sources.
pub struct SourceReconciler<S> {
    store: Arc<S>,
}

impl<S: ArticleStore> SourceReconciler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Delete every article whose source is not in `new_sources`.
    ///
    /// Call this only once a configuration change is confirmed: removed
    /// articles, and their read state, are gone for good.
    pub fn reconcile(&self, new_sources: &SourceSet) -> Result<usize> {
        let removed = self.store.prune_sources_not_in(&new_sources.names())?;
        if removed > 0 {
            tracing::info!(
                "Removed {} articles from sources no longer configured",
                removed
            );
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Article;
    use crate::store::{ListOrder, SqliteStore};
    use chrono::{TimeZone, Utc};

    fn article(source: &str, url: &str) -> Article {
        Article {
            source: source.into(),
            source_title: source.to_uppercase(),
            title: url.into(),
            url: url.into(),
            published_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            read: false,
            read_at: None,
        }
    }

    #[test]
    fn test_reconcile_removes_only_dropped_sources() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        store
            .merge_all(&[
                article("a", "https://a.example.com/1"),
                article("b", "https://b.example.com/1"),
                article("c", "https://c.example.com/1"),
            ])
            .unwrap();

        let mut sources = SourceSet::new(":memory:");
        sources.insert("a", "https://a.example.com/feed").unwrap();
        sources.insert("b", "https://b.example.com/feed").unwrap();

        let reconciler = SourceReconciler::new(store.clone());
        assert_eq!(reconciler.reconcile(&sources).unwrap(), 1);

        let remaining: Vec<String> = store
            .list(ListOrder::default())
            .unwrap()
            .into_iter()
            .map(|a| a.source)
            .collect();
        assert_eq!(remaining.len(), 2);
        assert!(!remaining.contains(&"c".to_string()));

        // Nothing left to remove the second time.
        assert_eq!(reconciler.reconcile(&sources).unwrap(), 0);
    }
}
