use std::sync::Arc;

use crate::app::Result;
use crate::domain::Article;
use crate::store::{ArticleFilter, ArticleStore, ListOrder};

/// Read-only view of the article store for presentation code.
pub struct QueryService<S> {
    store: Arc<S>,
}

impl<S: ArticleStore> QueryService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<Article>> {
        self.store.list(ListOrder::ByReadThenDateDesc)
    }

    pub fn list_filtered(&self, filter: &ArticleFilter) -> Result<Vec<Article>> {
        self.store
            .list_filtered(filter, ListOrder::ByReadThenDateDesc)
    }

    pub fn count_unread(&self) -> Result<usize> {
        self.store.count_unread()
    }

    pub fn get(&self, url: &str) -> Result<Option<Article>> {
        self.store.get(url)
    }
}
