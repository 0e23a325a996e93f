use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::app::Result;
use crate::config::FetchConfig;
use crate::fetcher::{FeedFetcher, Fetcher, HttpFetcher};
use crate::ingest::IngestionEngine;
use crate::query::QueryService;
use crate::reconcile::SourceReconciler;
use crate::store::SqliteStore;

pub struct AppContext {
    pub store: Arc<SqliteStore>,
    pub engine: IngestionEngine<SqliteStore>,
    pub query: QueryService<SqliteStore>,
    pub reconciler: SourceReconciler<SqliteStore>,
}

impl AppContext {
    /// Open the store at `storage_location` and fetch over HTTP.
    pub fn new(storage_location: &Path, fetch: &FetchConfig) -> Result<Self> {
        if let Some(parent) = storage_location.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let store = Arc::new(SqliteStore::new(storage_location)?);
        let transport = Arc::new(HttpFetcher::new(fetch)?);
        Ok(Self::with_parts(store, transport, fetch))
    }

    pub fn in_memory(transport: Arc<dyn Fetcher + Send + Sync>, fetch: &FetchConfig) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        Ok(Self::with_parts(store, transport, fetch))
    }

    pub fn with_parts(
        store: Arc<SqliteStore>,
        transport: Arc<dyn Fetcher + Send + Sync>,
        fetch: &FetchConfig,
    ) -> Self {
        let fetcher = Arc::new(FeedFetcher::new(
            transport,
            Duration::from_secs(fetch.timeout_secs),
        ));

        Self {
            engine: IngestionEngine::with_workers(fetcher, store.clone(), fetch.workers),
            query: QueryService::new(store.clone()),
            reconciler: SourceReconciler::new(store.clone()),
            store,
        }
    }
}
