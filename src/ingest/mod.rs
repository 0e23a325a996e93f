pub mod cancel;
pub mod report;

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::domain::{Article, ParsedFeed, Source, SourceSet};
use crate::fetcher::FeedFetcher;
use crate::store::ArticleStore;

pub use cancel::CancelToken;
pub use report::{RefreshReport, SourceError, SourceOutcome, SourceSummary};

pub const DEFAULT_WORKERS: usize = 4;

/// Runs refresh cycles: fetches every source with bounded parallelism and
/// merges each source's entries into the store as one batch.
pub struct IngestionEngine<S> {
    fetcher: Arc<FeedFetcher>,
    store: Arc<S>,
    semaphore: Arc<Semaphore>,
}

impl<S: ArticleStore + Send + Sync + 'static> IngestionEngine<S> {
    pub fn new(fetcher: Arc<FeedFetcher>, store: Arc<S>) -> Self {
        Self::with_workers(fetcher, store, DEFAULT_WORKERS)
    }

    pub fn with_workers(fetcher: Arc<FeedFetcher>, store: Arc<S>, workers: usize) -> Self {
        Self {
            fetcher,
            store,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    pub async fn refresh(&self, sources: &SourceSet) -> RefreshReport {
        self.refresh_with_cancel(sources, &CancelToken::new()).await
    }

    /// One refresh cycle. Never fails as a whole: every source gets an entry
    /// in the report, in source-set order.
    ///
    /// Cancelling abandons fetches still in flight. Sources that were
    /// already merged keep their articles.
    pub async fn refresh_with_cancel(
        &self,
        sources: &SourceSet,
        cancel: &CancelToken,
    ) -> RefreshReport {
        let mut handles = Vec::with_capacity(sources.len());

        for source in sources.iter() {
            let source = source.clone();
            let fetcher = self.fetcher.clone();
            let store = self.store.clone();
            let semaphore = self.semaphore.clone();
            let mut stop = cancel.subscribe();

            let name = source.name.clone();
            let handle = tokio::spawn(async move {
                tokio::select! {
                    biased;
                    _ = cancel::cancelled(&mut stop) => Err(SourceError::Cancelled),
                    outcome = ingest_source(&fetcher, &store, &semaphore, &source) => outcome,
                }
            });

            handles.push((name, handle));
        }

        let mut report = RefreshReport::default();
        for (name, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("Task join error for {}: {}", name, e);
                    Err(SourceError::Aborted(e.to_string()))
                }
            };

            if let Err(ref e) = outcome {
                tracing::warn!("Source {} failed: {}", name, e);
            }
            report.push(name, outcome);
        }

        report
    }
}

async fn ingest_source<S: ArticleStore>(
    fetcher: &FeedFetcher,
    store: &Arc<S>,
    semaphore: &Semaphore,
    source: &Source,
) -> SourceOutcome {
    let feed = {
        let _permit = semaphore
            .acquire()
            .await
            .map_err(|e| SourceError::Aborted(e.to_string()))?;
        fetcher.fetch(source).await?
    };

    let articles = tag_entries(source, feed);
    let result = store.merge_all(&articles).map_err(SourceError::Store)?;

    tracing::info!(
        "Merged {} of {} articles from {} ({} already known)",
        result.inserted,
        result.total(),
        source.name,
        result.skipped
    );

    Ok(result)
}

/// Turn parsed entries into unread articles owned by `source`.
fn tag_entries(source: &Source, feed: ParsedFeed) -> Vec<Article> {
    let source_title = feed.title.unwrap_or_else(|| source.name.clone());
    feed.entries
        .into_iter()
        .map(|entry| Article::from_entry(&source.name, &source_title, entry))
        .collect()
}
