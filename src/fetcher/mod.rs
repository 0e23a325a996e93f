pub mod http_fetcher;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{ParsedFeed, Source};
use crate::normalizer::Normalizer;

pub use http_fetcher::HttpFetcher;

/// Why a single feed could not be retrieved or understood.
#[derive(Error, Debug)]
pub enum FetchCause {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server answered HTTP {0}")]
    Status(u16),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("feed parsing error: {0}")]
    Parse(String),
}

/// A failed fetch, scoped to the source it happened on.
#[derive(Error, Debug)]
#[error("failed to fetch {source_name}: {cause}")]
pub struct FetchError {
    pub source_name: String,
    #[source]
    pub cause: FetchCause,
}

impl FetchError {
    pub fn new(source_name: impl Into<String>, cause: FetchCause) -> Self {
        Self {
            source_name: source_name.into(),
            cause,
        }
    }
}

/// Transport for feed documents: returns the raw body for a URL.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchCause>;
}

/// Fetches one source and parses it, bounded by a timeout.
pub struct FeedFetcher {
    transport: Arc<dyn Fetcher + Send + Sync>,
    normalizer: Normalizer,
    timeout: Duration,
}

impl FeedFetcher {
    pub fn new(transport: Arc<dyn Fetcher + Send + Sync>, timeout: Duration) -> Self {
        Self {
            transport,
            normalizer: Normalizer::new(),
            timeout,
        }
    }

    /// Retrieve and parse `source`. Never panics or propagates past the
    /// source: every failure comes back as a `FetchError` naming it.
    pub async fn fetch(&self, source: &Source) -> Result<ParsedFeed, FetchError> {
        let fetched_at = Utc::now();

        match tokio::time::timeout(self.timeout, self.fetch_and_parse(&source.url, fetched_at))
            .await
        {
            Ok(Ok(feed)) => Ok(feed),
            Ok(Err(cause)) => Err(FetchError::new(&source.name, cause)),
            Err(_) => Err(FetchError::new(
                &source.name,
                FetchCause::Timeout(self.timeout),
            )),
        }
    }

    async fn fetch_and_parse(
        &self,
        url: &str,
        fetched_at: DateTime<Utc>,
    ) -> Result<ParsedFeed, FetchCause> {
        let body = self.transport.fetch(url).await?;
        tracing::debug!("Fetched {} bytes from {}", body.len(), url);
        self.normalizer.normalize(url, &body, fetched_at)
    }
}
