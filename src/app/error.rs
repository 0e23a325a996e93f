use thiserror::Error;

use crate::config::ConfigError;
use crate::fetcher::FetchError;

#[derive(Error, Debug)]
pub enum FeedkeeperError {
    #[error("Storage unavailable: {0}")]
    StoreUnavailable(#[from] rusqlite::Error),

    #[error("Storage migration failed: {0}")]
    Migration(#[from] rusqlite_migration::Error),

    #[error("Article not found: {0}")]
    ArticleNotFound(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid source: {0}")]
    InvalidSource(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl FeedkeeperError {
    /// Storage faults abort the current operation only; the next call may succeed.
    pub fn is_store_fault(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::Migration(_))
    }
}

pub type Result<T> = std::result::Result<T, FeedkeeperError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_fault_classification() {
        let err = FeedkeeperError::from(rusqlite::Error::InvalidQuery);
        assert!(err.is_store_fault());

        let err = FeedkeeperError::ArticleNotFound("https://example.com/a".into());
        assert!(!err.is_store_fault());
        assert_eq!(err.to_string(), "Article not found: https://example.com/a");
    }
}
