use serde::Serialize;
use thiserror::Error;

use crate::app::FeedkeeperError;
use crate::domain::MergeResult;
use crate::fetcher::FetchError;

/// Why one source contributed nothing to a refresh.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("could not store articles: {0}")]
    Store(#[source] FeedkeeperError),

    #[error("refresh cancelled")]
    Cancelled,

    #[error("worker aborted: {0}")]
    Aborted(String),
}

pub type SourceOutcome = Result<MergeResult, SourceError>;

/// Per-source results of one refresh, in source-set order.
#[derive(Debug, Default)]
pub struct RefreshReport {
    per_source: Vec<(String, SourceOutcome)>,
}

impl RefreshReport {
    pub(crate) fn push(&mut self, name: String, outcome: SourceOutcome) {
        self.per_source.push((name, outcome));
    }

    pub fn get(&self, name: &str) -> Option<&SourceOutcome> {
        self.per_source
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, outcome)| outcome)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SourceOutcome)> {
        self.per_source.iter().map(|(n, o)| (n.as_str(), o))
    }

    pub fn len(&self) -> usize {
        self.per_source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.per_source.is_empty()
    }

    pub fn total_inserted(&self) -> usize {
        self.per_source
            .iter()
            .filter_map(|(_, o)| o.as_ref().ok())
            .map(|r| r.inserted)
            .sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &SourceError)> {
        self.per_source
            .iter()
            .filter_map(|(n, o)| o.as_ref().err().map(|e| (n.as_str(), e)))
    }

    pub fn is_complete_success(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn was_cancelled(&self) -> bool {
        self.failures()
            .any(|(_, e)| matches!(e, SourceError::Cancelled))
    }

    /// Flattened view for machine-readable output.
    pub fn summaries(&self) -> Vec<SourceSummary> {
        self.iter()
            .map(|(name, outcome)| match outcome {
                Ok(result) => SourceSummary {
                    source: name.to_string(),
                    inserted: result.inserted,
                    skipped: result.skipped,
                    error: None,
                },
                Err(e) => SourceSummary {
                    source: name.to_string(),
                    inserted: 0,
                    skipped: 0,
                    error: Some(e.to_string()),
                },
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceSummary {
    pub source: String,
    pub inserted: usize,
    pub skipped: usize,
    pub error: Option<String>,
}
