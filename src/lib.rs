//! # feedkeeper
//!
//! Aggregates articles from a set of named RSS/Atom feeds, deduplicates them
//! by URL and remembers which ones you have read.
//!
//! ## Architecture
//!
//! ```text
//! SourceSet → IngestionEngine → FeedFetcher (Fetcher + Normalizer) → ArticleStore
//!                                                                       ↑
//!                                     QueryService, SourceReconciler ───┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! # Add a source
//! feedkeeper sources add rust-blog https://blog.rust-lang.org/feed.xml
//!
//! # Fetch everything
//! feedkeeper refresh
//!
//! # Unread first, newest first
//! feedkeeper list
//!
//! # Open an article and mark it read
//! feedkeeper open https://blog.rust-lang.org/2024/01/01/post.html
//! ```

/// Application context and error types.
///
/// The [`AppContext`](app::AppContext) struct wires together the store,
/// the ingestion engine, the query service and the reconciler.
pub mod app;

/// Command-line interface using clap.
///
/// - `refresh` - Fetch all sources once
/// - `list` - List stored articles
/// - `unread` - Count unread articles
/// - `open <url>` / `read <url>` - Mark an article read
/// - `sources list|add|remove` - Edit the source list
/// - `watch` - Refresh on a timer
pub mod cli;

/// Configuration file handling (`~/.config/feedkeeper/sources.toml`).
pub mod config;

/// Core domain models.
///
/// - [`Source`](domain::Source) / [`SourceSet`](domain::SourceSet): configured feeds
/// - [`Article`](domain::Article): a stored entry with its read state
/// - [`MergeResult`](domain::MergeResult): counts from one merge
pub mod domain;

/// Feed retrieval.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for fetching raw documents
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
/// - [`FeedFetcher`](fetcher::FeedFetcher): fetch + parse with a timeout
pub mod fetcher;

/// Refresh orchestration with bounded parallelism and cancellation.
pub mod ingest;

/// Feed parsing and normalization.
///
/// Converts RSS 0.9x/1.0/2.0, Atom 0.3/1.0, and JSON Feed 1.0 into
/// [`RawEntry`](domain::RawEntry) values.
pub mod normalizer;

/// Read-only article listings.
pub mod query;

/// Pruning of articles whose source was removed.
pub mod reconcile;

/// SQLite persistence layer.
///
/// - [`ArticleStore`](store::ArticleStore): Trait defining storage operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;

/// Periodic refresh loop.
pub mod watch;
