pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "feedkeeper")]
#[command(about = "Aggregate feeds and keep track of what you have read", long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of parallel workers for fetching feeds
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch all sources and store new articles
    Refresh {
        /// Print the per-source report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List stored articles, unread first
    List {
        /// Only show unread articles
        #[arg(long)]
        unread: bool,

        /// Only show articles from this source
        #[arg(short, long)]
        source: Option<String>,

        /// Show at most this many articles
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the number of unread articles
    Unread,
    /// Open an article in the default handler and mark it read
    Open {
        /// URL of the article
        url: String,
    },
    /// Mark an article read without opening it
    Read {
        /// URL of the article
        url: String,
    },
    /// Manage configured sources
    Sources {
        #[command(subcommand)]
        action: SourceAction,
    },
    /// Refresh periodically until interrupted
    Watch {
        /// Refresh interval (e.g., "30m", "1h", "1d")
        #[arg(short, long, default_value = "30m")]
        interval: String,

        /// Skip the refresh on start
        #[arg(long)]
        no_initial: bool,
    },
}

#[derive(Subcommand)]
pub enum SourceAction {
    /// List configured sources
    List,
    /// Add a source
    Add {
        /// Unique name of the source
        name: String,
        /// URL of the feed
        url: String,
    },
    /// Remove a source and delete its stored articles
    Remove {
        /// Name of the source
        name: String,
    },
}
