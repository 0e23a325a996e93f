//! Configuration for feedkeeper.
//!
//! The source list, storage location and fetch settings live in one TOML
//! file, by default `~/.config/feedkeeper/sources.toml`. If the file doesn't
//! exist, a commented default is created on first load.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{Source, SourceSet};
use crate::ingest::DEFAULT_WORKERS;

/// Main configuration struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_storage_location")]
    pub storage_location: PathBuf,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default, rename = "source", skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,
}

/// HTTP settings for feed retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Seconds before one fetch is abandoned.
    pub timeout_secs: u64,
    /// Feeds fetched concurrently.
    pub workers: usize,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            workers: DEFAULT_WORKERS,
            user_agent: concat!("feedkeeper/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_location: default_storage_location(),
            fetch: FetchConfig::default(),
            sources: Vec::new(),
        }
    }
}

fn default_storage_location() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("feedkeeper")
        .join("articles.db")
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_config_path()?)
    }

    /// Load configuration from `path`.
    ///
    /// If the file doesn't exist, creates a default one with comments.
    /// Missing fields use default values.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::create_default_config(path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::default_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        write_file(path, &content)
    }

    /// Get the default config file path: `~/.config/feedkeeper/sources.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("feedkeeper").join("sources.toml"))
    }

    /// The configured sources, validated.
    pub fn source_set(&self) -> crate::app::Result<SourceSet> {
        SourceSet::from_sources(
            self.storage_location.clone(),
            self.sources.iter().cloned(),
        )
    }

    /// Fetch settings for this run. A one-off worker count overrides the
    /// file's value without being saved back.
    pub fn fetch_settings(&self, workers: Option<usize>) -> FetchConfig {
        let mut fetch = self.fetch.clone();
        if let Some(workers) = workers {
            fetch.workers = workers;
        }
        fetch
    }

    /// Replace the sources and storage location with a confirmed set.
    pub fn apply(&mut self, sources: SourceSet) {
        self.storage_location = sources.storage_location().to_path_buf();
        self.sources = sources.into_sources();
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        write_file(path, DEFAULT_CONFIG)
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(path, content).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

const DEFAULT_CONFIG: &str = r##"# feedkeeper configuration
#
# Where articles and their read state are kept. Defaults to the platform
# data directory.
# storage_location = "/home/me/.local/share/feedkeeper/articles.db"

[fetch]
# Seconds before a single feed fetch is abandoned
timeout_secs = 15

# Feeds fetched at the same time
workers = 4

# One [[source]] block per feed. Names must be unique.
#
# [[source]]
# name = "rust-blog"
# url = "https://blog.rust-lang.org/feed.xml"
"##;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}
