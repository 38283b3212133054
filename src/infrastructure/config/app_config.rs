//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::args::CliArgs;
use crate::infrastructure::image::ImageLoaderConfig;
use crate::infrastructure::image::memory_cache::{DEFAULT_MAX_COST, DEFAULT_MAX_ENTRIES};

pub(crate) const APP_NAME: &str = "remote-image";
pub(crate) const APP_QUALIFIER: &str = "org";
pub(crate) const APP_ORGANIZATION: &str = "remote-image";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Converts to tracing level.
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Which cache backend the loader uses.
///
/// Chosen once at startup. Unrecognized values select `Disabled`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CacheBackend {
    /// No caching.
    #[default]
    Disabled,
    /// In-process cost-bounded cache.
    Memory,
    /// One file per URL on disk.
    Filesystem,
}

impl From<&str> for CacheBackend {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Self::Memory,
            "filesystem" => Self::Filesystem,
            _ => Self::Disabled,
        }
    }
}

impl From<String> for CacheBackend {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<CacheBackend> for String {
    fn from(value: CacheBackend) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::Memory => write!(f, "memory"),
            Self::Filesystem => write!(f, "filesystem"),
        }
    }
}

/// Cache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Selected backend.
    #[serde(default)]
    pub backend: CacheBackend,

    /// Directory for the filesystem backend. Defaults to the user data dir.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Memory backend budget in payload bytes.
    #[serde(default = "default_max_cost")]
    pub max_cost: u64,

    /// Memory backend entry limit.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            directory: None,
            max_cost: DEFAULT_MAX_COST,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

const fn default_max_cost() -> u64 {
    DEFAULT_MAX_COST
}

const fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

/// Application configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Loader configuration.
    #[serde(default)]
    pub loader: ImageLoaderConfig,

    /// Image shown by consumers until their own image arrives.
    #[serde(default)]
    pub fallback_image: Option<PathBuf>,
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(cache) = &args.cache {
            self.cache.backend = CacheBackend::from(cache.as_str());
        }
        if let Some(cache_dir) = &args.cache_dir {
            self.cache.directory = Some(cache_dir.clone());
        }
        if let Some(max_concurrent) = args.max_concurrent_fetches {
            self.loader.max_concurrent_fetches = max_concurrent;
        }
        if let Some(fallback) = &args.fallback_image {
            self.fallback_image = Some(fallback.clone());
        }
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default config file path.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        Self::default_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Returns effective config path.
    #[must_use]
    pub fn effective_config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(Self::default_config_path)
    }

    /// Returns the log file path. Logs go to stderr when unset.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone()
    }
}
