use super::app_config::AppConfig;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to determine config directory")]
    ConfigDirNotFound,
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl ConfigError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Locates, reads and writes `config.toml`.
pub struct StorageManager {
    config_dir: PathBuf,
}

impl StorageManager {
    /// Uses the platform config directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration directory cannot be determined.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = AppConfig::default_config_dir().ok_or(ConfigError::ConfigDirNotFound)?;
        Ok(Self { config_dir })
    }

    /// Uses `path` as the config directory.
    #[must_use]
    pub fn with_dir(path: PathBuf) -> Self {
        Self { config_dir: path }
    }

    /// Returns the configuration directory path.
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Path of the config file when no override is given.
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    /// Loads the configuration from `path_override` or the default file.
    ///
    /// A missing file is created with defaults. A malformed file is left
    /// untouched and defaults are used. The returned config remembers the
    /// path it came from.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or created.
    pub fn load_config(&self, path_override: Option<&Path>) -> Result<AppConfig, ConfigError> {
        let path = path_override.map_or_else(|| self.config_file(), Path::to_path_buf);

        let mut config = match fs::read_to_string(&path) {
            Ok(content) => toml::from_str::<AppConfig>(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), "Failed to parse config file: {e}. Using defaults.");
                AppConfig::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "Config file not found, creating default");
                let config = AppConfig::default();
                write_atomic(&path, &config)?;
                config
            }
            Err(e) => return Err(ConfigError::io(&path, e)),
        };

        debug!(path = %path.display(), backend = %config.cache.backend, "Configuration loaded");
        config.config = Some(path);
        Ok(config)
    }

    /// Writes `config` to the default file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be written.
    pub fn save_config(&self, config: &AppConfig) -> Result<(), ConfigError> {
        write_atomic(&self.config_file(), config)
    }
}

fn write_atomic(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(config)?;

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;

    let mut temp_file =
        tempfile::NamedTempFile::new_in(parent).map_err(|e| ConfigError::io(parent, e))?;
    temp_file
        .write_all(content.as_bytes())
        .map_err(|e| ConfigError::io(path, e))?;
    temp_file
        .persist(path)
        .map_err(|e| ConfigError::io(path, e.error))?;

    Ok(())
}
