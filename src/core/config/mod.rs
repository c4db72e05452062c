//! core::config
//!
//! Configuration schema and loading.
//!
//! # Config Locations
//!
//! Searched in order; the first file that exists wins:
//! 1. An explicit path (e.g. `gitpin --config <path>`)
//! 2. `$GITPIN_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/gitpin/config.toml`
//! 4. `~/.gitpin/config.toml`
//!
//! No file at all is not an error; defaults are used.
//!
//! # Example
//!
//! ```no_run
//! use gitpin::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! println!("read timeout: {:?}", config.file.transport.read_timeout());
//! ```

pub mod schema;

pub use schema::{CheckerSettings, FileConfig, ForgeSettings, TransportSettings};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed file contents (defaults if no file was found).
    pub file: FileConfig,
    /// Path the configuration was loaded from, if any.
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `explicit` or the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit path does not exist, or if a config
    /// file exists but cannot be read, parsed, or validated.
    pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load_from(path);
        }

        match Self::discover() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::debug!("no config file found, using defaults");
                Ok(Config::default())
            }
        }
    }

    /// Load and validate a specific config file.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file = Self::parse(&contents).map_err(|e| match e {
            ConfigError::ParseError { message, .. } => ConfigError::ParseError {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(Config {
            file,
            path: Some(path.to_path_buf()),
        })
    }

    /// Parse and validate config file contents.
    pub fn parse(contents: &str) -> Result<FileConfig, ConfigError> {
        let file: FileConfig = toml::from_str(contents).map_err(|e| ConfigError::ParseError {
            path: PathBuf::new(),
            message: e.to_string(),
        })?;
        file.validate()?;
        Ok(file)
    }

    /// Path the configuration came from.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// First existing config file among the default locations.
    fn discover() -> Option<PathBuf> {
        // 1. Check $GITPIN_CONFIG
        if let Ok(path) = std::env::var("GITPIN_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/gitpin/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("gitpin/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.gitpin/config.toml
        dirs::home_dir()
            .map(|home| home.join(".gitpin/config.toml"))
            .filter(|path| path.exists())
    }
}
