#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for esmc
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/esmc/config.toml)
//! - Environment variables
//! - CLI flags

pub mod constants;
pub mod discovery;
pub mod integrity;
pub mod settings;

pub use discovery::discover_root;
pub use integrity::IntegrityConfig;
pub use settings::{GeneralConfig, PathConfig};

use esmc_errors::{ConfigError, Error};
use esmc_types::ColorChoice;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub integrity: IntegrityConfig,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("esmc").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        // No resolvable config dir is not an error here; defaults apply.
        match Self::default_path() {
            Ok(config_path) if config_path.exists() => Self::load_from_file(&config_path).await,
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        use constants::{ENV_COLOR, ENV_IO_TIMEOUT, ENV_ROOT, ENV_SIGNING_SECRET, ENV_VERBOSE};

        if let Ok(verbose) = std::env::var(ENV_VERBOSE) {
            self.general.verbose = parse_bool(ENV_VERBOSE, verbose)?;
        }

        if let Ok(color) = std::env::var(ENV_COLOR) {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: ENV_COLOR.to_string(),
                        value: color,
                    }
                    .into())
                }
            };
        }

        // An empty secret means unset, not an empty key
        if let Ok(secret) = std::env::var(ENV_SIGNING_SECRET) {
            if !secret.is_empty() {
                self.integrity.secret = Some(secret);
            }
        }

        if let Ok(root) = std::env::var(ENV_ROOT) {
            if !root.is_empty() {
                self.paths.root = Some(PathBuf::from(root));
            }
        }

        if let Ok(timeout) = std::env::var(ENV_IO_TIMEOUT) {
            self.integrity.io_timeout_secs =
                timeout.parse().map_err(|_| ConfigError::InvalidValue {
                    field: ENV_IO_TIMEOUT.to_string(),
                    value: timeout,
                })?;
        }

        self.validate()
    }

    /// Check invariants that serde defaults cannot express
    ///
    /// # Errors
    ///
    /// Returns an error naming the first out-of-range field.
    pub fn validate(&self) -> Result<(), Error> {
        if self.paths.marker_dir.is_empty() || self.paths.marker_dir.contains(['/', '\\']) {
            return Err(ConfigError::InvalidValue {
                field: "paths.marker_dir".to_string(),
                value: self.paths.marker_dir.clone(),
            }
            .into());
        }
        if self.integrity.max_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "integrity.max_concurrency".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        if self.integrity.io_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "integrity.io_timeout_secs".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Resolve the project/package root for a starting directory
    ///
    /// An explicit `paths.root` wins; otherwise the marker directory is
    /// searched for upward from `start`.
    #[must_use]
    pub fn resolve_root(&self, start: &Path) -> PathBuf {
        match &self.paths.root {
            Some(root) => root.clone(),
            None => discover_root(start, &self.paths.marker_dir, self.paths.max_root_hops),
        }
    }
}

fn parse_bool(field: &str, value: String) -> Result<bool, Error> {
    match value.as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value,
        }
        .into()),
    }
}
