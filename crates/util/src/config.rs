//! CLI configuration persistence.
//!
//! The configuration is a small JSON file written to the standard
//! configuration directory (`~/.config/actionform/config.json` on most
//! platforms). `ACTIONFORM_CONFIG_PATH` overrides the location. A missing file
//! yields defaults; an unreadable or malformed one is logged and also yields
//! defaults so the CLI keeps working.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::expand_tilde;

/// Environment variable allowing callers to override the config file path.
pub const CONFIG_PATH_ENV: &str = "ACTIONFORM_CONFIG_PATH";

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Error surfaced when reading or writing the config file fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure (for example, permissions or missing directory).
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failure.
    #[error("config serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persisted CLI settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Form document used when a subcommand is invoked without `--file`.
    #[serde(default)]
    pub default_document: Option<String>,
    /// Pretty-print JSON output.
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            default_document: None,
            pretty: default_pretty(),
        }
    }
}

const fn default_pretty() -> bool {
    true
}

impl CliConfig {
    /// Loads the config from [`default_config_path`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&default_config_path())
    }

    /// Loads the config from `path`, falling back to defaults when the file is absent or malformed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(config) => Ok(config),
                Err(error) => {
                    warn!(
                        path = %path.display(),
                        error = %error,
                        "Failed to parse config file; using defaults"
                    );
                    Ok(Self::default())
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(ConfigError::Io(error)),
        }
    }

    /// Writes the config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// The default document path with `~` expanded, if one is configured.
    pub fn default_document_path(&self) -> Option<PathBuf> {
        self.default_document
            .as_deref()
            .filter(|path| !path.trim().is_empty())
            .map(expand_tilde)
    }
}

/// Path of the config file: the env override when set, otherwise the platform config directory.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("actionform")
        .join(CONFIG_FILE_NAME)
}
