//! Configuration management for Reel.
//!
//! Loads configuration from ${REEL_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
/// To update, edit default_config.toml directly.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for Reel configuration and data directories.
    //!
    //! REEL_HOME resolution order:
    //! 1. REEL_HOME environment variable (if set)
    //! 2. ~/.config/reel (default)

    use std::path::PathBuf;

    /// Returns the Reel home directory.
    ///
    /// Checks REEL_HOME env var first, falls back to ~/.config/reel
    pub fn reel_home() -> PathBuf {
        if let Ok(home) = std::env::var("REEL_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("reel"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        reel_home().join("config.toml")
    }
}

/// Session store behavior configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Reject a new operation while another one is still in flight.
    ///
    /// Off by default: concurrent operations race and the last response
    /// to resolve wins.
    pub reject_concurrent: bool,
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the platform backend (overridden by REEL_BASE_URL).
    pub base_url: Option<String>,

    /// Timeout for API requests in seconds (0 disables)
    pub request_timeout_secs: u32,

    /// Session store behavior.
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// Default is disabled
    const DEFAULT_REQUEST_TIMEOUT_SECS: u32 = 0;

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Returns the configured base URL if set and non-empty.
    pub fn effective_base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(u64::from(self.request_timeout_secs)))
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            session: SessionConfig::default(),
        }
    }
}
