//! Durable session storage.
//!
//! Persists the token and identity snapshot in `<base>/session.json` with
//! restricted permissions (0600). Tokens are never logged or displayed in
//! full. No other component writes this file.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::paths;

/// Session file name under the store's base directory.
const SESSION_FILE: &str = "session.json";

/// Persisted session record: the two durable keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    /// Opaque bearer token.
    pub token: String,
    /// Server-defined identity record, kept opaque.
    pub identity: Value,
}

/// File-backed credential store rooted at a base directory.
///
/// The base directory is injectable so state transitions can be tested
/// against a throwaway location.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    base: PathBuf,
}

impl CredentialStore {
    /// Creates a store rooted at the given directory.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Creates a store rooted at the Reel home directory.
    pub fn default_location() -> Self {
        Self::new(paths::reel_home())
    }

    /// Returns the path to the session file.
    pub fn session_path(&self) -> PathBuf {
        self.base.join(SESSION_FILE)
    }

    /// Loads the persisted session from disk.
    /// Returns `None` if the file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self) -> Result<Option<StoredSession>> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read session from {}", path.display()))?;

        let session = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse session from {}", path.display()))?;

        Ok(Some(session))
    }

    /// Saves the session to disk with restricted permissions (0600).
    ///
    /// Writes through a temp file + rename so a failed write never leaves a
    /// corrupt session behind.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub fn save(&self, session: &StoredSession) -> Result<()> {
        let path = self.session_path();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(session).context("Failed to serialize session")?;

        let tmp_path = path.with_extension("json.tmp");

        // Write with restricted permissions
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&tmp_path)
                .with_context(|| format!("Failed to open {} for writing", tmp_path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", tmp_path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&tmp_path, &contents)
                .with_context(|| format!("Failed to write to {}", tmp_path.display()))?;
        }

        fs::rename(&tmp_path, &path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }

    /// Removes the persisted session. Missing file counts as success.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<()> {
        let path = self.session_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove session file {}", path.display())),
        }
    }
}
