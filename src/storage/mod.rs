//! Local snapshot storage.
//!
//! Fetched rows are kept as JSONL under the data directory so every view can
//! be rebuilt offline:
//! - `snapshots/<set>/<format>/cards-<context>.jsonl`
//! - `snapshots/<set>/<format>/decks.jsonl`
//! - `snapshots/<set>/<format>/manifest.json`
//! - `state/preferences.toml`

pub mod jsonl;
pub mod snapshot;

pub use jsonl::{JsonlReader, JsonlWriter};
pub use snapshot::{SnapshotManifest, SnapshotStore};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Invalid path segment: {0:?}")]
    InvalidPath(String),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

/// Reject segments that would escape the snapshot tree.
fn segment(s: &str) -> Result<&str, StorageError> {
    let s = s.trim();
    if s.is_empty() || s == "." || s == ".." || s.contains(['/', '\\']) {
        return Err(StorageError::InvalidPath(s.to_string()));
    }
    Ok(s)
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn snapshots_dir(&self) -> PathBuf {
        self.data_dir.join("snapshots")
    }

    pub fn state_dir(&self) -> PathBuf {
        self.data_dir.join("state")
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.state_dir().join("preferences.toml")
    }

    /// Directory holding one set/format snapshot.
    pub fn snapshot_dir(&self, set_code: &str, format: &str) -> Result<PathBuf, StorageError> {
        Ok(self
            .snapshots_dir()
            .join(segment(set_code)?)
            .join(segment(format)?))
    }

    pub fn cards_path(
        &self,
        set_code: &str,
        format: &str,
        context: &str,
    ) -> Result<PathBuf, StorageError> {
        Ok(self
            .snapshot_dir(set_code, format)?
            .join(format!("cards-{}.jsonl", segment(context)?)))
    }

    pub fn decks_path(&self, set_code: &str, format: &str) -> Result<PathBuf, StorageError> {
        Ok(self.snapshot_dir(set_code, format)?.join("decks.jsonl"))
    }

    pub fn manifest_path(&self, set_code: &str, format: &str) -> Result<PathBuf, StorageError> {
        Ok(self.snapshot_dir(set_code, format)?.join("manifest.json"))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}
