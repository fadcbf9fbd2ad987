//! Snapshot store: one directory per set and format.

use std::fs;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{JsonlReader, JsonlWriter, StorageConfig, StorageError};
use crate::models::{RawCardRow, RawDeckRow};

/// What a snapshot holds and when it was captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotManifest {
    pub set_code: String,
    pub format: String,
    pub fetched_at: DateTime<Utc>,
    /// Filter contexts with a cards file
    pub contexts: Vec<String>,
    pub card_rows: usize,
    pub deck_rows: usize,
}

impl SnapshotManifest {
    pub fn new(set_code: &str, format: &str) -> Self {
        Self {
            set_code: set_code.to_string(),
            format: format.to_string(),
            fetched_at: Utc::now(),
            contexts: Vec::new(),
            card_rows: 0,
            deck_rows: 0,
        }
    }
}

/// Reads and writes snapshot files under a data directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    config: StorageConfig,
}

impl SnapshotStore {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn write_cards(
        &self,
        set_code: &str,
        format: &str,
        context: &str,
        rows: &[RawCardRow],
    ) -> Result<usize, StorageError> {
        let path = self.config.cards_path(set_code, format, context)?;
        JsonlWriter::new(path).write_all(rows)
    }

    pub fn read_cards(
        &self,
        set_code: &str,
        format: &str,
        context: &str,
    ) -> Result<Vec<RawCardRow>, StorageError> {
        let path = self.config.cards_path(set_code, format, context)?;
        JsonlReader::new(path).read_all()
    }

    pub fn write_decks(
        &self,
        set_code: &str,
        format: &str,
        rows: &[RawDeckRow],
    ) -> Result<usize, StorageError> {
        let path = self.config.decks_path(set_code, format)?;
        JsonlWriter::new(path).write_all(rows)
    }

    pub fn read_decks(
        &self,
        set_code: &str,
        format: &str,
    ) -> Result<Vec<RawDeckRow>, StorageError> {
        let path = self.config.decks_path(set_code, format)?;
        JsonlReader::new(path).read_all()
    }

    pub fn write_manifest(&self, manifest: &SnapshotManifest) -> Result<(), StorageError> {
        let path = self
            .config
            .manifest_path(&manifest.set_code, &manifest.format)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(manifest)?)?;
        info!(
            "Snapshot {}/{}: {} card rows, {} deck rows",
            manifest.set_code, manifest.format, manifest.card_rows, manifest.deck_rows
        );
        Ok(())
    }

    pub fn read_manifest(
        &self,
        set_code: &str,
        format: &str,
    ) -> Result<SnapshotManifest, StorageError> {
        let path = self.config.manifest_path(set_code, format)?;
        if !path.exists() {
            return Err(StorageError::PathNotFound(path));
        }
        Ok(serde_json::from_str(&fs::read_to_string(&path)?)?)
    }

    /// Set codes with at least one snapshot, sorted.
    pub fn list_sets(&self) -> Result<Vec<String>, StorageError> {
        let dir = self.config.snapshots_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut sets = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    sets.push(name.to_string());
                }
            }
        }

        sets.sort();
        Ok(sets)
    }
}
