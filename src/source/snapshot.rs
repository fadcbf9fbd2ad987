//! Offline source backed by JSONL snapshots.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::{info, warn};

use super::{DataSource, SetInfo, SourceError};
use crate::calculate::archetype::context_permutations;
use crate::calculate::balance::{balance_score, SetBalance};
use crate::models::{Card, DeckSet, Format, RawCardRow, RawDeckRow, GLOBAL_CONTEXT, PAIRS, TRIOS};
use crate::storage::{SnapshotManifest, SnapshotStore};

/// Contexts captured per snapshot: global plus every ordering of each
/// two- and three-color archetype.
pub fn snapshot_contexts() -> Vec<String> {
    let mut contexts = vec![GLOBAL_CONTEXT.to_string()];
    for pair in PAIRS.iter().chain(TRIOS.iter()) {
        contexts.extend(context_permutations(pair.code));
    }
    contexts
}

/// Copy one set and format from `remote` into the local store.
pub async fn capture(
    remote: &dyn DataSource,
    store: &SnapshotStore,
    set_code: &str,
    format: &Format,
) -> Result<SnapshotManifest, SourceError> {
    let decks = remote.deck_rows(set_code, format).await?;
    let cards = remote
        .card_rows(set_code, format, &snapshot_contexts())
        .await?;

    let mut by_context: BTreeMap<String, Vec<RawCardRow>> = BTreeMap::new();
    for row in cards {
        let context = row
            .filter_context
            .clone()
            .unwrap_or_else(|| GLOBAL_CONTEXT.to_string());
        by_context.entry(context).or_default().push(row);
    }

    let mut manifest = SnapshotManifest::new(set_code, format.as_str());
    for (context, rows) in &by_context {
        manifest.card_rows += store.write_cards(set_code, format.as_str(), context, rows)?;
        manifest.contexts.push(context.clone());
    }
    manifest.deck_rows = store.write_decks(set_code, format.as_str(), &decks)?;
    store.write_manifest(&manifest)?;

    info!(
        "Captured {}/{} from {} ({} contexts)",
        set_code,
        format,
        remote.name(),
        manifest.contexts.len()
    );
    Ok(manifest)
}

/// Reads rows from snapshots captured earlier.
pub struct SnapshotSource {
    store: SnapshotStore,
}

impl SnapshotSource {
    pub fn new(store: SnapshotStore) -> Self {
        Self { store }
    }

    fn contexts(&self, set_code: &str, format: &Format) -> Vec<String> {
        match self.store.read_manifest(set_code, format.as_str()) {
            Ok(manifest) => manifest.contexts,
            Err(_) => snapshot_contexts(),
        }
    }
}

#[async_trait]
impl DataSource for SnapshotSource {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    async fn sets(&self) -> Result<Vec<SetInfo>, SourceError> {
        let mut sets: Vec<SetInfo> = self
            .store
            .list_sets()?
            .into_iter()
            .map(|code| SetInfo {
                code,
                name: None,
                active: true,
                start_date: None,
            })
            .collect();
        // Newest first, matching the remote ordering as closely as codes allow
        sets.reverse();
        Ok(sets)
    }

    async fn card_rows(
        &self,
        set_code: &str,
        format: &Format,
        contexts: &[String],
    ) -> Result<Vec<RawCardRow>, SourceError> {
        let mut rows = Vec::new();
        for context in contexts {
            rows.extend(self.store.read_cards(set_code, format.as_str(), context)?);
        }
        Ok(rows)
    }

    async fn card_contexts(
        &self,
        set_code: &str,
        format: &Format,
        card_name: &str,
    ) -> Result<Vec<RawCardRow>, SourceError> {
        let contexts = self.contexts(set_code, format);
        let rows = self.card_rows(set_code, format, &contexts).await?;
        Ok(rows
            .into_iter()
            .filter(|r| r.card_name.as_deref() == Some(card_name))
            .collect())
    }

    async fn deck_rows(
        &self,
        set_code: &str,
        format: &Format,
    ) -> Result<Vec<RawDeckRow>, SourceError> {
        Ok(self.store.read_decks(set_code, format.as_str())?)
    }

    /// Computed locally from every captured set of the format.
    async fn format_balance(&self, format: &Format) -> Result<Vec<SetBalance>, SourceError> {
        let mut balances = Vec::new();
        for set_code in self.store.list_sets()? {
            let deck_rows = self.store.read_decks(&set_code, format.as_str())?;
            if deck_rows.is_empty() {
                continue;
            }
            let cards = Card::from_rows(self.store.read_cards(
                &set_code,
                format.as_str(),
                GLOBAL_CONTEXT,
            )?);
            if cards.is_empty() {
                warn!("{}/{} has decks but no global cards", set_code, format);
            }
            let decks = DeckSet::from_rows(deck_rows);
            balances.push(SetBalance::from_score(&set_code, &balance_score(&decks, &cards)));
        }
        Ok(balances)
    }
}
