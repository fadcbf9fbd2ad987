//! Data sources for card and archetype rows.
//!
//! A [`DataSource`] returns raw rows; the `load_*` helpers turn them into
//! validated models. Two sources exist: the hosted PostgREST API and local
//! JSONL snapshots written by `limitless fetch`.

pub mod postgrest;
pub mod snapshot;

pub use postgrest::PostgrestSource;
pub use snapshot::SnapshotSource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::calculate::archetype::context_permutations;
use crate::calculate::balance::SetBalance;
use crate::config::ConfigError;
use crate::models::{
    ArchetypeCard, Card, ContextCard, DeckSet, Format, RawCardRow, RawDeckRow, GLOBAL_CONTEXT,
};
use crate::storage::StorageError;

/// Errors raised while loading rows.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// A set listed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetInfo {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub start_date: Option<String>,
}

fn default_active() -> bool {
    true
}

/// Provider of raw statistics rows.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Source name for logging.
    fn name(&self) -> &'static str;

    /// Active sets, newest first.
    async fn sets(&self) -> Result<Vec<SetInfo>, SourceError>;

    /// Card rows under any of the given filter contexts.
    async fn card_rows(
        &self,
        set_code: &str,
        format: &Format,
        contexts: &[String],
    ) -> Result<Vec<RawCardRow>, SourceError>;

    /// Every context row of one card.
    async fn card_contexts(
        &self,
        set_code: &str,
        format: &Format,
        card_name: &str,
    ) -> Result<Vec<RawCardRow>, SourceError>;

    /// Archetype rows, aggregates included.
    async fn deck_rows(
        &self,
        set_code: &str,
        format: &Format,
    ) -> Result<Vec<RawDeckRow>, SourceError>;

    /// Stored balance scores of every set for one format.
    async fn format_balance(&self, format: &Format) -> Result<Vec<SetBalance>, SourceError>;
}

/// Cards of one filter context.
pub async fn load_cards(
    source: &dyn DataSource,
    set_code: &str,
    format: &Format,
    context: &str,
) -> Result<Vec<Card>, SourceError> {
    let rows = source
        .card_rows(set_code, format, &[context.to_string()])
        .await?;
    let cards = Card::from_rows(rows);
    debug!(
        "{}: {} cards for {}/{}/{}",
        source.name(),
        cards.len(),
        set_code,
        format,
        context
    );
    Ok(cards)
}

/// Archetypes of a set and format, with baseline and total games.
pub async fn load_decks(
    source: &dyn DataSource,
    set_code: &str,
    format: &Format,
) -> Result<DeckSet, SourceError> {
    let decks = DeckSet::from_rows(source.deck_rows(set_code, format).await?);
    info!(
        "{}: {} archetypes for {}/{} (baseline {:.1}%)",
        source.name(),
        decks.decks.len(),
        set_code,
        format,
        decks.baseline
    );
    Ok(decks)
}

/// Cards played in an archetype, joined with their global numbers.
///
/// Rows may be stored under any ordering of the color code; the first row
/// seen for a card wins. Four or more colors have no archetype data.
pub async fn load_archetype_cards(
    source: &dyn DataSource,
    set_code: &str,
    format: &Format,
    colors: &str,
) -> Result<Vec<ArchetypeCard>, SourceError> {
    let contexts = context_permutations(colors);
    if contexts.is_empty() {
        return Ok(Vec::new());
    }

    let mut archetype: Vec<Card> = Vec::new();
    for card in Card::from_rows(source.card_rows(set_code, format, &contexts).await?) {
        if !archetype.iter().any(|c| c.name == card.name) {
            archetype.push(card);
        }
    }
    if archetype.is_empty() {
        return Ok(Vec::new());
    }

    let global = load_cards(source, set_code, format, GLOBAL_CONTEXT).await?;
    Ok(ArchetypeCard::join_global(&archetype, &global))
}

/// All context observations of one card, and its global row if present.
pub async fn load_card_contexts(
    source: &dyn DataSource,
    set_code: &str,
    format: &Format,
    card_name: &str,
) -> Result<(Vec<ContextCard>, Option<Card>), SourceError> {
    let observations: Vec<ContextCard> = source
        .card_contexts(set_code, format, card_name)
        .await?
        .into_iter()
        .filter_map(ContextCard::from_raw)
        .collect();
    let global = observations
        .iter()
        .find(|o| o.is_global())
        .map(|o| o.card.clone());
    Ok((observations, global))
}

/// In-memory source for tests.
#[cfg(test)]
pub struct MockSource {
    pub sets: Vec<SetInfo>,
    pub cards: Vec<RawCardRow>,
    pub decks: Vec<RawDeckRow>,
    pub balance: Vec<SetBalance>,
}

#[cfg(test)]
impl MockSource {
    pub fn new(cards: Vec<RawCardRow>, decks: Vec<RawDeckRow>) -> Self {
        Self {
            sets: Vec::new(),
            cards,
            decks,
            balance: Vec::new(),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl DataSource for MockSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn sets(&self) -> Result<Vec<SetInfo>, SourceError> {
        Ok(self.sets.clone())
    }

    async fn card_rows(
        &self,
        _set_code: &str,
        _format: &Format,
        contexts: &[String],
    ) -> Result<Vec<RawCardRow>, SourceError> {
        Ok(self
            .cards
            .iter()
            .filter(|r| {
                let ctx = r.filter_context.as_deref().unwrap_or(GLOBAL_CONTEXT);
                contexts.iter().any(|c| c == ctx)
            })
            .cloned()
            .collect())
    }

    async fn card_contexts(
        &self,
        _set_code: &str,
        _format: &Format,
        card_name: &str,
    ) -> Result<Vec<RawCardRow>, SourceError> {
        Ok(self
            .cards
            .iter()
            .filter(|r| r.card_name.as_deref() == Some(card_name))
            .cloned()
            .collect())
    }

    async fn deck_rows(
        &self,
        _set_code: &str,
        _format: &Format,
    ) -> Result<Vec<RawDeckRow>, SourceError> {
        Ok(self.decks.clone())
    }

    async fn format_balance(&self, _format: &Format) -> Result<Vec<SetBalance>, SourceError> {
        Ok(self.balance.clone())
    }
}
