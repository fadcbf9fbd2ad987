//! Card performance records.

use serde::{Deserialize, Serialize};

use super::{normalize_rarity, ColorIdentity, RawCardRow, Rarity};

/// Filter context for cards aggregated over every deck.
pub const GLOBAL_CONTEXT: &str = "Global";

/// A card's aggregate performance within one (set, format, context).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Card name (unique within a context)
    pub name: String,

    pub rarity: Rarity,

    pub colors: ColorIdentity,

    /// Games-in-hand win rate, percent
    pub gih_wr: Option<f64>,

    /// Average last seen at (pick-order proxy, lower = earlier)
    pub alsa: Option<f64>,

    /// Games in hand sample size
    pub games_in_hand: Option<u64>,

    /// Win rate samples, oldest first
    #[serde(default)]
    pub win_rate_history: Vec<f64>,
}

impl Card {
    /// Build a card from a raw row. Rows without a name are rejected.
    pub fn from_raw(row: RawCardRow) -> Option<Self> {
        let name = row.card_name?.trim().to_string();
        if name.is_empty() {
            return None;
        }

        Some(Self {
            name,
            rarity: normalize_rarity(row.rarity.as_deref()),
            colors: ColorIdentity::parse(row.colors.as_deref()),
            gih_wr: row.gih_wr,
            alsa: row.alsa,
            games_in_hand: row.img_count,
            win_rate_history: row.win_rate_history,
        })
    }

    /// Convert a batch of raw rows, dropping unusable ones.
    pub fn from_rows(rows: impl IntoIterator<Item = RawCardRow>) -> Vec<Self> {
        rows.into_iter().filter_map(Self::from_raw).collect()
    }

    /// Last minus first history sample; `None` with fewer than two samples.
    pub fn trend(&self) -> Option<f64> {
        history_delta(&self.win_rate_history)
    }
}

/// Delta between the last and first samples of a series.
pub fn history_delta(history: &[f64]) -> Option<f64> {
    match (history.first(), history.last()) {
        (Some(first), Some(last)) if history.len() >= 2 => Some(last - first),
        _ => None,
    }
}

/// A card observed under a named filter context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextCard {
    pub context: String,
    pub card: Card,
}

impl ContextCard {
    pub fn from_raw(row: RawCardRow) -> Option<Self> {
        let context = row
            .filter_context
            .clone()
            .unwrap_or_else(|| GLOBAL_CONTEXT.to_string());
        Card::from_raw(row).map(|card| Self { context, card })
    }

    pub fn is_global(&self) -> bool {
        self.context == GLOBAL_CONTEXT
    }
}

/// A card within one archetype, alongside its global numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeCard {
    #[serde(flatten)]
    pub card: Card,
    pub global_wr: Option<f64>,
    pub global_alsa: Option<f64>,
}

impl ArchetypeCard {
    /// Attach global stats (matched by name) to archetype-scoped cards.
    ///
    /// The result is ordered by archetype win rate, highest first.
    pub fn join_global(archetype_cards: &[Card], global: &[Card]) -> Vec<Self> {
        let mut joined: Vec<Self> = archetype_cards
            .iter()
            .map(|card| {
                let g = global.iter().find(|g| g.name == card.name);
                Self {
                    card: card.clone(),
                    global_wr: g.and_then(|g| g.gih_wr),
                    global_alsa: g.and_then(|g| g.alsa),
                }
            })
            .collect();

        joined.sort_by(|a, b| {
            b.card
                .gih_wr
                .unwrap_or(0.0)
                .total_cmp(&a.card.gih_wr.unwrap_or(0.0))
        });
        joined
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::card;
    use super::*;

    #[test]
    fn test_card_from_raw() {
        let row = RawCardRow {
            card_name: Some("  Shock ".to_string()),
            rarity: Some("uncommon".to_string()),
            colors: Some("R".to_string()),
            gih_wr: Some(56.0),
            alsa: None,
            img_count: Some(40),
            win_rate_history: vec![55.0, 56.0],
            filter_context: None,
        };

        let card = Card::from_raw(row).unwrap();
        assert_eq!(card.name, "Shock");
        assert_eq!(card.rarity, Rarity::Uncommon);
        assert_eq!(card.colors.symbols(), "R");
        assert_eq!(card.games_in_hand, Some(40));
        assert_eq!(card.trend(), Some(1.0));
    }

    #[test]
    fn test_card_from_raw_rejects_nameless_rows() {
        assert!(Card::from_raw(RawCardRow::default()).is_none());
        let blank = RawCardRow {
            card_name: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(Card::from_raw(blank).is_none());
    }

    #[test]
    fn test_history_delta() {
        assert_eq!(history_delta(&[]), None);
        assert_eq!(history_delta(&[55.0]), None);
        assert_eq!(history_delta(&[55.0, 53.0, 57.5]), Some(2.5));
    }

    #[test]
    fn test_context_card_defaults_to_global() {
        let row = RawCardRow {
            card_name: Some("Opt".to_string()),
            ..Default::default()
        };
        let cc = ContextCard::from_raw(row).unwrap();
        assert!(cc.is_global());
    }

    #[test]
    fn test_join_global() {
        let arch = vec![
            card("A", Rarity::Common, "W", Some(55.0), Some(5.0)),
            card("B", Rarity::Common, "U", Some(60.0), Some(3.0)),
        ];
        let global = vec![card("A", Rarity::Common, "W", Some(53.0), Some(4.5))];

        let joined = ArchetypeCard::join_global(&arch, &global);
        assert_eq!(joined[0].card.name, "B");
        assert_eq!(joined[0].global_wr, None);
        assert_eq!(joined[1].global_wr, Some(53.0));
        assert_eq!(joined[1].global_alsa, Some(4.5));
    }
}
