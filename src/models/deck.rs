//! Deck archetype records.

use serde::{Deserialize, Serialize};

use super::{ColorIdentity, RawDeckRow};

/// Name of the aggregate row carrying the format-wide win rate.
pub const ALL_DECKS: &str = "All Decks";

/// Aggregate rows that are not archetypes.
pub const AGGREGATE_ROWS: [&str; 7] = [
    ALL_DECKS,
    "Two-color",
    "Two-color + Splash",
    "Three-color",
    "Three-color + Splash",
    "Mono-color",
    "Mono-color + Splash",
];

/// Win rate used when the data has no "All Decks" row.
pub const DEFAULT_BASELINE: f64 = 55.0;

/// Classification of a deck by color count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeckType {
    #[serde(rename = "Mono-color")]
    MonoColor,
    #[serde(rename = "Two colors")]
    TwoColors,
    #[serde(rename = "Two colors + splash")]
    TwoColorsSplash,
    #[serde(rename = "Three colors")]
    ThreeColors,
    #[serde(rename = "More than 3 colors")]
    MoreThanThree,
    Other,
}

impl DeckType {
    pub const ALL: [DeckType; 6] = [
        DeckType::MonoColor,
        DeckType::TwoColors,
        DeckType::TwoColorsSplash,
        DeckType::ThreeColors,
        DeckType::MoreThanThree,
        DeckType::Other,
    ];

    /// Classify from base color count and splash flag.
    pub fn from_colors(colors: &ColorIdentity) -> Self {
        match (colors.len(), colors.is_splash()) {
            (1, _) => DeckType::MonoColor,
            (2, false) => DeckType::TwoColors,
            (2, true) => DeckType::TwoColorsSplash,
            (3, false) => DeckType::ThreeColors,
            (n, _) if n >= 3 => DeckType::MoreThanThree,
            _ => DeckType::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DeckType::MonoColor => "Mono-color",
            DeckType::TwoColors => "Two colors",
            DeckType::TwoColorsSplash => "Two colors + splash",
            DeckType::ThreeColors => "Three colors",
            DeckType::MoreThanThree => "More than 3 colors",
            DeckType::Other => "Other",
        }
    }

    /// Parse a label, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(s))
    }
}

impl std::fmt::Display for DeckType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// An archetype's aggregate results within one (set, format).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub name: String,

    pub colors: ColorIdentity,

    /// Win rate, percent
    pub win_rate: f64,

    /// Games observed
    pub games: u64,

    pub deck_type: DeckType,

    /// Win rate samples, oldest first; always at least two entries
    pub history: Vec<f64>,
}

impl Deck {
    pub fn from_raw(row: RawDeckRow) -> Option<Self> {
        let name = row.archetype_name?.trim().to_string();
        if name.is_empty() {
            return None;
        }

        let colors = ColorIdentity::parse(row.colors.as_deref());
        let win_rate = row.win_rate.unwrap_or(0.0);
        let history = if row.win_rate_history.len() > 1 {
            row.win_rate_history
        } else {
            vec![win_rate, win_rate]
        };

        Some(Self {
            name,
            deck_type: DeckType::from_colors(&colors),
            colors,
            win_rate,
            games: row.games_count.unwrap_or(0),
            history,
        })
    }

    /// Synthesized record for a catalogue archetype with no games.
    pub fn placeholder(name: &str, colors: ColorIdentity) -> Self {
        Self {
            name: name.to_string(),
            deck_type: DeckType::from_colors(&colors),
            colors,
            win_rate: 0.0,
            games: 0,
            history: vec![0.0, 0.0, 0.0],
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.games == 0 && self.win_rate == 0.0
    }

    /// Share of all observed games, 0..=1.
    pub fn meta_share(&self, total_games: u64) -> f64 {
        if total_games == 0 {
            0.0
        } else {
            self.games as f64 / total_games as f64
        }
    }
}

/// Archetypes of one (set, format) plus the format baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckSet {
    pub decks: Vec<Deck>,

    /// Sum of games across archetypes; at least 1
    pub total_games: u64,

    /// "All Decks" win rate
    pub baseline: f64,
}

impl DeckSet {
    /// Split aggregate rows from archetypes and derive totals.
    pub fn from_rows(rows: impl IntoIterator<Item = RawDeckRow>) -> Self {
        let mut baseline = None;
        let mut decks = Vec::new();

        for row in rows {
            let name = row.archetype_name.as_deref().map(str::trim).unwrap_or("");
            if name == ALL_DECKS {
                baseline = row.win_rate.filter(|wr| *wr > 0.0);
                continue;
            }
            if AGGREGATE_ROWS.contains(&name) {
                continue;
            }
            if let Some(deck) = Deck::from_raw(row) {
                decks.push(deck);
            }
        }

        // PostgREST query orders by win rate; keep that contract for snapshots
        decks.sort_by(|a, b| b.win_rate.total_cmp(&a.win_rate));

        Self::new(decks, baseline.unwrap_or(DEFAULT_BASELINE))
    }

    pub fn new(decks: Vec<Deck>, baseline: f64) -> Self {
        let total_games = decks.iter().map(|d| d.games).sum::<u64>().max(1);
        Self {
            decks,
            total_games,
            baseline,
        }
    }

    /// Find an archetype by its colors (order-insensitive).
    pub fn find_by_colors(&self, code: &str) -> Option<&Deck> {
        let target = ColorIdentity::parse(Some(code));
        self.decks
            .iter()
            .find(|d| !d.colors.is_splash() && d.colors.same_colors(&target))
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Deck> {
        self.decks.iter().find(|d| d.name.eq_ignore_ascii_case(name))
    }
}

impl Default for DeckSet {
    fn default() -> Self {
        Self::new(Vec::new(), DEFAULT_BASELINE)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn deck(name: &str, colors: &str, win_rate: f64, games: u64) -> Deck {
        let colors = ColorIdentity::parse(Some(colors));
        Deck {
            name: name.to_string(),
            deck_type: DeckType::from_colors(&colors),
            colors,
            win_rate,
            games,
            history: vec![win_rate, win_rate],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, colors: &str, wr: f64, games: u64) -> RawDeckRow {
        RawDeckRow {
            archetype_name: Some(name.to_string()),
            colors: Some(colors.to_string()),
            win_rate: Some(wr),
            games_count: Some(games),
            win_rate_history: Vec::new(),
        }
    }

    #[test]
    fn test_deck_type_from_colors() {
        let t = |s: &str| DeckType::from_colors(&ColorIdentity::parse(Some(s)));
        assert_eq!(t("W"), DeckType::MonoColor);
        assert_eq!(t("W + Splash"), DeckType::MonoColor);
        assert_eq!(t("WU"), DeckType::TwoColors);
        assert_eq!(t("WU + Splash"), DeckType::TwoColorsSplash);
        assert_eq!(t("WUB"), DeckType::ThreeColors);
        assert_eq!(t("WUB + Splash"), DeckType::MoreThanThree);
        assert_eq!(t("WUBR"), DeckType::MoreThanThree);
        assert_eq!(t(""), DeckType::Other);
    }

    #[test]
    fn test_deck_type_parse() {
        assert_eq!(DeckType::parse("two colors"), Some(DeckType::TwoColors));
        assert_eq!(DeckType::parse("Two colors + splash"), Some(DeckType::TwoColorsSplash));
        assert_eq!(DeckType::parse("five colors"), None);
    }

    #[test]
    fn test_deck_history_padding() {
        let deck = Deck::from_raw(row("WU", "WU", 57.0, 10)).unwrap();
        assert_eq!(deck.history, vec![57.0, 57.0]);
    }

    #[test]
    fn test_deck_set_excludes_aggregates_and_reads_baseline() {
        let set = DeckSet::from_rows(vec![
            row("All Decks", "", 54.2, 5000),
            row("Two-color", "", 55.0, 4000),
            row("Mono-color + Splash", "", 50.0, 10),
            row("Azorius (WU)", "WU", 58.0, 900),
            row("Dimir (UB)", "UB", 54.0, 100),
        ]);

        assert_eq!(set.decks.len(), 2);
        assert_eq!(set.baseline, 54.2);
        assert_eq!(set.total_games, 1000);
        assert_eq!(set.decks[0].name, "Azorius (WU)");
    }

    #[test]
    fn test_deck_set_defaults() {
        let set = DeckSet::from_rows(Vec::new());
        assert_eq!(set.baseline, DEFAULT_BASELINE);
        assert_eq!(set.total_games, 1);
    }

    #[test]
    fn test_placeholder() {
        let p = Deck::placeholder("Dimir (UB)", ColorIdentity::parse(Some("UB")));
        assert!(p.is_placeholder());
        assert_eq!(p.deck_type, DeckType::TwoColors);
        assert_eq!(p.history, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_find_by_colors() {
        let set = DeckSet::from_rows(vec![
            row("WU", "WU + Splash", 50.0, 10),
            row("Azorius", "UW", 58.0, 900),
        ]);
        assert_eq!(set.find_by_colors("WU").map(|d| d.name.as_str()), Some("Azorius"));
    }
}
