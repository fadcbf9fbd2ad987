//! Meta-share breakdowns.

use serde::{Deserialize, Serialize};

use crate::models::{ColorIdentity, Deck, DeckType, PAIRS};

/// Deck-type bucket of the games breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetaBucket {
    Mono,
    TwoColor,
    TwoColorSplash,
    ThreeColor,
    MoreColors,
}

impl MetaBucket {
    pub const ALL: [MetaBucket; 5] = [
        MetaBucket::Mono,
        MetaBucket::TwoColor,
        MetaBucket::TwoColorSplash,
        MetaBucket::ThreeColor,
        MetaBucket::MoreColors,
    ];

    /// Anything not mono, two- or three-color lands in `MoreColors`.
    pub fn of(deck_type: DeckType) -> Self {
        match deck_type {
            DeckType::MonoColor => MetaBucket::Mono,
            DeckType::TwoColors => MetaBucket::TwoColor,
            DeckType::TwoColorsSplash => MetaBucket::TwoColorSplash,
            DeckType::ThreeColors => MetaBucket::ThreeColor,
            DeckType::MoreThanThree | DeckType::Other => MetaBucket::MoreColors,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MetaBucket::Mono => "Mono",
            MetaBucket::TwoColor => "2 Color",
            MetaBucket::TwoColorSplash => "2+Splash",
            MetaBucket::ThreeColor => "3 Color",
            MetaBucket::MoreColors => ">3 Color",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketShare {
    pub bucket: MetaBucket,
    pub games: u64,
    /// Fraction of total games, 0..=1
    pub share: f64,
}

/// Games per deck-type bucket over `total_games` (treated as at least 1).
pub fn bucket_shares(decks: &[Deck], total_games: u64) -> Vec<BucketShare> {
    let total = total_games.max(1) as f64;
    MetaBucket::ALL
        .iter()
        .map(|bucket| {
            let games = decks
                .iter()
                .filter(|d| MetaBucket::of(d.deck_type) == *bucket)
                .map(|d| d.games)
                .sum::<u64>();
            BucketShare {
                bucket: *bucket,
                games,
                share: games as f64 / total,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairShare {
    pub code: String,
    pub name: String,
    pub games: u64,
    /// Fraction of two-color games (splash included), 0..=1
    pub share: f64,
}

fn is_two_color(deck: &Deck) -> bool {
    matches!(deck.deck_type, DeckType::TwoColors | DeckType::TwoColorsSplash)
}

/// Share of each guild pair among two-color decks, most played first.
pub fn pair_shares(decks: &[Deck]) -> Vec<PairShare> {
    let two_color_games: u64 = decks.iter().filter(|d| is_two_color(d)).map(|d| d.games).sum();

    let mut shares: Vec<PairShare> = PAIRS
        .iter()
        .map(|pair| {
            let target = ColorIdentity::from_code(pair.code, false);
            let games = decks
                .iter()
                .filter(|d| is_two_color(d) && d.colors.same_colors(&target))
                .map(|d| d.games)
                .sum::<u64>();
            let share = if two_color_games > 0 {
                games as f64 / two_color_games as f64
            } else {
                0.0
            };
            PairShare {
                code: pair.code.to_string(),
                name: pair.name.to_string(),
                games,
                share,
            }
        })
        .collect();

    shares.sort_by(|a, b| b.games.cmp(&a.games));
    shares
}
