//! Balance score mapping.
//!
//! Two fixed linear maps turn a win-rate spread into a 0-10 score:
//!
//! - archetype: `10 * (3.25 - sd) / 2.25`, over archetypes with >= 1% meta share
//! - color: `10 * (1.75 - sd) / 1.5`, over per-color means of mono-colored cards
//!
//! Both use the unweighted population spread. With fewer than two samples
//! the spread is 0 and the score saturates at 10.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{mean, population_std_dev, round1, weighted_std_dev};
use crate::models::{BalanceComponent, BalanceLabel, BalanceScore, Card, Color, Deck, DeckSet};

/// Minimum meta share for an archetype to count toward balance.
pub const META_SHARE_THRESHOLD: f64 = 0.01;

/// Map archetype win-rate spread to a 0-10 score.
pub fn archetype_std_dev_to_score(std_dev: f64) -> f64 {
    round1((10.0 * (3.25 - std_dev) / 2.25).clamp(0.0, 10.0))
}

/// Map per-color mean win-rate spread to a 0-10 score.
pub fn color_std_dev_to_score(std_dev: f64) -> f64 {
    round1((10.0 * (1.75 - std_dev) / 1.5).clamp(0.0, 10.0))
}

/// Archetypes holding at least the threshold share of `total_games`.
pub fn qualifying_decks(decks: &[Deck], total_games: u64) -> Vec<&Deck> {
    decks
        .iter()
        .filter(|d| d.meta_share(total_games) >= META_SHARE_THRESHOLD)
        .collect()
}

/// Archetype balance plus the games-weighted spread.
pub fn archetype_balance(decks: &[Deck], total_games: u64) -> (BalanceComponent, f64) {
    let qualifying = qualifying_decks(decks, total_games);
    let rates: Vec<f64> = qualifying.iter().map(|d| d.win_rate).collect();
    let std_dev = population_std_dev(&rates, mean(&rates, 0.0));
    let weighted: Vec<(f64, f64)> = qualifying
        .iter()
        .map(|d| (d.win_rate, d.games as f64))
        .collect();

    let score = archetype_std_dev_to_score(std_dev);
    let component = BalanceComponent {
        std_dev,
        score,
        label: BalanceLabel::from_score(score),
        samples: rates.len(),
    };
    (component, weighted_std_dev(&weighted))
}

/// Mean win rate of mono-colored cards per color; colors without cards are skipped.
pub fn color_means(cards: &[Card]) -> Vec<(Color, f64)> {
    Color::ALL
        .iter()
        .filter_map(|color| {
            let rates: Vec<f64> = cards
                .iter()
                .filter(|c| c.colors.mono() == Some(*color))
                .filter_map(|c| c.gih_wr)
                .collect();
            (!rates.is_empty()).then(|| (*color, mean(&rates, 0.0)))
        })
        .collect()
}

pub fn color_balance(cards: &[Card]) -> BalanceComponent {
    let means: Vec<f64> = color_means(cards).into_iter().map(|(_, m)| m).collect();
    let std_dev = population_std_dev(&means, mean(&means, 0.0));
    let score = color_std_dev_to_score(std_dev);
    BalanceComponent {
        std_dev,
        score,
        label: BalanceLabel::from_score(score),
        samples: means.len(),
    }
}

/// Both balance scores for one (set, format).
pub fn balance_score(decks: &DeckSet, cards: &[Card]) -> BalanceScore {
    let (archetype, as_played_std_dev) = archetype_balance(&decks.decks, decks.total_games);
    let color = color_balance(cards);
    debug!(
        archetype_score = archetype.score,
        color_score = color.score,
        "Computed balance scores"
    );
    BalanceScore {
        archetype,
        color,
        as_played_std_dev,
    }
}

/// Balance scores of one set, as stored per (set, format).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetBalance {
    pub set_code: String,
    pub archetype_score: f64,
    #[serde(alias = "archetype_stddev")]
    pub archetype_std_dev: f64,
    pub color_score: f64,
    #[serde(alias = "color_stddev")]
    pub color_std_dev: f64,
}

impl SetBalance {
    pub fn from_score(set_code: &str, score: &BalanceScore) -> Self {
        Self {
            set_code: set_code.to_string(),
            archetype_score: score.archetype.score,
            archetype_std_dev: score.archetype.std_dev,
            color_score: score.color.score,
            color_std_dev: score.color.std_dev,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetExtreme {
    pub set_code: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceStats {
    pub average: f64,
    pub best: SetExtreme,
    pub worst: SetExtreme,
}

/// Average, best and worst set for each balance dimension of a format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatBalanceSummary {
    pub archetype: BalanceStats,
    pub color: BalanceStats,
}

fn balance_stats(rows: &[SetBalance], score: impl Fn(&SetBalance) -> f64) -> Option<BalanceStats> {
    let first = rows.first()?;
    let mut best = first;
    let mut worst = first;
    for row in rows {
        // First set wins ties
        if score(row) > score(best) {
            best = row;
        }
        if score(row) < score(worst) {
            worst = row;
        }
    }

    let scores: Vec<f64> = rows.iter().map(&score).collect();
    Some(BalanceStats {
        average: mean(&scores, 0.0),
        best: SetExtreme {
            set_code: best.set_code.clone(),
            score: score(best),
        },
        worst: SetExtreme {
            set_code: worst.set_code.clone(),
            score: score(worst),
        },
    })
}

/// Summarize balance across sets; `None` without any set.
pub fn summarize_sets(rows: &[SetBalance]) -> Option<FormatBalanceSummary> {
    Some(FormatBalanceSummary {
        archetype: balance_stats(rows, |r| r.archetype_score)?,
        color: balance_stats(rows, |r| r.color_score)?,
    })
}
