//! Ranking and delta engine.

use serde::{Deserialize, Serialize};

use crate::models::{Card, DeltaBand, Deck, Grade};

/// Anything that can be located in a ranked group by a unique name.
pub trait Rankable {
    fn rank_key(&self) -> &str;
}

impl Rankable for Card {
    fn rank_key(&self) -> &str {
        &self.name
    }
}

impl Rankable for Deck {
    fn rank_key(&self) -> &str {
        &self.name
    }
}

impl<T: Rankable + ?Sized> Rankable for &T {
    fn rank_key(&self) -> &str {
        (**self).rank_key()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    Ascending,
    Descending,
}

/// 1-based position within a group of `total` ranked entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rank {
    pub position: usize,
    pub total: usize,
}

impl Rank {
    /// Width of a rank bar, 5..=100.
    pub fn bar_percent(&self) -> f64 {
        if self.total == 0 {
            return 5.0;
        }
        let pct = (self.total as f64 - self.position as f64) / self.total as f64 * 100.0;
        pct.clamp(5.0, 100.0)
    }

    /// Within the top 15% of the group.
    pub fn is_top(&self) -> bool {
        self.position as f64 <= (self.total as f64 * 0.15).ceil()
    }

    /// Within the bottom 15% of the group.
    pub fn is_bottom(&self) -> bool {
        self.position as f64 >= (self.total as f64 * 0.85).floor()
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} / {}", self.position, self.total)
    }
}

/// Rank `target` within `group` by `metric`.
///
/// Entries whose metric is `None` are excluded before ranking. Ties are
/// broken by name, so the result does not depend on input order. Returns
/// `None` when the target is absent or has no metric.
pub fn rank<T, F>(group: &[T], target: &str, metric: F, order: Order) -> Option<Rank>
where
    T: Rankable,
    F: Fn(&T) -> Option<f64>,
{
    let mut valid: Vec<(&str, f64)> = group
        .iter()
        .filter_map(|item| metric(item).map(|v| (item.rank_key(), v)))
        .collect();

    valid.sort_by(|(name_a, a), (name_b, b)| {
        let by_metric = match order {
            Order::Ascending => a.total_cmp(b),
            Order::Descending => b.total_cmp(a),
        };
        by_metric.then_with(|| name_a.cmp(name_b))
    });

    valid
        .iter()
        .position(|(name, _)| *name == target)
        .map(|idx| Rank {
            position: idx + 1,
            total: valid.len(),
        })
}

/// Signed difference to a baseline, or `None` when either side is missing.
pub fn delta(value: Option<f64>, baseline: Option<f64>) -> Option<f64> {
    match (value, baseline) {
        (Some(v), Some(b)) if v.is_finite() && b.is_finite() => Some(v - b),
        _ => None,
    }
}

/// Render an optional delta with sign, or a dash.
pub fn format_delta(delta: Option<f64>) -> String {
    match delta {
        Some(d) => format!("{d:+.1}"),
        None => "—".to_string(),
    }
}

/// Delta band of a win rate, `None` for missing or zero inputs.
pub fn delta_band(win_rate: Option<f64>, baseline: Option<f64>) -> Option<DeltaBand> {
    let wr = win_rate.filter(|v| *v != 0.0);
    let base = baseline.filter(|v| *v != 0.0);
    delta(wr, base).map(DeltaBand::from_delta)
}

/// Grade of a card's in-archetype win rate against the deck's win rate.
pub fn grade(card_wr: Option<f64>, deck_wr: Option<f64>) -> Option<Grade> {
    let card = card_wr.filter(|v| *v != 0.0);
    let deck = deck_wr.filter(|v| *v != 0.0);
    delta(card, deck).map(Grade::from_delta)
}

/// Cards sharing the target's rarity.
pub fn rarity_peers<'a>(cards: &'a [Card], target: &Card) -> Vec<&'a Card> {
    cards.iter().filter(|c| c.rarity == target.rarity).collect()
}

/// Cards sharing the target's rarity and canonical colors.
pub fn color_peers<'a>(cards: &'a [Card], target: &Card) -> Vec<&'a Card> {
    cards
        .iter()
        .filter(|c| c.rarity == target.rarity)
        .filter(|c| same_canonical_colors(c, target))
        .collect()
}

// Colorless cards are peers of each other.
fn same_canonical_colors(a: &Card, b: &Card) -> bool {
    if a.colors.is_colorless() && b.colors.is_colorless() {
        return true;
    }
    a.colors.same_colors(&b.colors)
}

/// Win-rate and pick-order ranks of one card in both peer groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRanking {
    pub name: String,
    pub wr_in_rarity: Option<Rank>,
    pub wr_in_color: Option<Rank>,
    pub alsa_in_rarity: Option<Rank>,
    pub alsa_in_color: Option<Rank>,
}

impl CardRanking {
    /// Rank a card among `cards`. Earlier picks (lower ALSA) rank higher.
    pub fn compute(cards: &[Card], target: &Card) -> Self {
        let by_rarity = rarity_peers(cards, target);
        let by_color = color_peers(cards, target);
        let wr = |c: &&Card| c.gih_wr;
        let alsa = |c: &&Card| c.alsa;

        let has_alsa = target.alsa.is_some();
        Self {
            name: target.name.clone(),
            wr_in_rarity: rank(&by_rarity, &target.name, wr, Order::Descending),
            wr_in_color: rank(&by_color, &target.name, wr, Order::Descending),
            alsa_in_rarity: has_alsa
                .then(|| rank(&by_rarity, &target.name, alsa, Order::Ascending))
                .flatten(),
            alsa_in_color: has_alsa
                .then(|| rank(&by_color, &target.name, alsa, Order::Ascending))
                .flatten(),
        }
    }
}
