//! Format blueprint: win-rate partitions by rarity and by color.

use serde::{Deserialize, Serialize};

use super::{mean, population_std_dev};
use crate::models::{Card, ColorGroup, DerivedStatRow, PartitionKey, RankedCard, Rarity, StatsMode};

/// Size of the best/worst member lists.
pub const EXTREMES: usize = 10;

/// Build one partition row.
///
/// `members` are `(card, gih_wr)` pairs; the mode picks which of them feed
/// the mean and spread.
fn build_row(
    key: PartitionKey,
    label: &str,
    mut members: Vec<(&Card, f64)>,
    baseline: f64,
    mode: StatsMode,
) -> DerivedStatRow {
    members.sort_by(|(ca, a), (cb, b)| b.total_cmp(a).then_with(|| ca.name.cmp(&cb.name)));

    let best: Vec<RankedCard> = members
        .iter()
        .take(EXTREMES)
        .map(|(c, wr)| RankedCard::new(c, *wr, baseline))
        .collect();
    let worst: Vec<RankedCard> = members
        .iter()
        .rev()
        .take(EXTREMES)
        .map(|(c, wr)| RankedCard::new(c, *wr, baseline))
        .collect();

    let selected: Vec<f64> = match mode {
        StatsMode::All => members.iter().map(|(_, wr)| *wr).collect(),
        StatsMode::Top10 => members.iter().take(EXTREMES).map(|(_, wr)| *wr).collect(),
        StatsMode::Bottom10 => {
            let skip = members.len().saturating_sub(EXTREMES);
            members.iter().skip(skip).map(|(_, wr)| *wr).collect()
        }
    };

    let mean_wr = mean(&selected, baseline);
    DerivedStatRow {
        key,
        label: label.to_string(),
        count: members.len(),
        mean_wr,
        delta: mean_wr - baseline,
        std_dev: population_std_dev(&selected, mean_wr),
        best,
        worst,
    }
}

fn valid<'a>(cards: &'a [Card]) -> impl Iterator<Item = (&'a Card, f64)> + 'a {
    cards.iter().filter_map(|c| c.gih_wr.map(|wr| (c, wr)))
}

/// Rows for Mythic, Rare, Uncommon, Common, in that order.
pub fn by_rarity(cards: &[Card], baseline: f64, mode: StatsMode) -> Vec<DerivedStatRow> {
    Rarity::ALL
        .iter()
        .map(|rarity| {
            let members = valid(cards).filter(|(c, _)| c.rarity == *rarity).collect();
            build_row(PartitionKey::Rarity(*rarity), &rarity.to_string(), members, baseline, mode)
        })
        .collect()
}

/// Rows for the five colors, multicolor and colorless, best delta first.
pub fn by_color(cards: &[Card], baseline: f64, mode: StatsMode) -> Vec<DerivedStatRow> {
    let mut rows: Vec<DerivedStatRow> = ColorGroup::ALL
        .iter()
        .map(|group| {
            let members = valid(cards)
                .filter(|(c, _)| ColorGroup::of(&c.colors) == *group)
                .collect();
            build_row(PartitionKey::Color(*group), group.label(), members, baseline, mode)
        })
        .collect();
    rows.sort_by(|a, b| b.delta.total_cmp(&a.delta));
    rows
}

/// Spread of every valid card win rate around the baseline.
pub fn overall_spread(cards: &[Card], baseline: f64) -> f64 {
    let rates: Vec<f64> = valid(cards).map(|(_, wr)| wr).collect();
    population_std_dev(&rates, baseline)
}

/// Both partitions plus the overall spread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub mode: StatsMode,
    pub baseline: f64,
    pub total_cards: usize,
    pub overall_spread: f64,
    pub rarity: Vec<DerivedStatRow>,
    pub color: Vec<DerivedStatRow>,
}

pub fn blueprint(cards: &[Card], baseline: f64, mode: StatsMode) -> Blueprint {
    Blueprint {
        mode,
        baseline,
        total_cards: valid(cards).count(),
        overall_spread: overall_spread(cards, baseline),
        rarity: by_rarity(cards, baseline, mode),
        color: by_color(cards, baseline, mode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::card;
    use crate::models::Color;

    fn commons(rates: &[f64]) -> Vec<Card> {
        rates
            .iter()
            .enumerate()
            .map(|(i, wr)| card(&format!("C{i:02}"), Rarity::Common, "G", Some(*wr), None))
            .collect()
    }

    #[test]
    fn test_by_rarity_order_and_empty_groups() {
        let cards = commons(&[50.0, 60.0]);
        let rows = by_rarity(&cards, 55.0, StatsMode::All);

        let keys: Vec<_> = rows.iter().map(|r| r.key.clone()).collect();
        assert_eq!(
            keys,
            Rarity::ALL.iter().map(|r| PartitionKey::Rarity(*r)).collect::<Vec<_>>()
        );

        // No mythics: mean reads as the baseline, not 0
        assert_eq!(rows[0].count, 0);
        assert_eq!(rows[0].mean_wr, 55.0);
        assert_eq!(rows[0].delta, 0.0);
        assert_eq!(rows[0].std_dev, 0.0);

        let common = &rows[3];
        assert_eq!(common.count, 2);
        assert_eq!(common.mean_wr, 55.0);
        assert_eq!(common.std_dev, 5.0);
        assert_eq!(common.best[0].name, "C01");
        assert_eq!(common.worst[0].name, "C00");
        assert_eq!(common.worst[0].delta, -5.0);
    }

    #[test]
    fn test_stats_modes() {
        let rates: Vec<f64> = (0..20).map(|i| 45.0 + i as f64).collect();
        let cards = commons(&rates);

        let all = &by_rarity(&cards, 55.0, StatsMode::All)[3];
        assert_eq!(all.mean_wr, 54.5);

        let top = &by_rarity(&cards, 55.0, StatsMode::Top10)[3];
        assert_eq!(top.mean_wr, 59.5);
        assert_eq!(top.best.len(), 10);

        let bottom = &by_rarity(&cards, 55.0, StatsMode::Bottom10)[3];
        assert_eq!(bottom.mean_wr, 49.5);
        assert_eq!(bottom.worst[0].gih_wr, 45.0);
    }

    #[test]
    fn test_by_color_sorted_by_delta() {
        let cards = vec![
            card("W1", Rarity::Common, "W", Some(53.0), None),
            card("U1", Rarity::Common, "U", Some(58.0), None),
            card("WU", Rarity::Uncommon, "WU", Some(60.0), None),
            card("Art", Rarity::Common, "", Some(50.0), None),
            card("Void", Rarity::Common, "B", None, None),
        ];
        let rows = by_color(&cards, 55.0, StatsMode::All);

        assert_eq!(rows.len(), 7);
        assert_eq!(rows[0].key, PartitionKey::Color(ColorGroup::Multi));
        assert_eq!(rows[1].key, PartitionKey::Color(ColorGroup::Mono(Color::U)));
        assert_eq!(rows.last().unwrap().key, PartitionKey::Color(ColorGroup::Colorless));
    }

    #[test]
    fn test_overall_spread_around_baseline() {
        let cards = commons(&[53.0, 57.0]);
        assert_eq!(overall_spread(&cards, 55.0), 2.0);
        assert_eq!(overall_spread(&commons(&[60.0]), 55.0), 0.0);
    }

    #[test]
    fn test_blueprint_counts_valid_cards() {
        let mut cards = commons(&[50.0, 60.0]);
        cards.push(card("NoData", Rarity::Rare, "W", None, None));
        let bp = blueprint(&cards, 55.0, StatsMode::All);
        assert_eq!(bp.total_cards, 2);
        assert_eq!(bp.rarity.len(), 4);
        assert_eq!(bp.color.len(), 7);
    }
}
