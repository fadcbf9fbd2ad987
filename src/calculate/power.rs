//! Power-profile (pentagon) engine.
//!
//! Five axes, each a 0-10 score mapped from a ratio of top-N averages:
//!
//! | Axis | Ratio | Score |
//! |---|---|---|
//! | Bomb dominance | top 15 R+M / baseline | `(r - 1) * 50` |
//! | Common weakness | top 10 C / baseline | `(1.15 - r) * 60` |
//! | Uncommon weakness | top 10 U / baseline | `(1.15 - r) * 60` |
//! | Rarity gap | top 20 R+M / mean(top 10 C, top 10 U) | `(r - 1) * 60` |
//! | Chaff ratio | share of C+U below baseline - 2 | `r * 20` |
//!
//! The profile area is `0.475 * sum of adjacent products`, cyclic.

use serde::{Deserialize, Serialize};

use super::{round1, top_n_mean};
use crate::models::{
    AxisScore, Card, FormatClass, PowerAxis, PowerProfile, PowerStats, RadarPoint, Rarity,
};

/// Pentagon area factor.
pub const AREA_FACTOR: f64 = 0.475;

/// Area of an all-10 profile.
pub const MAX_AREA: f64 = AREA_FACTOR * 5.0 * 100.0;

/// Distance from a class boundary inside which a balanced format leans.
const LEANING_MARGIN: f64 = 10.0;

fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, 10.0)
}

// Neutral ratio when the denominator is unusable
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        1.0
    }
}

fn signed_pct(value: f64) -> String {
    format!("{value:+.1}%")
}

/// Pentagon area of five scores in cyclic order.
pub fn pentagon_area(scores: &[f64; 5]) -> f64 {
    let sum: f64 = (0..5).map(|i| scores[i] * scores[(i + 1) % 5]).sum();
    AREA_FACTOR * sum
}

/// Balanced formats near a boundary lean toward the neighbouring class.
pub fn leaning(area: f64) -> Option<FormatClass> {
    match FormatClass::from_area(area) {
        FormatClass::Balanced if area >= 120.0 - LEANING_MARGIN => Some(FormatClass::Prince),
        FormatClass::Balanced if area < 60.0 + LEANING_MARGIN => Some(FormatClass::Pauper),
        _ => None,
    }
}

fn rates_where(cards: &[Card], keep: impl Fn(Rarity) -> bool) -> Vec<f64> {
    cards
        .iter()
        .filter(|c| keep(c.rarity))
        .filter_map(|c| c.gih_wr)
        .collect()
}

/// Compute the five-axis profile of a card pool against the format baseline.
pub fn power_profile(cards: &[Card], baseline: f64) -> PowerProfile {
    let premium = rates_where(cards, |r| r.is_premium());
    let commons = rates_where(cards, |r| r == Rarity::Common);
    let uncommons = rates_where(cards, |r| r == Rarity::Uncommon);

    let top15_premium_avg = top_n_mean(&premium, 15, baseline);
    let top10_common_avg = top_n_mean(&commons, 10, baseline);
    let top10_uncommon_avg = top_n_mean(&uncommons, 10, baseline);
    let top20_premium_avg = top_n_mean(&premium, 20, baseline);

    let r1 = ratio(top15_premium_avg, baseline);
    let r2 = ratio(top10_common_avg, baseline);
    let r3 = ratio(top10_uncommon_avg, baseline);
    let r4 = ratio(top20_premium_avg, (top10_common_avg + top10_uncommon_avg) / 2.0);

    let chaff_threshold = baseline - 2.0;
    let chaff_pool = commons.len() + uncommons.len();
    let chaff_count = commons
        .iter()
        .chain(&uncommons)
        .filter(|wr| **wr < chaff_threshold)
        .count();
    let r5 = if chaff_pool > 0 {
        chaff_count as f64 / chaff_pool as f64
    } else {
        0.0
    };

    let axes = vec![
        AxisScore {
            axis: PowerAxis::BombDominance,
            score: clamp_score((r1 - 1.0) * 50.0),
            ratio: r1,
            description: format!(
                "Top 15 R/M are {} above format average",
                signed_pct((r1 - 1.0) * 100.0)
            ),
        },
        AxisScore {
            axis: PowerAxis::CommonWeakness,
            score: clamp_score((1.15 - r2) * 60.0),
            ratio: r2,
            description: format!(
                "Top 10 commons are {} above format average",
                signed_pct((r2 - 1.0) * 100.0)
            ),
        },
        AxisScore {
            axis: PowerAxis::UncommonWeakness,
            score: clamp_score((1.15 - r3) * 60.0),
            ratio: r3,
            description: format!(
                "Top 10 uncommons are {} above format average",
                signed_pct((r3 - 1.0) * 100.0)
            ),
        },
        AxisScore {
            axis: PowerAxis::RarityGap,
            score: clamp_score((r4 - 1.0) * 60.0),
            ratio: r4,
            description: format!(
                "Top 20 R/M are {} above top 10 C + top 10 U average",
                signed_pct((r4 - 1.0) * 100.0)
            ),
        },
        AxisScore {
            axis: PowerAxis::ChaffRatio,
            score: clamp_score(r5 * 20.0),
            ratio: r5,
            description: format!(
                "{:.0}% of C/U are 2 points below format average ({:.1}%)",
                r5 * 100.0,
                chaff_threshold
            ),
        },
    ];

    let mut scores = [0.0; 5];
    for (slot, axis) in scores.iter_mut().zip(&axes) {
        *slot = axis.score;
    }
    let area = pentagon_area(&scores);

    PowerProfile {
        axes,
        area,
        area_percent: area / MAX_AREA * 100.0,
        class: FormatClass::from_area(area),
        leaning: leaning(area),
        radar: radar_points(&scores).to_vec(),
        stats: PowerStats {
            baseline,
            top15_premium_avg,
            top10_common_avg,
            top10_uncommon_avg,
            top20_premium_avg,
            chaff_count,
            chaff_pool,
        },
    }
}

const RADAR_CENTER: f64 = 100.0;
const RADAR_RADIUS: f64 = 80.0;

/// Radar vertices on a 200x200 canvas, first axis pointing up.
pub fn radar_points(scores: &[f64; 5]) -> [RadarPoint; 5] {
    let mut points = [RadarPoint { x: 0.0, y: 0.0 }; 5];
    for (i, (point, score)) in points.iter_mut().zip(scores).enumerate() {
        let angle = std::f64::consts::TAU * i as f64 / 5.0 - std::f64::consts::FRAC_PI_2;
        let radius = score / 10.0 * RADAR_RADIUS;
        *point = RadarPoint {
            x: RADAR_CENTER + radius * angle.cos(),
            y: RADAR_CENTER + radius * angle.sin(),
        };
    }
    points
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisDiff {
    pub axis: PowerAxis,
    pub current: f64,
    pub other: f64,
    /// `current - other`, one decimal
    pub diff: f64,
}

/// Side-by-side comparison of two profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileComparison {
    pub axes: Vec<AxisDiff>,
    pub current_area: f64,
    pub other_area: f64,
    pub area_diff: f64,
    pub current_class: FormatClass,
    pub other_class: FormatClass,
}

pub fn compare_profiles(current: &PowerProfile, other: &PowerProfile) -> ProfileComparison {
    let axes = current
        .axes
        .iter()
        .zip(&other.axes)
        .map(|(a, b)| AxisDiff {
            axis: a.axis,
            current: a.score,
            other: b.score,
            diff: round1(a.score - b.score),
        })
        .collect();

    ProfileComparison {
        axes,
        current_area: current.area,
        other_area: other.area,
        area_diff: round1(current.area - other.area),
        current_class: current.class,
        other_class: other.class,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::card;

    fn pool(premium: &[f64], commons: &[f64], uncommons: &[f64]) -> Vec<Card> {
        let mut cards = Vec::new();
        for (i, wr) in premium.iter().enumerate() {
            cards.push(card(&format!("R{i}"), Rarity::Rare, "W", Some(*wr), None));
        }
        for (i, wr) in commons.iter().enumerate() {
            cards.push(card(&format!("C{i}"), Rarity::Common, "U", Some(*wr), None));
        }
        for (i, wr) in uncommons.iter().enumerate() {
            cards.push(card(&format!("U{i}"), Rarity::Uncommon, "B", Some(*wr), None));
        }
        cards
    }

    #[test]
    fn test_pentagon_area_extremes() {
        assert!((pentagon_area(&[10.0; 5]) - 237.5).abs() < 1e-9);
        assert!((MAX_AREA - 237.5).abs() < 1e-9);
        assert_eq!(pentagon_area(&[0.0; 5]), 0.0);
    }

    #[test]
    fn test_pentagon_area_rewards_balance() {
        // Same total, different shapes
        let spiky = pentagon_area(&[10.0, 0.0, 0.0, 0.0, 0.0]);
        let even = pentagon_area(&[2.0; 5]);
        assert_eq!(spiky, 0.0);
        assert!(even > spiky);
    }

    #[test]
    fn test_empty_pool_uses_baseline() {
        let profile = power_profile(&[], 55.0);
        assert_eq!(profile.stats.top15_premium_avg, 55.0);
        assert_eq!(profile.stats.top10_common_avg, 55.0);

        // r1 = 1, r2 = r3 = 1, r4 = 1, r5 = 0
        let scores = profile.scores();
        assert_eq!(scores[0], 0.0);
        assert!((scores[1] - 9.0).abs() < 1e-9);
        assert!((scores[2] - 9.0).abs() < 1e-9);
        assert_eq!(scores[3], 0.0);
        assert_eq!(scores[4], 0.0);
        assert!((profile.area - 0.475 * 81.0).abs() < 1e-9);
        assert_eq!(profile.class, FormatClass::Pauper);
    }

    #[test]
    fn test_bomb_heavy_format() {
        // Rares 66 vs baseline 55: r1 = 1.2 -> 10
        // Commons/uncommons 55: r2 = r3 = 1 -> 9
        // Rarity gap: 66 / 55 = 1.2 -> (0.2 * 60) clamps to 10
        // Half of C/U below 53 -> 0.5 * 20 = 10
        let cards = pool(&[66.0; 20], &[55.0, 55.0, 50.0, 50.0], &[55.0, 55.0, 50.0, 50.0]);
        let profile = power_profile(&cards, 55.0);
        let scores = profile.scores();

        assert!((scores[0] - 10.0).abs() < 1e-9);
        // Top 10 commons average 52.5 -> r2 = 0.9545 -> (1.15 - 0.9545) * 60 = 11.7 -> 10
        assert_eq!(scores[1], 10.0);
        assert_eq!(scores[2], 10.0);
        assert_eq!(scores[3], 10.0);
        assert_eq!(scores[4], 10.0);
        assert_eq!(profile.class, FormatClass::Prince);
        assert_eq!(profile.stats.chaff_count, 4);
        assert_eq!(profile.stats.chaff_pool, 8);
    }

    #[test]
    fn test_profile_carries_radar_vertices() {
        let cards = pool(&[66.0; 20], &[55.0, 55.0, 50.0, 50.0], &[55.0, 55.0, 50.0, 50.0]);
        let profile = power_profile(&cards, 55.0);

        assert_eq!(profile.radar, radar_points(&profile.scores()).to_vec());
        // All axes at 10: first vertex at the top of the canvas
        assert!((profile.radar[0].x - 100.0).abs() < 1e-9);
        assert!((profile.radar[0].y - 20.0).abs() < 1e-9);

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["radar"].as_array().map(Vec::len), Some(5));
    }

    #[test]
    fn test_chaff_threshold_is_strict() {
        let cards = pool(&[], &[53.0, 52.9], &[]);
        let profile = power_profile(&cards, 55.0);
        assert_eq!(profile.stats.chaff_count, 1);
        assert!(profile.axes[4].description.starts_with("50% of C/U"));
    }

    #[test]
    fn test_axis_descriptions() {
        let cards = pool(&[57.2], &[], &[]);
        let profile = power_profile(&cards, 55.0);
        assert_eq!(
            profile.axis(PowerAxis::BombDominance).unwrap().description,
            "Top 15 R/M are +4.0% above format average"
        );
    }

    #[test]
    fn test_leaning() {
        assert_eq!(leaning(115.0), Some(FormatClass::Prince));
        assert_eq!(leaning(90.0), None);
        assert_eq!(leaning(65.0), Some(FormatClass::Pauper));
        assert_eq!(leaning(130.0), None);
        assert_eq!(leaning(40.0), None);
    }

    #[test]
    fn test_radar_points() {
        let points = radar_points(&[10.0, 0.0, 0.0, 0.0, 0.0]);
        assert!((points[0].x - 100.0).abs() < 1e-9);
        assert!((points[0].y - 20.0).abs() < 1e-9);
        assert!((points[1].x - 100.0).abs() < 1e-9);
        assert!((points[1].y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_compare_profiles() {
        let a = power_profile(&pool(&[66.0; 20], &[55.0], &[55.0]), 55.0);
        let b = power_profile(&[], 55.0);
        let cmp = compare_profiles(&a, &b);

        assert_eq!(cmp.axes.len(), 5);
        assert_eq!(cmp.axes[0].diff, 10.0);
        assert_eq!(cmp.current_class, a.class);
        assert_eq!(cmp.other_class, FormatClass::Pauper);
    }
}
