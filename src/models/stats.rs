//! Derived statistics models.
//!
//! Everything here is a view-model value: computed from cards and decks on
//! demand and never persisted.

use serde::{Deserialize, Serialize};

use super::{Card, Color, ColorIdentity, Rarity};

/// Balance classification shared by the archetype and color scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceLabel {
    Balanced,
    SlightlyBalanced,
    SlightlyUnbalanced,
    Unbalanced,
}

impl BalanceLabel {
    /// Classify a 0-10 balance score.
    pub fn from_score(score: f64) -> Self {
        if score >= 7.0 {
            BalanceLabel::Balanced
        } else if score >= 5.0 {
            BalanceLabel::SlightlyBalanced
        } else if score >= 4.0 {
            BalanceLabel::SlightlyUnbalanced
        } else {
            BalanceLabel::Unbalanced
        }
    }
}

impl std::fmt::Display for BalanceLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BalanceLabel::Balanced => write!(f, "Balanced"),
            BalanceLabel::SlightlyBalanced => write!(f, "Slightly Balanced"),
            BalanceLabel::SlightlyUnbalanced => write!(f, "Slightly Unbalanced"),
            BalanceLabel::Unbalanced => write!(f, "Unbalanced"),
        }
    }
}

/// One balance dimension: raw spread, mapped score and label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceComponent {
    /// Unweighted population standard deviation
    pub std_dev: f64,

    /// Mapped 0-10 score, one decimal
    pub score: f64,

    pub label: BalanceLabel,

    /// Number of values the spread was computed over
    pub samples: usize,
}

/// Archetype and color balance for one (set, format).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceScore {
    pub archetype: BalanceComponent,
    pub color: BalanceComponent,

    /// Games-weighted archetype spread. Informational only.
    pub as_played_std_dev: f64,
}

/// Overall format character from the power profile area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormatClass {
    /// Bomb-dominant
    Prince,
    Balanced,
    /// Synergy-dominant
    Pauper,
}

impl FormatClass {
    pub fn from_area(area: f64) -> Self {
        if area >= 120.0 {
            FormatClass::Prince
        } else if area >= 60.0 {
            FormatClass::Balanced
        } else {
            FormatClass::Pauper
        }
    }
}

impl std::fmt::Display for FormatClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatClass::Prince => write!(f, "Prince"),
            FormatClass::Balanced => write!(f, "Balanced"),
            FormatClass::Pauper => write!(f, "Pauper"),
        }
    }
}

/// The five power-profile axes, in pentagon order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerAxis {
    BombDominance,
    CommonWeakness,
    UncommonWeakness,
    RarityGap,
    ChaffRatio,
}

impl PowerAxis {
    pub const ALL: [PowerAxis; 5] = [
        PowerAxis::BombDominance,
        PowerAxis::CommonWeakness,
        PowerAxis::UncommonWeakness,
        PowerAxis::RarityGap,
        PowerAxis::ChaffRatio,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PowerAxis::BombDominance => "Bomb Dominance",
            PowerAxis::CommonWeakness => "Common Weakness",
            PowerAxis::UncommonWeakness => "Uncommon Weakness",
            PowerAxis::RarityGap => "Rarity Gap",
            PowerAxis::ChaffRatio => "Chaff Ratio",
        }
    }
}

impl std::fmt::Display for PowerAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Score of one axis plus the ratio it was mapped from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisScore {
    pub axis: PowerAxis,

    /// 0-10
    pub score: f64,

    /// Raw ratio before mapping (fraction for the chaff axis)
    pub ratio: f64,

    pub description: String,
}

/// Supporting averages behind a power profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerStats {
    pub baseline: f64,
    pub top15_premium_avg: f64,
    pub top10_common_avg: f64,
    pub top10_uncommon_avg: f64,
    pub top20_premium_avg: f64,
    pub chaff_count: usize,
    pub chaff_pool: usize,
}

/// Five-axis power profile of a format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerProfile {
    /// Axis scores in `PowerAxis::ALL` order
    pub axes: Vec<AxisScore>,

    /// Pentagon area score
    pub area: f64,

    /// `area` as a percentage of the all-10 maximum
    pub area_percent: f64,

    pub class: FormatClass,

    /// Set only for `Balanced` profiles close to a boundary
    pub leaning: Option<FormatClass>,

    /// Radar chart vertices in `axes` order
    pub radar: Vec<RadarPoint>,

    pub stats: PowerStats,
}

/// A vertex of the radar chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadarPoint {
    pub x: f64,
    pub y: f64,
}

impl PowerProfile {
    pub fn scores(&self) -> [f64; 5] {
        let mut out = [0.0; 5];
        for (slot, axis) in out.iter_mut().zip(&self.axes) {
            *slot = axis.score;
        }
        out
    }

    pub fn axis(&self, axis: PowerAxis) -> Option<&AxisScore> {
        self.axes.iter().find(|a| a.axis == axis)
    }
}

/// Card evaluation label from the scatter-plot grid or sealed ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardLabel {
    Bomb,
    TopTier,
    AbsoluteGem,
    OverratedTopTier,
    VeryGood,
    HiddenGem,
    Good,
    SolidPlayable,
    Playable,
    Overrated,
    Filler,
    OverhypedTrap,
    Bad,
    Chaff,
}

impl CardLabel {
    /// Tier strength; higher is better. Total over all labels.
    pub fn strength(&self) -> u8 {
        match self {
            CardLabel::Bomb => 14,
            CardLabel::TopTier => 13,
            CardLabel::AbsoluteGem => 12,
            CardLabel::OverratedTopTier => 11,
            CardLabel::VeryGood => 10,
            CardLabel::HiddenGem => 9,
            CardLabel::Good => 8,
            CardLabel::SolidPlayable => 7,
            CardLabel::Playable => 6,
            CardLabel::Overrated => 5,
            CardLabel::Filler => 4,
            CardLabel::OverhypedTrap => 3,
            CardLabel::Bad => 2,
            CardLabel::Chaff => 1,
        }
    }

    pub fn is_higher_tier_than(&self, other: &CardLabel) -> bool {
        self.strength() > other.strength()
    }

    pub fn label(&self) -> &'static str {
        match self {
            CardLabel::Bomb => "Bomb",
            CardLabel::TopTier => "Top Tier",
            CardLabel::AbsoluteGem => "Absolute Gem",
            CardLabel::OverratedTopTier => "Overrated Top Tier",
            CardLabel::VeryGood => "Very Good",
            CardLabel::HiddenGem => "Hidden Gem",
            CardLabel::Good => "Good",
            CardLabel::SolidPlayable => "Solid Playable",
            CardLabel::Playable => "Playable",
            CardLabel::Overrated => "Overrated",
            CardLabel::Filler => "Filler",
            CardLabel::OverhypedTrap => "Overhyped Trap",
            CardLabel::Bad => "Bad",
            CardLabel::Chaff => "Chaff",
        }
    }
}

impl std::fmt::Display for CardLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Letter grade of a card inside an archetype (card WR vs deck WR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_delta(delta: f64) -> Self {
        if delta >= 5.5 {
            Grade::S
        } else if delta >= 3.0 {
            Grade::A
        } else if delta >= 0.5 {
            Grade::B
        } else if delta >= -1.5 {
            Grade::C
        } else if delta >= -3.5 {
            Grade::D
        } else {
            Grade::F
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Grade::S => write!(f, "S"),
            Grade::A => write!(f, "A"),
            Grade::B => write!(f, "B"),
            Grade::C => write!(f, "C"),
            Grade::D => write!(f, "D"),
            Grade::F => write!(f, "F"),
        }
    }
}

/// Visual band of a win-rate delta against the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeltaBand {
    Outstanding,
    Excellent,
    Strong,
    Positive,
    Slight,
    Weak,
    Poor,
    Terrible,
}

impl DeltaBand {
    pub fn from_delta(delta: f64) -> Self {
        if delta >= 9.0 {
            DeltaBand::Outstanding
        } else if delta >= 6.0 {
            DeltaBand::Excellent
        } else if delta >= 3.0 {
            DeltaBand::Strong
        } else if delta >= 0.0 {
            DeltaBand::Positive
        } else if delta >= -3.0 {
            DeltaBand::Slight
        } else if delta >= -6.0 {
            DeltaBand::Weak
        } else if delta >= -9.0 {
            DeltaBand::Poor
        } else {
            DeltaBand::Terrible
        }
    }
}

/// Which members of a partition feed its mean and spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsMode {
    #[default]
    All,
    Top10,
    Bottom10,
}

impl StatsMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "all" => Some(StatsMode::All),
            "top10" | "top" => Some(StatsMode::Top10),
            "bottom10" | "bottom" => Some(StatsMode::Bottom10),
            _ => None,
        }
    }
}

/// Partition key of a derived stat row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum PartitionKey {
    Rarity(Rarity),
    Color(ColorGroup),
}

/// Color partition: a mono color, multicolor, or colorless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorGroup {
    Mono(Color),
    Multi,
    Colorless,
}

impl ColorGroup {
    pub const ALL: [ColorGroup; 7] = [
        ColorGroup::Mono(Color::W),
        ColorGroup::Mono(Color::U),
        ColorGroup::Mono(Color::B),
        ColorGroup::Mono(Color::R),
        ColorGroup::Mono(Color::G),
        ColorGroup::Multi,
        ColorGroup::Colorless,
    ];

    pub fn of(colors: &ColorIdentity) -> Self {
        match colors.mono() {
            Some(c) => ColorGroup::Mono(c),
            None if colors.is_multicolor() => ColorGroup::Multi,
            None => ColorGroup::Colorless,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColorGroup::Mono(c) => c.name(),
            ColorGroup::Multi => "Multicolor",
            ColorGroup::Colorless => "Colorless",
        }
    }
}

/// A card paired with its delta to the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCard {
    pub name: String,
    pub rarity: Rarity,
    pub gih_wr: f64,
    pub delta: f64,
}

impl RankedCard {
    pub fn new(card: &Card, gih_wr: f64, baseline: f64) -> Self {
        Self {
            name: card.name.clone(),
            rarity: card.rarity,
            gih_wr,
            delta: gih_wr - baseline,
        }
    }
}

/// Aggregate over one partition of cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedStatRow {
    pub key: PartitionKey,
    pub label: String,

    /// Cards with a win rate in the partition
    pub count: usize,

    /// Mean win rate of the selected members; baseline when empty
    pub mean_wr: f64,

    pub delta: f64,

    pub std_dev: f64,

    pub best: Vec<RankedCard>,
    pub worst: Vec<RankedCard>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_label_bands() {
        assert_eq!(BalanceLabel::from_score(10.0), BalanceLabel::Balanced);
        assert_eq!(BalanceLabel::from_score(7.0), BalanceLabel::Balanced);
        assert_eq!(BalanceLabel::from_score(5.6), BalanceLabel::SlightlyBalanced);
        assert_eq!(BalanceLabel::from_score(4.0), BalanceLabel::SlightlyUnbalanced);
        assert_eq!(BalanceLabel::from_score(3.9), BalanceLabel::Unbalanced);
        assert_eq!(BalanceLabel::SlightlyBalanced.to_string(), "Slightly Balanced");
    }

    #[test]
    fn test_format_class_boundaries() {
        assert_eq!(FormatClass::from_area(237.5), FormatClass::Prince);
        assert_eq!(FormatClass::from_area(120.0), FormatClass::Prince);
        assert_eq!(FormatClass::from_area(119.9), FormatClass::Balanced);
        assert_eq!(FormatClass::from_area(60.0), FormatClass::Balanced);
        assert_eq!(FormatClass::from_area(59.9), FormatClass::Pauper);
    }

    #[test]
    fn test_card_label_order_is_total() {
        let mut strengths: Vec<u8> = [
            CardLabel::Bomb,
            CardLabel::TopTier,
            CardLabel::AbsoluteGem,
            CardLabel::OverratedTopTier,
            CardLabel::VeryGood,
            CardLabel::HiddenGem,
            CardLabel::Good,
            CardLabel::SolidPlayable,
            CardLabel::Playable,
            CardLabel::Overrated,
            CardLabel::Filler,
            CardLabel::OverhypedTrap,
            CardLabel::Bad,
            CardLabel::Chaff,
        ]
        .iter()
        .map(CardLabel::strength)
        .collect();
        strengths.dedup();
        assert_eq!(strengths.len(), 14);
        assert!(CardLabel::Bomb.is_higher_tier_than(&CardLabel::AbsoluteGem));
    }

    #[test]
    fn test_grade_bands() {
        assert_eq!(Grade::from_delta(6.0), Grade::S);
        assert_eq!(Grade::from_delta(3.0), Grade::A);
        assert_eq!(Grade::from_delta(0.5), Grade::B);
        assert_eq!(Grade::from_delta(-1.5), Grade::C);
        assert_eq!(Grade::from_delta(-3.5), Grade::D);
        assert_eq!(Grade::from_delta(-3.6), Grade::F);
    }

    #[test]
    fn test_delta_band() {
        assert_eq!(DeltaBand::from_delta(9.0), DeltaBand::Outstanding);
        assert_eq!(DeltaBand::from_delta(0.0), DeltaBand::Positive);
        assert_eq!(DeltaBand::from_delta(-0.1), DeltaBand::Slight);
        assert_eq!(DeltaBand::from_delta(-9.0), DeltaBand::Poor);
        assert_eq!(DeltaBand::from_delta(-9.1), DeltaBand::Terrible);
    }

    #[test]
    fn test_color_group_of() {
        assert_eq!(ColorGroup::of(&ColorIdentity::parse(Some("W"))), ColorGroup::Mono(Color::W));
        assert_eq!(ColorGroup::of(&ColorIdentity::parse(Some("WU"))), ColorGroup::Multi);
        assert_eq!(ColorGroup::of(&ColorIdentity::parse(None)), ColorGroup::Colorless);
    }

    #[test]
    fn test_stats_mode_parse() {
        assert_eq!(StatsMode::parse("Top10"), Some(StatsMode::Top10));
        assert_eq!(StatsMode::parse("bottom"), Some(StatsMode::Bottom10));
        assert_eq!(StatsMode::parse("median"), None);
    }
}
