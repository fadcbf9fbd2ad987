//! Coordinate projector and card evaluation.
//!
//! Positions are fractions of the plot area, `(0, 0)` bottom-left, clamped
//! into `[0.02, 0.98]` so extreme cards stay visible.
//!
//! Draft formats plot ALSA (x, fixed range) against GIH WR (y, data range
//! with a one-point margin). Sealed formats have no pick order: y spans
//! baseline -8 to +12 and x is a stable per-card jitter.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::mean;
use super::pipeline::CardFilter;
use crate::models::{Card, CardLabel, ColorIdentity, FormatMode, Rarity};

/// Lowest rendered position.
pub const EDGE_MIN: f64 = 0.02;
/// Highest rendered position.
pub const EDGE_MAX: f64 = 0.98;

/// Fixed ALSA axis for draft formats.
pub const ALSA_RANGE: AxisRange = AxisRange { min: 1.25, max: 8.75 };

/// Mean ALSA used when no card has pick-order data.
pub const DEFAULT_MEAN_ALSA: f64 = 4.5;

const DEFAULT_MIN_WR: f64 = 45.0;
const DEFAULT_MAX_WR: f64 = 70.0;
const DRAFT_WR_MARGIN: f64 = 1.0;
const SEALED_WR_BELOW: f64 = 8.0;
const SEALED_WR_ABOVE: f64 = 12.0;

const JITTER_MIN: f64 = 0.10;
const JITTER_SPAN: f64 = 0.80;

/// Display range of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Position of `value` in `[0, 1]`. A degenerate range maps to the middle.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 || !span.is_finite() {
            return 0.5;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }

    /// Rendered position, clamped into `[EDGE_MIN, EDGE_MAX]`.
    pub fn project(&self, value: f64) -> f64 {
        self.normalize(value).clamp(EDGE_MIN, EDGE_MAX)
    }
}

/// Win-rate axis for the given mode.
pub fn win_rate_range(mode: FormatMode, cards: &[Card], baseline: f64) -> AxisRange {
    match mode {
        FormatMode::Draft => {
            let rates: Vec<f64> = cards.iter().filter_map(|c| c.gih_wr).collect();
            let min = rates.iter().copied().reduce(f64::min).unwrap_or(DEFAULT_MIN_WR);
            let max = rates.iter().copied().reduce(f64::max).unwrap_or(DEFAULT_MAX_WR);
            AxisRange::new(min - DRAFT_WR_MARGIN, max + DRAFT_WR_MARGIN)
        }
        FormatMode::Sealed => {
            AxisRange::new(baseline - SEALED_WR_BELOW, baseline + SEALED_WR_ABOVE)
        }
    }
}

/// Mean ALSA over cards with a win rate and pick-order data.
pub fn mean_alsa(cards: &[Card]) -> f64 {
    let values: Vec<f64> = cards
        .iter()
        .filter(|c| c.gih_wr.is_some())
        .filter_map(|c| c.alsa)
        .collect();
    mean(&values, DEFAULT_MEAN_ALSA)
}

/// Stable horizontal position in `[0.10, 0.90]` derived from the card name.
pub fn jitter(name: &str) -> f64 {
    let digest = Sha256::digest(name.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    let unit = u64::from_be_bytes(bytes) as f64 / u64::MAX as f64;
    JITTER_MIN + unit * JITTER_SPAN
}

/// Win-rate band of the evaluation grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridRow {
    Elite,
    Strong,
    Average,
    Weak,
}

impl GridRow {
    pub fn from_delta(delta: f64) -> Self {
        if delta >= 5.0 {
            GridRow::Elite
        } else if delta > 2.0 {
            GridRow::Strong
        } else if delta >= -2.0 {
            GridRow::Average
        } else {
            GridRow::Weak
        }
    }
}

/// Pick-order band of the evaluation grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridColumn {
    Early,
    Mid,
    Late,
}

impl GridColumn {
    pub fn from_alsa(alsa: f64, mean_alsa: f64) -> Self {
        if alsa <= mean_alsa - 0.5 {
            GridColumn::Early
        } else if alsa <= mean_alsa + 0.5 {
            GridColumn::Mid
        } else {
            GridColumn::Late
        }
    }
}

/// ALSA at or above which an early Strong pick is still Top Tier.
pub const TOP_TIER_MIN_ALSA: f64 = 2.0;

/// Plain grid lookup, without the Strong x Early override.
pub fn grid_label(row: GridRow, column: GridColumn) -> CardLabel {
    use GridColumn::*;
    use GridRow::*;
    match (row, column) {
        (Elite, Early) => CardLabel::Bomb,
        (Elite, Mid) => CardLabel::TopTier,
        (Elite, Late) => CardLabel::AbsoluteGem,
        (Strong, Early) => CardLabel::OverratedTopTier,
        (Strong, Mid) => CardLabel::VeryGood,
        (Strong, Late) => CardLabel::HiddenGem,
        (Average, Early) => CardLabel::Overrated,
        (Average, Mid) => CardLabel::Playable,
        (Average, Late) => CardLabel::Filler,
        (Weak, Early) => CardLabel::OverhypedTrap,
        (Weak, Mid) => CardLabel::Bad,
        (Weak, Late) => CardLabel::Chaff,
    }
}

/// Sealed ladder: one column of win-rate deltas.
pub const SEALED_LADDER: [(f64, CardLabel); 8] = [
    (9.0, CardLabel::Bomb),
    (7.0, CardLabel::TopTier),
    (5.0, CardLabel::VeryGood),
    (3.0, CardLabel::Good),
    (1.0, CardLabel::SolidPlayable),
    (-1.0, CardLabel::Playable),
    (-3.0, CardLabel::Filler),
    (-5.0, CardLabel::Bad),
];

pub fn ladder_label(delta: f64) -> CardLabel {
    SEALED_LADDER
        .iter()
        .find(|(threshold, _)| delta >= *threshold)
        .map(|(_, label)| *label)
        .unwrap_or(CardLabel::Chaff)
}

/// Classify a card by win rate (and pick order in draft).
///
/// Draft cards without ALSA fall back to the sealed ladder.
pub fn evaluate(
    gih_wr: f64,
    alsa: Option<f64>,
    baseline: f64,
    mean_alsa: f64,
    mode: FormatMode,
) -> CardLabel {
    let delta = gih_wr - baseline;
    let alsa = match (mode, alsa) {
        (FormatMode::Draft, Some(a)) => a,
        _ => return ladder_label(delta),
    };

    let row = GridRow::from_delta(delta);
    let column = GridColumn::from_alsa(alsa, mean_alsa);
    match (row, column) {
        // Taken early but not first-pick early: still a top card
        (GridRow::Strong, GridColumn::Early) if alsa >= TOP_TIER_MIN_ALSA => CardLabel::TopTier,
        _ => grid_label(row, column),
    }
}

/// A horizontal guide at a win-rate delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierLine {
    pub delta: f64,
    /// Label of the band at and above this line
    pub label: CardLabel,
    pub y: f64,
}

/// Axis ranges and guides shared by every point of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartFrame {
    pub mode: FormatMode,
    pub baseline: f64,
    pub mean_alsa: f64,
    pub wr_range: AxisRange,
    /// Present in draft mode only
    pub alsa_range: Option<AxisRange>,
    pub baseline_y: f64,
    pub mean_alsa_x: Option<f64>,
    /// Sealed mode only
    pub tier_lines: Vec<TierLine>,
}

impl ChartFrame {
    /// Derive the frame from every card of the context, unfiltered.
    pub fn new(cards: &[Card], mode: FormatMode, baseline: f64) -> Self {
        let wr_range = win_rate_range(mode, cards, baseline);
        let mean_alsa = mean_alsa(cards);
        let (alsa_range, mean_alsa_x, tier_lines) = match mode {
            FormatMode::Draft => {
                (Some(ALSA_RANGE), Some(ALSA_RANGE.project(mean_alsa)), Vec::new())
            }
            FormatMode::Sealed => {
                let lines = SEALED_LADDER
                    .iter()
                    .map(|(delta, label)| TierLine {
                        delta: *delta,
                        label: *label,
                        y: wr_range.project(baseline + delta),
                    })
                    .collect();
                (None, None, lines)
            }
        };

        Self {
            mode,
            baseline,
            mean_alsa,
            wr_range,
            alsa_range,
            baseline_y: wr_range.project(baseline),
            mean_alsa_x,
            tier_lines,
        }
    }

    pub fn x_for(&self, card: &Card) -> f64 {
        match (self.alsa_range, card.alsa) {
            (Some(range), Some(alsa)) => range.project(alsa),
            _ => jitter(&card.name),
        }
    }

    pub fn y_for(&self, gih_wr: f64) -> f64 {
        self.wr_range.project(gih_wr)
    }

    /// Place one card; `None` without a win rate.
    pub fn point(&self, card: &Card, search: &str) -> Option<ScatterPoint> {
        let gih_wr = card.gih_wr?;
        let search = search.trim().to_lowercase();
        Some(ScatterPoint {
            name: card.name.clone(),
            rarity: card.rarity,
            colors: card.colors.clone(),
            gih_wr,
            alsa: card.alsa,
            x: self.x_for(card),
            y: self.y_for(gih_wr),
            label: evaluate(gih_wr, card.alsa, self.baseline, self.mean_alsa, self.mode),
            is_match: !search.is_empty() && card.name.to_lowercase().contains(&search),
        })
    }
}

/// A card placed on the chart with its tooltip data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub name: String,
    pub rarity: Rarity,
    pub colors: ColorIdentity,
    pub gih_wr: f64,
    pub alsa: Option<f64>,
    pub x: f64,
    pub y: f64,
    pub label: CardLabel,
    pub is_match: bool,
}

/// A full scatter plot: frame from all cards, points from the filtered ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPlot {
    pub frame: ChartFrame,
    pub points: Vec<ScatterPoint>,
    pub match_count: usize,
}

impl ScatterPlot {
    pub fn build(cards: &[Card], mode: FormatMode, baseline: f64, filter: &CardFilter) -> Self {
        let frame = ChartFrame::new(cards, mode, baseline);
        let points: Vec<ScatterPoint> = cards
            .iter()
            .filter(|c| filter.matches_facets(c))
            .filter_map(|c| frame.point(c, &filter.search))
            .collect();
        let match_count = points.iter().filter(|p| p.is_match).count();

        Self {
            frame,
            points,
            match_count,
        }
    }
}
