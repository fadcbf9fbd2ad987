//! Statistics calculation engine.
//!
//! Pure derivations from cards and decks:
//! - Aggregate statistics (mean, spread)
//! - Ranking and deltas within peer groups
//! - Balance scores and the power profile
//! - Chart projection and card evaluation
//! - Partitions, pipelines and meta breakdowns
//!
//! Nothing here fails: missing or insufficient data resolves to a sentinel
//! (`None`, the baseline, or 0).

pub mod archetype;
pub mod balance;
pub mod blueprint;
pub mod meta;
pub mod pipeline;
pub mod power;
pub mod projector;
pub mod ranking;

/// Arithmetic mean, or `baseline` for an empty slice.
pub fn mean(values: &[f64], baseline: f64) -> f64 {
    if values.is_empty() {
        baseline
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Population standard deviation around `mean`; 0 for fewer than two values.
pub fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Standard deviation of `(value, weight)` pairs around their weighted mean.
///
/// Returns 0 for fewer than two items or a non-positive total weight.
/// Items with negative weight are ignored.
pub fn weighted_std_dev(items: &[(f64, f64)]) -> f64 {
    let items: Vec<(f64, f64)> = items.iter().copied().filter(|(_, w)| *w >= 0.0).collect();
    if items.len() < 2 {
        return 0.0;
    }

    let total_weight: f64 = items.iter().map(|(_, w)| w).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }

    let weighted_mean = items.iter().map(|(v, w)| v * w).sum::<f64>() / total_weight;
    let variance = items
        .iter()
        .map(|(v, w)| w * (v - weighted_mean).powi(2))
        .sum::<f64>()
        / total_weight;
    variance.sqrt()
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Mean of the `n` largest values, or `baseline` when there are none.
pub fn top_n_mean(values: &[f64], n: usize, baseline: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));
    sorted.truncate(n);
    mean(&sorted, baseline)
}
