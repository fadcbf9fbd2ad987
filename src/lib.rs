//! # Limitless Meta
//!
//! Analytics for Magic: The Gathering limited formats: card rankings, format
//! balance scores, power profiles and card evaluation charts built from
//! 17lands-style card and archetype statistics.
//!
//! ## Architecture
//!
//! - **models**: Cards, decks, color identities and derived view values
//! - **calculate**: Pure statistics (ranking, balance, power, projection, ...)
//! - **memo**: Input-keyed caching of derived views
//! - **dashboard**: Memoized bundle of every view for one set and format
//! - **source**: Remote (PostgREST) and snapshot data sources
//! - **storage**: JSONL snapshot files
//! - **config**: Configuration loading and persisted preferences

pub mod calculate;
pub mod config;
pub mod dashboard;
pub mod memo;
pub mod models;
pub mod source;
pub mod storage;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "6h", "30m", "90s").
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Default to seconds
        (s, 1)
    };

    let num: u64 = num_str.parse().ok()?;
    Some(Duration::from_secs(num * multiplier))
}
