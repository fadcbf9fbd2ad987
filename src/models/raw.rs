//! Raw rows as returned by the PostgREST backend.
//!
//! Numeric columns arrive as numbers, numeric strings or null depending on
//! the column type and the ETL run that wrote them. Everything is coerced
//! here so downstream code only ever sees `Option<f64>` / `u64`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Coerce a JSON value to a finite float.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Coerce a JSON value to a non-negative integer; fractional values truncate.
pub fn coerce_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f as u64)
            })
        }
        _ => None,
    }
}

/// Coerce a history column: a JSON array, a JSON-encoded array string, or null.
pub fn coerce_series(value: &Value) -> Vec<f64> {
    match value {
        Value::Array(items) => items.iter().filter_map(coerce_f64).collect(),
        Value::String(s) => serde_json::from_str::<Value>(s)
            .ok()
            .filter(Value::is_array)
            .map(|v| coerce_series(&v))
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_f64))
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_u64))
}

fn lenient_series<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_series).unwrap_or_default())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// A `card_stats` row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCardRow {
    #[serde(default, deserialize_with = "lenient_string")]
    pub card_name: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub rarity: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub colors: Option<String>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub gih_wr: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub alsa: Option<f64>,

    #[serde(default, deserialize_with = "lenient_u64")]
    pub img_count: Option<u64>,

    #[serde(default, deserialize_with = "lenient_series")]
    pub win_rate_history: Vec<f64>,

    /// Archetype filter the row was aggregated under ("Global", "WU", ...).
    #[serde(default, deserialize_with = "lenient_string")]
    pub filter_context: Option<String>,
}

/// An `archetype_stats` row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDeckRow {
    #[serde(default, deserialize_with = "lenient_string")]
    pub archetype_name: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub colors: Option<String>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub win_rate: Option<f64>,

    #[serde(default, deserialize_with = "lenient_u64")]
    pub games_count: Option<u64>,

    #[serde(default, deserialize_with = "lenient_series")]
    pub win_rate_history: Vec<f64>,
}
