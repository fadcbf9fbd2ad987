//! Single-slot memoization for derived views.
//!
//! A `Memo` caches the last value it computed together with a SHA-256 key of
//! the serialized inputs. Recomputation happens only when the inputs change.

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{trace, warn};

/// Hex SHA-256 of the JSON encoding of `inputs`.
///
/// Returns `None` when the inputs cannot be serialized.
pub fn input_key<I: Serialize + ?Sized>(inputs: &I) -> Option<String> {
    match serde_json::to_vec(inputs) {
        Ok(bytes) => Some(hex::encode(Sha256::digest(&bytes))),
        Err(e) => {
            warn!("Memo inputs not serializable, caching disabled: {}", e);
            None
        }
    }
}

struct Slot<V> {
    key: Option<String>,
    value: V,
}

/// Cached result of one derivation.
pub struct Memo<V> {
    slot: Option<Slot<V>>,
    hits: u64,
    misses: u64,
}

impl<V> Memo<V> {
    pub fn new() -> Self {
        Self {
            slot: None,
            hits: 0,
            misses: 0,
        }
    }

    /// Return the cached value for `inputs`, computing it on a key change.
    pub fn get_or_compute<I, F>(&mut self, inputs: &I, compute: F) -> &V
    where
        I: Serialize + ?Sized,
        F: FnOnce() -> V,
    {
        let key = input_key(inputs);
        let fresh = match (&self.slot, &key) {
            (Some(slot), Some(key)) => slot.key.as_deref() == Some(key.as_str()),
            _ => false,
        };

        if fresh {
            self.hits += 1;
            trace!("Memo hit");
        } else {
            self.misses += 1;
            self.slot = None;
        }

        let slot = self.slot.get_or_insert_with(|| Slot {
            key,
            value: compute(),
        });
        &slot.value
    }

    /// The cached value, if any, regardless of inputs.
    pub fn peek(&self) -> Option<&V> {
        self.slot.as_ref().map(|s| &s.value)
    }

    pub fn invalidate(&mut self) {
        self.slot = None;
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

impl<V> Default for Memo<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: std::fmt::Debug> std::fmt::Debug for Memo<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memo")
            .field("value", &self.peek())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}
