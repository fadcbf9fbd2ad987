//! Core data models: cards, decks, and the derived view-model values.

mod card;
mod color;
mod deck;
mod format;
mod rarity;
mod raw;
mod stats;

pub use card::*;
pub use color::*;
pub use deck::*;
pub use format::*;
pub use rarity::*;
pub use raw::*;
pub use stats::*;

#[cfg(test)]
pub(crate) mod fixtures {
    pub use super::card::fixtures::*;
    pub use super::deck::fixtures::*;
}
