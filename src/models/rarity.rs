//! Card rarity tiers.

use serde::{Deserialize, Serialize};

/// Canonical rarity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Rarity {
    Mythic,
    Rare,
    Uncommon,
    #[default]
    Common,
}

impl Rarity {
    /// Display order used by rarity partitions.
    pub const ALL: [Rarity; 4] = [Rarity::Mythic, Rarity::Rare, Rarity::Uncommon, Rarity::Common];

    /// Single-letter code (M, R, U, C).
    pub fn code(&self) -> char {
        match self {
            Rarity::Mythic => 'M',
            Rarity::Rare => 'R',
            Rarity::Uncommon => 'U',
            Rarity::Common => 'C',
        }
    }

    pub fn from_code(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'M' => Some(Rarity::Mythic),
            'R' => Some(Rarity::Rare),
            'U' => Some(Rarity::Uncommon),
            'C' => Some(Rarity::Common),
            _ => None,
        }
    }

    /// Rares and mythics.
    pub fn is_premium(&self) -> bool {
        matches!(self, Rarity::Mythic | Rarity::Rare)
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rarity::Mythic => write!(f, "Mythic"),
            Rarity::Rare => write!(f, "Rare"),
            Rarity::Uncommon => write!(f, "Uncommon"),
            Rarity::Common => write!(f, "Common"),
        }
    }
}

/// Map a raw rarity string onto its tier by first character.
///
/// Unknown, empty or missing input is Common.
pub fn normalize_rarity(raw: Option<&str>) -> Rarity {
    raw.and_then(|s| s.trim().chars().next())
        .and_then(Rarity::from_code)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_rarity_mythic_spellings() {
        for raw in ["mythic", "Mythic", "M", "m"] {
            assert_eq!(normalize_rarity(Some(raw)), Rarity::Mythic, "{raw}");
        }
    }

    #[test]
    fn test_normalize_rarity_defaults_to_common() {
        assert_eq!(normalize_rarity(Some("")), Rarity::Common);
        assert_eq!(normalize_rarity(Some("special")), Rarity::Common);
        assert_eq!(normalize_rarity(None), Rarity::Common);
    }

    #[test]
    fn test_normalize_rarity_other_tiers() {
        assert_eq!(normalize_rarity(Some("rare")), Rarity::Rare);
        assert_eq!(normalize_rarity(Some("uncommon")), Rarity::Uncommon);
        assert_eq!(normalize_rarity(Some("common")), Rarity::Common);
    }

    #[test]
    fn test_rarity_premium() {
        assert!(Rarity::Mythic.is_premium());
        assert!(Rarity::Rare.is_premium());
        assert!(!Rarity::Uncommon.is_premium());
    }
}
