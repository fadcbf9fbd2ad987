//! Color identity normalization.

use serde::{Deserialize, Serialize};

/// Suffix the data source appends to splash archetypes.
pub const SPLASH_SUFFIX: &str = " + Splash";

/// One of the five mana colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    W,
    U,
    B,
    R,
    G,
}

impl Color {
    /// All colors in canonical WUBRG order.
    pub const ALL: [Color; 5] = [Color::W, Color::U, Color::B, Color::R, Color::G];

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'W' => Some(Color::W),
            'U' => Some(Color::U),
            'B' => Some(Color::B),
            'R' => Some(Color::R),
            'G' => Some(Color::G),
            _ => None,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Color::W => 'W',
            Color::U => 'U',
            Color::B => 'B',
            Color::R => 'R',
            Color::G => 'G',
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Color::W => "White",
            Color::U => "Blue",
            Color::B => "Black",
            Color::R => "Red",
            Color::G => "Green",
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Keep only W/U/B/R/G symbols, in source order, after dropping a splash suffix.
///
/// Null or empty input yields an empty string.
pub fn extract_colors(raw: Option<&str>) -> String {
    match raw {
        Some(s) => s
            .replace(SPLASH_SUFFIX, "")
            .chars()
            .filter(|c| Color::from_char(*c).is_some())
            .collect(),
        None => String::new(),
    }
}

fn sorted_symbols(s: &str) -> String {
    let mut symbols: Vec<char> = s.chars().filter(|c| Color::from_char(*c).is_some()).collect();
    symbols.sort_unstable();
    symbols.into_iter().collect()
}

/// Order-insensitive comparison of two color strings.
///
/// Returns false when either side is missing or empty.
pub fn are_colors_equal(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => {
            sorted_symbols(a) == sorted_symbols(b)
        }
        _ => false,
    }
}

/// Canonical color identity of a card or deck.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ColorIdentity {
    symbols: String,
    splash: bool,
}

impl ColorIdentity {
    /// Parse a raw color string; never fails.
    pub fn parse(raw: Option<&str>) -> Self {
        let splash = raw
            .map(|s| s.to_lowercase().contains("splash"))
            .unwrap_or(false);
        Self {
            symbols: extract_colors(raw),
            splash,
        }
    }

    pub fn from_code(code: &str, splash: bool) -> Self {
        Self {
            symbols: extract_colors(Some(code)),
            splash,
        }
    }

    /// Canonical symbols in source order (e.g. "WU").
    pub fn symbols(&self) -> &str {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn is_splash(&self) -> bool {
        self.splash
    }

    pub fn is_colorless(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn is_multicolor(&self) -> bool {
        self.symbols.len() > 1
    }

    /// The single color of a mono-colored identity.
    pub fn mono(&self) -> Option<Color> {
        let mut chars = self.symbols.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Color::from_char(c),
            _ => None,
        }
    }

    pub fn contains(&self, color: Color) -> bool {
        self.symbols.contains(color.symbol())
    }

    /// Same symbol set irrespective of order; splash flag ignored.
    pub fn same_colors(&self, other: &ColorIdentity) -> bool {
        are_colors_equal(Some(&self.symbols), Some(&other.symbols))
    }

    /// Every symbol of `self` appears in `other`. Colorless is a subset of anything.
    pub fn is_within(&self, other: &ColorIdentity) -> bool {
        self.symbols.chars().all(|c| other.symbols.contains(c))
    }
}

impl From<String> for ColorIdentity {
    fn from(s: String) -> Self {
        ColorIdentity::parse(Some(&s))
    }
}

impl From<ColorIdentity> for String {
    fn from(c: ColorIdentity) -> Self {
        c.to_string()
    }
}

impl std::fmt::Display for ColorIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.splash {
            write!(f, "{}{}", self.symbols, SPLASH_SUFFIX)
        } else {
            write!(f, "{}", self.symbols)
        }
    }
}

/// A named color combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPair {
    pub code: &'static str,
    pub name: &'static str,
}

/// The ten two-color archetypes.
pub const PAIRS: [ColorPair; 10] = [
    ColorPair { code: "WU", name: "Azorius (WU)" },
    ColorPair { code: "UB", name: "Dimir (UB)" },
    ColorPair { code: "BR", name: "Rakdos (BR)" },
    ColorPair { code: "RG", name: "Gruul (RG)" },
    ColorPair { code: "WG", name: "Selesnya (GW)" },
    ColorPair { code: "WB", name: "Orzhov (WB)" },
    ColorPair { code: "UR", name: "Izzet (UR)" },
    ColorPair { code: "BG", name: "Golgari (BG)" },
    ColorPair { code: "WR", name: "Boros (RW)" },
    ColorPair { code: "UG", name: "Simic (GU)" },
];

/// The ten three-color archetypes.
pub const TRIOS: [ColorPair; 10] = [
    ColorPair { code: "WUB", name: "Esper (WUB)" },
    ColorPair { code: "WUR", name: "Jeskai (WUR)" },
    ColorPair { code: "WUG", name: "Bant (WUG)" },
    ColorPair { code: "WBR", name: "Mardu (WBR)" },
    ColorPair { code: "WBG", name: "Abzan (WBG)" },
    ColorPair { code: "WRG", name: "Naya (WRG)" },
    ColorPair { code: "UBR", name: "Grixis (UBR)" },
    ColorPair { code: "UBG", name: "Sultai (UBG)" },
    ColorPair { code: "URG", name: "Temur (URG)" },
    ColorPair { code: "BRG", name: "Jund (BRG)" },
];

/// Display name for a color code, e.g. "UW" -> "Azorius (WU)".
///
/// Falls back to the canonical code when the combination is not catalogued.
pub fn archetype_display_name(raw: &str) -> String {
    let code = extract_colors(Some(raw));
    PAIRS
        .iter()
        .chain(TRIOS.iter())
        .find(|p| are_colors_equal(Some(p.code), Some(&code)))
        .map(|p| p.name.to_string())
        .unwrap_or(code)
}
