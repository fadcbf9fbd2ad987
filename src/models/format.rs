//! Play formats.

use serde::{Deserialize, Serialize};

/// Game format a data set was collected in.
///
/// Any format whose name contains "sealed" is a sealed format; everything
/// else is treated as a draft format with pick-order data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Format {
    #[default]
    PremierDraft,
    TradDraft,
    Sealed,
    ArenaDirectSealed,
    Other(String),
}

impl Format {
    pub fn parse(s: &str) -> Self {
        match s {
            "PremierDraft" => Format::PremierDraft,
            "TradDraft" => Format::TradDraft,
            "Sealed" => Format::Sealed,
            "ArenaDirect_Sealed" => Format::ArenaDirectSealed,
            other => Format::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Format::PremierDraft => "PremierDraft",
            Format::TradDraft => "TradDraft",
            Format::Sealed => "Sealed",
            Format::ArenaDirectSealed => "ArenaDirect_Sealed",
            Format::Other(s) => s,
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.as_str().to_lowercase().contains("sealed")
    }

    pub fn is_draft(&self) -> bool {
        !self.is_sealed()
    }

    /// Projection mode for this format.
    pub fn mode(&self) -> FormatMode {
        if self.is_sealed() {
            FormatMode::Sealed
        } else {
            FormatMode::Draft
        }
    }
}

impl From<String> for Format {
    fn from(s: String) -> Self {
        Format::parse(&s)
    }
}

impl From<Format> for String {
    fn from(f: Format) -> Self {
        f.as_str().to_string()
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Draft formats carry pick-order data; sealed formats do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatMode {
    Draft,
    Sealed,
}

impl std::fmt::Display for FormatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatMode::Draft => write!(f, "draft"),
            FormatMode::Sealed => write!(f, "sealed"),
        }
    }
}
