use serde::{Deserialize, Serialize};

/// Confidence level of a hop's resolved location.
///
/// Wire values are an open set of strings; they are folded into this closed
/// enum once, at ingestion, so nothing downstream matches on raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrecisionTier {
    City,
    Subdivision,
    Country,
    None,
}

impl PrecisionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrecisionTier::City => "city",
            PrecisionTier::Subdivision => "subdivision",
            PrecisionTier::Country => "country",
            PrecisionTier::None => "none",
        }
    }

    /// Normalizes an explicit wire value. Unknown strings become `None`.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "city" => PrecisionTier::City,
            "subdivision" => PrecisionTier::Subdivision,
            "country" => PrecisionTier::Country,
            _ => PrecisionTier::None,
        }
    }

    /// City and subdivision fixes are precise enough to draw path lines through.
    pub fn is_path_eligible(&self) -> bool {
        matches!(self, PrecisionTier::City | PrecisionTier::Subdivision)
    }
}

impl std::fmt::Display for PrecisionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
