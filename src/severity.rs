//! Ordinal urgency scale shared by stall reasons, patterns and suggestions.

use serde::{Deserialize, Serialize};

/// Severity of a reason or pattern, and confidence of a suggestion.
///
/// Variants are declared low to high so the derived `Ord` gives
/// `Critical > High > Medium > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// Suggestions use the same scale for how sure we are they help.
pub type Confidence = Severity;

impl Severity {
    /// Highest severity in `levels`, or `None` when empty.
    pub fn max_of<I: IntoIterator<Item = Severity>>(levels: I) -> Option<Severity> {
        levels.into_iter().max()
    }

    /// Prefix used for the one-line stall summary.
    #[must_use]
    pub fn summary_prefix(&self) -> &'static str {
        match self {
            Self::Critical => "Critical:",
            Self::High => "High Priority:",
            Self::Medium | Self::Low => "Attention Needed:",
        }
    }

    /// Glyph shown next to a reason in rendered messages.
    #[must_use]
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Critical => "\u{1F534}",
            Self::High => "\u{1F7E0}",
            Self::Medium => "\u{1F7E1}",
            Self::Low => "\u{1F535}",
        }
    }

    /// Returns all levels from highest to lowest.
    #[must_use]
    pub fn all() -> [Severity; 4] {
        [Self::Critical, Self::High, Self::Medium, Self::Low]
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_order() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn test_max_of() {
        let levels = [Severity::Medium, Severity::Critical, Severity::High];
        assert_eq!(Severity::max_of(levels), Some(Severity::Critical));
        assert_eq!(Severity::max_of(Vec::new()), None);
    }

    #[test]
    fn test_summary_prefix() {
        assert_eq!(Severity::Critical.summary_prefix(), "Critical:");
        assert_eq!(Severity::High.summary_prefix(), "High Priority:");
        assert_eq!(Severity::Low.summary_prefix(), "Attention Needed:");
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&Severity::High).unwrap();
        assert_eq!(json, "\"HIGH\"");
        let restored: Severity = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, Severity::High);
    }
}
