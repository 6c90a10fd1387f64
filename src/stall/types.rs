//! Stall reasons and verdicts.

use serde::{Deserialize, Serialize};

use crate::advisor::Suggestion;
use crate::changelog::{ChangelogAnalysis, Pattern, PatternKind};
use crate::severity::Severity;

/// Why an issue is considered stalled, with the figures behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonKind {
    NoActivity {
        hours: f64,
        threshold: f64,
        /// Whether the activity timestamp came from changelog analysis.
        from_changelog: bool,
    },
    NoHumanInteraction {
        hours: f64,
        threshold: f64,
        last_commenter: String,
    },
    NoComments {
        age_hours: f64,
    },
    AssignedNotProgressing {
        assignee: String,
        hours: f64,
        threshold: f64,
    },
    UnassignedActive {
        status: String,
    },
    HasBlockers {
        blockers: Vec<String>,
    },
    StatusBlocked,
    /// A changelog pattern promoted verbatim.
    Pattern {
        pattern: PatternKind,
    },
}

impl ReasonKind {
    /// Stable identifier, used for histograms and serialized output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoActivity { .. } => "NO_ACTIVITY",
            Self::NoHumanInteraction { .. } => "NO_HUMAN_INTERACTION",
            Self::NoComments { .. } => "NO_COMMENTS",
            Self::AssignedNotProgressing { .. } => "ASSIGNED_NOT_PROGRESSING",
            Self::UnassignedActive { .. } => "UNASSIGNED_ACTIVE",
            Self::HasBlockers { .. } => "HAS_BLOCKERS",
            Self::StatusBlocked => "STATUS_BLOCKED",
            Self::Pattern { pattern } => pattern.code(),
        }
    }

    #[must_use]
    pub fn is_pattern(&self) -> bool {
        matches!(self, Self::Pattern { .. })
    }
}

/// One triggered detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StallReason {
    pub kind: ReasonKind,
    pub severity: Severity,
    pub message: String,
}

impl StallReason {
    #[must_use]
    pub fn new(kind: ReasonKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl From<&Pattern> for StallReason {
    fn from(pattern: &Pattern) -> Self {
        Self {
            kind: ReasonKind::Pattern {
                pattern: pattern.kind.clone(),
            },
            severity: pattern.severity,
            message: pattern.message.clone(),
        }
    }
}

/// Summary used when no detector fired.
pub const HEALTHY_SUMMARY: &str = "No stall detected";

/// The classifier's verdict for one issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StallResult {
    pub issue_key: String,
    pub is_stalled: bool,
    /// `None` exactly when `reasons` is empty.
    pub severity: Option<Severity>,
    pub reasons: Vec<StallReason>,
    pub summary: String,
    pub suggestions: Vec<Suggestion>,
    pub analysis: Option<ChangelogAnalysis>,
    /// Hours since the snapshot's `updated` timestamp at classification time.
    pub hours_since_update: f64,
}

impl StallResult {
    /// Builds a verdict from the detector output. Severity and summary are
    /// always derived from `reasons`.
    #[must_use]
    pub fn from_reasons(
        issue_key: impl Into<String>,
        reasons: Vec<StallReason>,
        analysis: Option<ChangelogAnalysis>,
        hours_since_update: f64,
    ) -> Self {
        let severity = Severity::max_of(reasons.iter().map(|r| r.severity));
        let summary = summarize(&reasons, severity);
        Self {
            issue_key: issue_key.into(),
            is_stalled: !reasons.is_empty(),
            severity,
            reasons,
            summary,
            suggestions: Vec::new(),
            analysis,
            hours_since_update,
        }
    }

    /// Whether a reason with the given code is present.
    #[must_use]
    pub fn has_reason(&self, code: &str) -> bool {
        self.reasons.iter().any(|r| r.code() == code)
    }

    /// The first reason with the given code.
    #[must_use]
    pub fn reason(&self, code: &str) -> Option<&StallReason> {
        self.reasons.iter().find(|r| r.code() == code)
    }
}

fn summarize(reasons: &[StallReason], severity: Option<Severity>) -> String {
    let Some(severity) = severity else {
        return HEALTHY_SUMMARY.to_string();
    };
    reasons
        .iter()
        .find(|r| r.severity == severity)
        .map(|r| format!("{} {}", severity.summary_prefix(), r.message))
        .unwrap_or_else(|| HEALTHY_SUMMARY.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(severity: Severity, message: &str) -> StallReason {
        StallReason::new(ReasonKind::StatusBlocked, severity, message)
    }

    #[test]
    fn test_severity_is_max_of_reasons() {
        let result = StallResult::from_reasons(
            "PROJ-1",
            vec![
                reason(Severity::Medium, "m"),
                reason(Severity::Critical, "c"),
                reason(Severity::High, "h"),
            ],
            None,
            0.0,
        );
        assert!(result.is_stalled);
        assert_eq!(result.severity, Some(Severity::Critical));
        assert_eq!(result.summary, "Critical: c");
    }

    #[test]
    fn test_empty_reasons_is_healthy() {
        let result = StallResult::from_reasons("PROJ-1", Vec::new(), None, 1.0);
        assert!(!result.is_stalled);
        assert!(result.severity.is_none());
        assert!(result.reasons.is_empty());
        assert_eq!(result.summary, HEALTHY_SUMMARY);
    }

    #[test]
    fn test_summary_uses_first_reason_at_top_severity() {
        let result = StallResult::from_reasons(
            "PROJ-1",
            vec![
                reason(Severity::Medium, "first medium"),
                reason(Severity::High, "first high"),
                reason(Severity::High, "second high"),
            ],
            None,
            0.0,
        );
        assert_eq!(result.summary, "High Priority: first high");
    }

    #[test]
    fn test_medium_prefix() {
        let result =
            StallResult::from_reasons("PROJ-1", vec![reason(Severity::Medium, "m")], None, 0.0);
        assert_eq!(result.summary, "Attention Needed: m");
    }

    #[test]
    fn test_pattern_reason_keeps_code() {
        let kind = ReasonKind::Pattern {
            pattern: PatternKind::MultipleReopens { reopen_count: 3 },
        };
        assert_eq!(kind.code(), "MULTIPLE_REOPENS");
        assert!(kind.is_pattern());
    }

    #[test]
    fn test_reason_serializes_with_type_tag() {
        let reason = StallReason::new(
            ReasonKind::HasBlockers {
                blockers: vec!["PROJ-9".to_string()],
            },
            Severity::Critical,
            "Blocked by PROJ-9",
        );
        let json = serde_json::to_value(&reason).unwrap();
        assert_eq!(json["kind"]["type"], "HAS_BLOCKERS");
        assert_eq!(json["severity"], "CRITICAL");
    }
}
