//! Output types of changelog analysis.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::severity::Severity;

/// One status or assignee transition, flattened out of its changelog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldTransition {
    pub date: DateTime<Utc>,
    pub from: Option<String>,
    pub to: Option<String>,
    /// Display name of the author; `None` when the tracker omitted it.
    pub author: Option<String>,
}

/// A human who has touched the issue, with their latest change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contributor {
    pub account_id: String,
    pub display_name: String,
    pub last_active: DateTime<Utc>,
}

/// Which anti-pattern was found, with its variant-specific figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternKind {
    StatusThrashing {
        changes_in_window: usize,
        window_hours: f64,
    },
    StatusPingPong {
        statuses: Vec<String>,
    },
    AssignmentChurning {
        assignments_in_window: usize,
        window_hours: f64,
    },
    MultipleReopens {
        reopen_count: usize,
    },
    StuckInStatus {
        status: Option<String>,
        days: u64,
    },
}

impl PatternKind {
    /// Stable identifier, used for histograms and serialized output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::StatusThrashing { .. } => "STATUS_THRASHING",
            Self::StatusPingPong { .. } => "STATUS_PING_PONG",
            Self::AssignmentChurning { .. } => "ASSIGNMENT_CHURNING",
            Self::MultipleReopens { .. } => "MULTIPLE_REOPENS",
            Self::StuckInStatus { .. } => "STUCK_IN_STATUS",
        }
    }
}

/// A temporal anti-signal detected across an issue's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub kind: PatternKind,
    pub severity: Severity,
    pub message: String,
    /// The transitions that triggered the pattern, most recent first.
    pub evidence: Vec<FieldTransition>,
}

/// Everything derived from one issue's changelog.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogAnalysis {
    pub last_meaningful_update: Option<DateTime<Utc>>,
    pub last_meaningful_author: Option<String>,
    pub total_changes: usize,
    pub meaningful_changes: usize,
    pub noise_changes: usize,
    /// Status transitions, most recent first.
    pub status_changes: Vec<FieldTransition>,
    /// Assignee transitions, most recent first.
    pub assignment_changes: Vec<FieldTransition>,
    /// Human authors, most recently active first.
    pub contributors: Vec<Contributor>,
    pub patterns: Vec<Pattern>,
    pub is_thrashing: bool,
}

impl ChangelogAnalysis {
    /// Analysis of an issue with no history at all.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The same analysis with pattern findings removed.
    #[must_use]
    pub fn without_patterns(mut self) -> Self {
        self.patterns.clear();
        self.is_thrashing = false;
        self
    }

    /// Whether a pattern with the given code was detected.
    #[must_use]
    pub fn has_pattern(&self, code: &str) -> bool {
        self.patterns.iter().any(|p| p.kind.code() == code)
    }

    /// Share of changes that were noise (0.0 - 1.0).
    #[must_use]
    pub fn noise_ratio(&self) -> Option<f64> {
        if self.total_changes == 0 {
            None
        } else {
            Some(self.noise_changes as f64 / self.total_changes as f64)
        }
    }
}
