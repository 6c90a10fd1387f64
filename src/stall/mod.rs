//! Stall classification.
//!
//! The classifier is a pure function of its inputs: a snapshot, the
//! collaborator data gathered for it ([`DetectorInputs`]) and an explicit
//! clock reading. Every enabled detector runs; none short-circuits another.
//!
//! | Detector | Severity |
//! |----------|----------|
//! | NO_ACTIVITY | MEDIUM, HIGH past 2x threshold |
//! | NO_HUMAN_INTERACTION / NO_COMMENTS | MEDIUM |
//! | ASSIGNED_NOT_PROGRESSING | HIGH |
//! | UNASSIGNED_ACTIVE | HIGH |
//! | HAS_BLOCKERS | CRITICAL |
//! | STATUS_BLOCKED | CRITICAL |
//! | promoted patterns | as detected |

pub mod detectors;
pub mod types;

pub use detectors::{DetectorInputs, EffectiveActivity, Fetched};
pub use types::{ReasonKind, StallReason, StallResult, HEALTHY_SUMMARY};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::{Settings, StallConfig, ThresholdConfig};
use crate::model::{hours_between, IssueSnapshot};

/// Collects reasons in detector order and finalizes them into a verdict.
#[derive(Debug, Default)]
struct ReasonSet {
    reasons: Vec<StallReason>,
}

impl ReasonSet {
    fn push(&mut self, reason: Option<StallReason>) {
        if let Some(reason) = reason {
            self.reasons.push(reason);
        }
    }

    fn extend<I: IntoIterator<Item = StallReason>>(&mut self, reasons: I) {
        self.reasons.extend(reasons);
    }

    fn into_vec(self) -> Vec<StallReason> {
        self.reasons
    }
}

/// Runs the detectors over one issue.
#[derive(Debug, Clone, Default)]
pub struct StallClassifier {
    thresholds: ThresholdConfig,
    settings: Settings,
}

impl StallClassifier {
    #[must_use]
    pub fn new(config: &StallConfig) -> Self {
        Self {
            thresholds: config.thresholds.clone(),
            settings: config.settings.clone(),
        }
    }

    #[must_use]
    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Classifies `issue` as of `now`. Suggestions are left empty; the
    /// advisor fills them in.
    #[must_use]
    pub fn evaluate(
        &self,
        issue: &IssueSnapshot,
        inputs: DetectorInputs,
        now: DateTime<Utc>,
    ) -> StallResult {
        let features = &self.settings.features;
        let activity =
            detectors::effective_activity(issue, inputs.analysis.as_ref(), &self.settings);

        let mut reasons = ReasonSet::default();
        reasons.push(detectors::no_activity(
            issue,
            activity,
            &self.thresholds,
            now,
        ));
        if features.comment_checks {
            reasons.push(detectors::human_interaction(
                issue,
                &inputs.last_human_comment,
                &self.settings,
                now,
            ));
        }
        if features.assignment_checks {
            reasons.push(detectors::assigned_not_progressing(
                issue,
                activity,
                &self.thresholds,
                &self.settings,
                now,
            ));
            reasons.push(detectors::unassigned_active(issue, &self.settings));
        }
        if features.blocker_checks {
            reasons.push(detectors::has_blockers(&inputs.blockers));
        }
        reasons.push(detectors::status_blocked(issue));
        if features.pattern_detection {
            if let Some(analysis) = inputs.analysis.as_ref() {
                reasons.extend(analysis.patterns.iter().map(StallReason::from));
            }
        }

        let reasons = reasons.into_vec();
        debug!(
            issue = %issue.key,
            reasons = reasons.len(),
            "Issue classified"
        );

        StallResult::from_reasons(
            issue.key.clone(),
            reasons,
            inputs.analysis,
            hours_between(issue.updated, now),
        )
    }
}
