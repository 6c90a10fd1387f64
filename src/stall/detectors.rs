//! Individual stall detectors.
//!
//! Each detector looks at the snapshot plus whatever collaborator data was
//! fetched, and returns at most one reason. Detectors never fail: missing
//! data simply means "not triggered".

use chrono::{DateTime, Utc};

use super::types::{ReasonKind, StallReason};
use crate::changelog::ChangelogAnalysis;
use crate::config::{Settings, ThresholdConfig};
use crate::model::{hours_between, HumanComment, IssueSnapshot};
use crate::severity::Severity;

/// Issue age after which a complete lack of comments is reported.
pub const NO_COMMENTS_AFTER_HOURS: f64 = 48.0;

/// Name of the status that always means blocked.
pub const BLOCKED_STATUS: &str = "blocked";

/// Collaborator data that may or may not have been obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Available(T),
    /// The call failed (already logged) or the detector was disabled.
    Unavailable,
}

impl<T> Fetched<T> {
    #[must_use]
    pub fn as_available(&self) -> Option<&T> {
        match self {
            Self::Available(value) => Some(value),
            Self::Unavailable => None,
        }
    }
}

/// Everything a classification pass needs besides the snapshot.
#[derive(Debug, Clone)]
pub struct DetectorInputs {
    pub analysis: Option<ChangelogAnalysis>,
    pub last_human_comment: Fetched<Option<HumanComment>>,
    pub blockers: Fetched<Vec<String>>,
}

impl Default for DetectorInputs {
    fn default() -> Self {
        Self {
            analysis: None,
            last_human_comment: Fetched::Unavailable,
            blockers: Fetched::Unavailable,
        }
    }
}

/// When the issue last moved, and where that timestamp came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveActivity {
    pub at: DateTime<Utc>,
    pub from_changelog: bool,
}

/// Last meaningful changelog update when enabled and known, else `updated`.
#[must_use]
pub fn effective_activity(
    issue: &IssueSnapshot,
    analysis: Option<&ChangelogAnalysis>,
    settings: &Settings,
) -> EffectiveActivity {
    let from_changelog = settings
        .features
        .changelog_analysis
        .then_some(analysis)
        .flatten()
        .and_then(|a| a.last_meaningful_update);
    match from_changelog {
        Some(at) => EffectiveActivity {
            at,
            from_changelog: true,
        },
        None => EffectiveActivity {
            at: issue.updated,
            from_changelog: false,
        },
    }
}

/// Inactivity beyond the status threshold; HIGH past twice the threshold.
#[must_use]
pub fn no_activity(
    issue: &IssueSnapshot,
    activity: EffectiveActivity,
    thresholds: &ThresholdConfig,
    now: DateTime<Utc>,
) -> Option<StallReason> {
    let hours = hours_between(activity.at, now);
    let threshold = thresholds.hours_for(&issue.status);
    if hours <= threshold {
        return None;
    }
    let severity = if hours > threshold * 2.0 {
        Severity::High
    } else {
        Severity::Medium
    };
    Some(StallReason::new(
        ReasonKind::NoActivity {
            hours,
            threshold,
            from_changelog: activity.from_changelog,
        },
        severity,
        format!(
            "No meaningful activity for {:.0} hours in {} (threshold {:.0}h)",
            hours, issue.status, threshold
        ),
    ))
}

/// Human comment silence, or no human comment at all on an older issue.
#[must_use]
pub fn human_interaction(
    issue: &IssueSnapshot,
    last_comment: &Fetched<Option<HumanComment>>,
    settings: &Settings,
    now: DateTime<Utc>,
) -> Option<StallReason> {
    match last_comment.as_available()? {
        Some(comment) => {
            let hours = hours_between(comment.created, now);
            let threshold = settings.no_human_comment_threshold_hours;
            (hours > threshold).then(|| {
                StallReason::new(
                    ReasonKind::NoHumanInteraction {
                        hours,
                        threshold,
                        last_commenter: comment.author_name.clone(),
                    },
                    Severity::Medium,
                    format!(
                        "No human comment for {:.0} hours (last from {})",
                        hours, comment.author_name
                    ),
                )
            })
        }
        None => {
            let age_hours = hours_between(issue.created, now);
            (age_hours > NO_COMMENTS_AFTER_HOURS).then(|| {
                StallReason::new(
                    ReasonKind::NoComments { age_hours },
                    Severity::Medium,
                    format!(
                        "No comments in the {:.0} days since creation",
                        (age_hours / 24.0).floor()
                    ),
                )
            })
        }
    }
}

/// Assigned, in the in-progress status, and past that status's threshold.
#[must_use]
pub fn assigned_not_progressing(
    issue: &IssueSnapshot,
    activity: EffectiveActivity,
    thresholds: &ThresholdConfig,
    settings: &Settings,
    now: DateTime<Utc>,
) -> Option<StallReason> {
    if !settings.is_in_progress(&issue.status) {
        return None;
    }
    let assignee = issue.assignee.as_ref()?;
    let hours = hours_between(activity.at, now);
    let threshold = thresholds.hours_for(&issue.status);
    if hours <= threshold {
        return None;
    }
    Some(StallReason::new(
        ReasonKind::AssignedNotProgressing {
            assignee: assignee.display_name.clone(),
            hours,
            threshold,
        },
        Severity::High,
        format!(
            "Assigned to {} but not progressing for {:.0} hours",
            assignee.display_name, hours
        ),
    ))
}

/// Nobody owns an issue that is supposedly being worked on.
#[must_use]
pub fn unassigned_active(issue: &IssueSnapshot, settings: &Settings) -> Option<StallReason> {
    if issue.assignee.is_some() || !settings.needs_owner(&issue.status) {
        return None;
    }
    Some(StallReason::new(
        ReasonKind::UnassignedActive {
            status: issue.status.clone(),
        },
        Severity::High,
        format!("In {} with no assignee", issue.status),
    ))
}

/// Any blocks / is-blocked-by edge.
#[must_use]
pub fn has_blockers(blockers: &Fetched<Vec<String>>) -> Option<StallReason> {
    let blockers = blockers.as_available()?;
    if blockers.is_empty() {
        return None;
    }
    Some(StallReason::new(
        ReasonKind::HasBlockers {
            blockers: blockers.clone(),
        },
        Severity::Critical,
        format!("Blocked by {}", blockers.join(", ")),
    ))
}

/// The status itself says blocked.
#[must_use]
pub fn status_blocked(issue: &IssueSnapshot) -> Option<StallReason> {
    issue.status_is(BLOCKED_STATUS).then(|| {
        StallReason::new(
            ReasonKind::StatusBlocked,
            Severity::Critical,
            "Issue is in Blocked status",
        )
    })
}
