//! Temporal anti-pattern detection over status and assignment timelines.
//!
//! Every detector is independent: they all run, and each contributes at
//! most one [`Pattern`]. Timelines are expected most-recent-first.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

use super::types::{FieldTransition, Pattern, PatternKind};
use crate::model::hours_between;
use crate::severity::Severity;

/// Minimum status changes, overall and inside the window, for thrashing.
pub const THRASHING_MIN_CHANGES: usize = 5;
pub const THRASHING_WINDOW_HOURS: f64 = 48.0;

/// Minimum status changes before ping-pong is considered.
pub const PING_PONG_MIN_CHANGES: usize = 3;
/// How many recent destinations ping-pong inspects.
pub const PING_PONG_LOOKBACK: usize = 5;

pub const CHURN_MIN_ASSIGNMENTS: usize = 3;
pub const CHURN_WINDOW_HOURS: f64 = 168.0;

pub const REOPEN_MIN_COUNT: usize = 2;

pub const STUCK_AFTER_HOURS: f64 = 168.0;

/// Runs all detectors and returns the patterns found, in detector order.
#[must_use]
pub fn detect_patterns(
    status_changes: &[FieldTransition],
    assignment_changes: &[FieldTransition],
    now: DateTime<Utc>,
) -> Vec<Pattern> {
    [
        detect_thrashing(status_changes, now),
        detect_ping_pong(status_changes),
        detect_assignment_churn(assignment_changes, now),
        detect_multiple_reopens(status_changes),
        detect_stuck(status_changes, now),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn within_hours(
    changes: &[FieldTransition],
    window_hours: f64,
    now: DateTime<Utc>,
) -> Vec<FieldTransition> {
    changes
        .iter()
        .filter(|c| hours_between(c.date, now) <= window_hours)
        .cloned()
        .collect()
}

/// Five or more status changes inside the last 48 hours.
#[must_use]
pub fn detect_thrashing(status_changes: &[FieldTransition], now: DateTime<Utc>) -> Option<Pattern> {
    if status_changes.len() < THRASHING_MIN_CHANGES {
        return None;
    }
    let recent = within_hours(status_changes, THRASHING_WINDOW_HOURS, now);
    if recent.len() < THRASHING_MIN_CHANGES {
        return None;
    }
    Some(Pattern {
        kind: PatternKind::StatusThrashing {
            changes_in_window: recent.len(),
            window_hours: THRASHING_WINDOW_HOURS,
        },
        severity: Severity::High,
        message: format!(
            "Status changed {} times in the last {} hours",
            recent.len(),
            THRASHING_WINDOW_HOURS
        ),
        evidence: recent,
    })
}

/// The last few status changes bounce between exactly two statuses.
#[must_use]
pub fn detect_ping_pong(status_changes: &[FieldTransition]) -> Option<Pattern> {
    if status_changes.len() < PING_PONG_MIN_CHANGES {
        return None;
    }
    let recent: Vec<FieldTransition> = status_changes
        .iter()
        .take(PING_PONG_LOOKBACK)
        .cloned()
        .collect();
    let destinations: BTreeSet<&str> = recent
        .iter()
        .map(|c| c.to.as_deref().unwrap_or(""))
        .collect();
    if destinations.len() != 2 {
        return None;
    }
    let statuses: Vec<String> = destinations.iter().map(|s| s.to_string()).collect();
    Some(Pattern {
        message: format!(
            "Status keeps bouncing between {} and {}",
            statuses[0], statuses[1]
        ),
        kind: PatternKind::StatusPingPong { statuses },
        severity: Severity::Medium,
        evidence: recent,
    })
}

/// Three or more assignee changes inside the last week.
#[must_use]
pub fn detect_assignment_churn(
    assignment_changes: &[FieldTransition],
    now: DateTime<Utc>,
) -> Option<Pattern> {
    if assignment_changes.len() < CHURN_MIN_ASSIGNMENTS {
        return None;
    }
    let recent = within_hours(assignment_changes, CHURN_WINDOW_HOURS, now);
    if recent.len() < CHURN_MIN_ASSIGNMENTS {
        return None;
    }
    Some(Pattern {
        kind: PatternKind::AssignmentChurning {
            assignments_in_window: recent.len(),
            window_hours: CHURN_WINDOW_HOURS,
        },
        severity: Severity::Medium,
        message: format!("Reassigned {} times in the last week", recent.len()),
        evidence: recent,
    })
}

fn is_reopen(change: &FieldTransition) -> bool {
    change
        .to
        .as_deref()
        .map(|to| {
            let to = to.to_lowercase();
            to.contains("open") || to.contains("reopened")
        })
        .unwrap_or(false)
}

/// Two or more transitions into an open/reopened status.
#[must_use]
pub fn detect_multiple_reopens(status_changes: &[FieldTransition]) -> Option<Pattern> {
    let reopens: Vec<FieldTransition> = status_changes
        .iter()
        .filter(|c| is_reopen(c))
        .cloned()
        .collect();
    if reopens.len() < REOPEN_MIN_COUNT {
        return None;
    }
    Some(Pattern {
        kind: PatternKind::MultipleReopens {
            reopen_count: reopens.len(),
        },
        severity: Severity::High,
        message: format!("Issue has been reopened {} times", reopens.len()),
        evidence: reopens,
    })
}

/// The latest status change is more than a week old.
#[must_use]
pub fn detect_stuck(status_changes: &[FieldTransition], now: DateTime<Utc>) -> Option<Pattern> {
    let latest = status_changes.first()?;
    let hours = hours_between(latest.date, now);
    if hours <= STUCK_AFTER_HOURS {
        return None;
    }
    let days = (hours / 24.0).floor() as u64;
    let status = latest.to.clone();
    Some(Pattern {
        message: format!(
            "Stuck in {} for {} days",
            status.as_deref().unwrap_or("the current status"),
            days
        ),
        kind: PatternKind::StuckInStatus { status, days },
        severity: Severity::Medium,
        evidence: vec![latest.clone()],
    })
}
