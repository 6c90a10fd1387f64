//! Stall messages and the decision of whether to post one.
//!
//! Everything here is pure text: the caller posts the rendered message
//! wherever it likes. A message always has three parts in this order: a
//! summary line, a reasons block (one bullet per reason with its severity
//! glyph) and a suggested-actions block.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dashboard::DashboardMetrics;
use crate::model::hours_between;
use crate::severity::Severity;
use crate::stall::StallResult;

/// Tone of a posted message, derived from the overall severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKind {
    /// Critical stalls.
    Escalation,
    /// High severity.
    Reminder,
    /// Medium and low.
    Nudge,
}

impl MessageKind {
    #[must_use]
    pub fn for_severity(severity: Severity) -> Self {
        match severity {
            Severity::Critical => MessageKind::Escalation,
            Severity::High => MessageKind::Reminder,
            Severity::Medium | Severity::Low => MessageKind::Nudge,
        }
    }
}

/// Whether to post about a result now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationDecision {
    Skip { reason: String },
    Post { kind: MessageKind },
}

impl NotificationDecision {
    #[must_use]
    pub fn should_post(&self) -> bool {
        matches!(self, NotificationDecision::Post { .. })
    }
}

/// Decides whether to post, honoring the comment cooldown.
///
/// Healthy issues are never posted about. A previous notification less
/// than `cooldown_hours` ago suppresses a new one; a timestamp in the
/// future counts as zero hours ago.
#[must_use]
pub fn decide_notification(
    result: &StallResult,
    last_notified_at: Option<DateTime<Utc>>,
    cooldown_hours: f64,
    now: DateTime<Utc>,
) -> NotificationDecision {
    let Some(severity) = result.severity.filter(|_| result.is_stalled) else {
        return NotificationDecision::Skip {
            reason: "issue is healthy".to_string(),
        };
    };
    if let Some(last) = last_notified_at {
        let since = hours_between(last, now);
        if since < cooldown_hours {
            return NotificationDecision::Skip {
                reason: format!(
                    "notified {:.1}h ago, cooldown is {:.0}h",
                    since, cooldown_hours
                ),
            };
        }
    }
    NotificationDecision::Post {
        kind: MessageKind::for_severity(severity),
    }
}

/// Wording used by [`format_stall_message`].
pub trait Phrasing {
    /// First line of the message.
    fn summary_line(&self, kind: MessageKind, result: &StallResult) -> String;

    fn reasons_heading(&self) -> &str;

    fn suggestions_heading(&self) -> &str;
}

/// Fixed, deterministic wording.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPhrasing;

impl Phrasing for StandardPhrasing {
    fn summary_line(&self, kind: MessageKind, result: &StallResult) -> String {
        let lead = match kind {
            MessageKind::Escalation => "🚨 Needs attention now",
            MessageKind::Reminder => "⏰ Reminder",
            MessageKind::Nudge => "👋 Friendly nudge",
        };
        format!("{} on {}: {}", lead, result.issue_key, result.summary)
    }

    fn reasons_heading(&self) -> &str {
        "Why this looks stalled:"
    }

    fn suggestions_heading(&self) -> &str {
        "Suggested actions:"
    }
}

/// Renders a stall result as a multi-line message.
///
/// Healthy results render as the summary alone.
#[must_use]
pub fn format_stall_message(result: &StallResult, phrasing: &dyn Phrasing) -> String {
    let Some(severity) = result.severity.filter(|_| result.is_stalled) else {
        return format!("{}: {}", result.issue_key, result.summary);
    };

    let mut lines = vec![phrasing.summary_line(MessageKind::for_severity(severity), result)];

    lines.push(String::new());
    lines.push(phrasing.reasons_heading().to_string());
    for reason in &result.reasons {
        lines.push(format!("• {} {}", reason.severity.glyph(), reason.message));
    }

    if !result.suggestions.is_empty() {
        lines.push(String::new());
        lines.push(phrasing.suggestions_heading().to_string());
        for suggestion in &result.suggestions {
            lines.push(format!(
                "• {} {} ({})",
                suggestion.icon, suggestion.action, suggestion.rationale
            ));
        }
    }

    lines.join("\n")
}

/// Plain-text dashboard summary.
#[must_use]
pub fn format_dashboard(metrics: &DashboardMetrics) -> String {
    let mut lines = vec![format!(
        "{} issues: {} stalled, {} healthy",
        metrics.total_issues, metrics.stalled_issues, metrics.healthy_issues
    )];
    if metrics.failed_issues > 0 {
        lines.push(format!("{} could not be classified", metrics.failed_issues));
    }
    if metrics.stalled_issues > 0 {
        lines.push(format!(
            "Average time since update: {:.1}h",
            metrics.average_stall_hours
        ));
    }
    for severity in Severity::all() {
        if let Some(count) = metrics.by_severity.get(&severity) {
            lines.push(format!("{} {}: {}", severity.glyph(), severity, count));
        }
    }
    if let Some((code, count)) = metrics.top_reason() {
        lines.push(format!("Most common reason: {} ({})", code, count));
    }
    if let Some(longest) = &metrics.longest_stalled {
        lines.push(format!(
            "Longest stalled: {} ({:.0}h in {})",
            longest.key, longest.hours_since_update, longest.status
        ));
    }
    lines.join("\n")
}
