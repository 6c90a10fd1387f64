//! Per-reason and per-pattern suggestion generators.
//!
//! Dispatch is an exhaustive `match`, so adding a reason or pattern kind
//! without a generator does not compile.

use super::types::{Suggestion, SuggestionKind};
use crate::changelog::{ChangelogAnalysis, PatternKind};
use crate::config::Settings;
use crate::model::{IssueLink, IssueSnapshot, User};
use crate::severity::Severity;
use crate::stall::{ReasonKind, StallReason};

/// Read-only context shared by every generator.
#[derive(Debug, Clone, Copy)]
pub struct AdviceContext<'a> {
    pub issue: &'a IssueSnapshot,
    pub settings: &'a Settings,
    pub analysis: Option<&'a ChangelogAnalysis>,
    pub watchers: &'a [User],
}

/// Suggestions for one stall reason.
#[must_use]
pub fn for_reason(reason: &StallReason, ctx: &AdviceContext<'_>) -> Vec<Suggestion> {
    match &reason.kind {
        ReasonKind::NoActivity { hours, .. } => no_activity(reason.severity, *hours, ctx),
        ReasonKind::NoHumanInteraction { hours, .. } => vec![Suggestion::new(
            SuggestionKind::PostUpdate,
            "📝",
            "Post a short status update comment",
            format!("Nobody has commented in {:.0} hours", hours),
            Severity::Medium,
        )],
        ReasonKind::NoComments { .. } => vec![add_context(ctx.issue)],
        ReasonKind::AssignedNotProgressing { assignee, hours, .. } => vec![
            Suggestion::new(
                SuggestionKind::PingAssignee,
                "👋",
                format!("Check in with {} about what is holding this up", assignee),
                format!("In progress without movement for {:.0} hours", hours),
                Severity::High,
            )
            .with_target(assignee.clone()),
            Suggestion::new(
                SuggestionKind::SplitWork,
                "✂️",
                "Break the work into smaller, shippable pieces",
                "Large tasks tend to stall without visible progress",
                Severity::Low,
            ),
        ],
        ReasonKind::UnassignedActive { status } => assign_owner(status, ctx),
        ReasonKind::HasBlockers { blockers } => blockers
            .iter()
            .map(|key| {
                Suggestion::new(
                    SuggestionKind::ResolveBlocker,
                    "🧱",
                    format!("Follow up on blocker {}", key),
                    format!("{} must move before this issue can", key),
                    Severity::Critical,
                )
                .with_target(key.clone())
            })
            .collect(),
        ReasonKind::StatusBlocked => vec![Suggestion::new(
            SuggestionKind::LinkBlocker,
            "🔗",
            "Link the blocking issue and name who can unblock it",
            "A Blocked status without a visible blocker is hard to act on",
            Severity::High,
        )],
        ReasonKind::Pattern { pattern } => for_pattern(pattern),
    }
}

/// Suggestions for one changelog pattern.
#[must_use]
pub fn for_pattern(pattern: &PatternKind) -> Vec<Suggestion> {
    let suggestion = match pattern {
        PatternKind::StatusThrashing {
            changes_in_window, ..
        } => Suggestion::new(
            SuggestionKind::SyncDirection,
            "🧭",
            "Get everyone in sync on direction before changing status again",
            format!("{} status changes in two days", changes_in_window),
            Severity::High,
        ),
        PatternKind::StatusPingPong { statuses } => Suggestion::new(
            SuggestionKind::ClarifyWorkflow,
            "🔀",
            format!(
                "Clarify the workflow between {}",
                statuses.join(" and ")
            ),
            "The issue keeps bouncing between the same statuses",
            Severity::Medium,
        ),
        PatternKind::AssignmentChurning {
            assignments_in_window,
            ..
        } => Suggestion::new(
            SuggestionKind::SingleOwner,
            "🎯",
            "Assign one clear owner and keep it",
            format!("Reassigned {} times this week", assignments_in_window),
            Severity::Medium,
        ),
        PatternKind::MultipleReopens { reopen_count } => Suggestion::new(
            SuggestionKind::RootCause,
            "🔍",
            "Run a root-cause investigation before closing again",
            format!("Reopened {} times", reopen_count),
            Severity::High,
        ),
        PatternKind::StuckInStatus { status, days } => Suggestion::new(
            SuggestionKind::ReassessStatus,
            "⏳",
            format!(
                "Confirm {} still reflects reality",
                status.as_deref().unwrap_or("the current status")
            ),
            format!("No status change in {} days", days),
            Severity::Medium,
        ),
    };
    vec![suggestion]
}

/// One suggestion covering every open dependency link.
#[must_use]
pub fn for_dependencies(links: &[IssueLink], settings: &Settings) -> Option<Suggestion> {
    let open: Vec<&str> = links
        .iter()
        .filter(|l| l.is_dependency())
        .filter(|l| {
            l.status
                .as_deref()
                .map(|s| !settings.is_terminal(s))
                .unwrap_or(true)
        })
        .map(|l| l.key.as_str())
        .collect();
    if open.is_empty() {
        return None;
    }
    Some(
        Suggestion::new(
            SuggestionKind::CheckDependencies,
            "📎",
            format!("Check progress on dependencies: {}", open.join(", ")),
            "Open dependencies can hold this issue back",
            Severity::Medium,
        )
        .with_targets(open),
    )
}

/// Escalation for stalled issues carrying a top priority.
#[must_use]
pub fn for_priority(issue: &IssueSnapshot, settings: &Settings) -> Option<Suggestion> {
    let priority = issue.priority.as_deref()?;
    if !settings.is_escalation_priority(priority) {
        return None;
    }
    Some(Suggestion::new(
        SuggestionKind::Escalate,
        "🚨",
        format!("Escalate: {} priority issue is stalled", priority),
        "Top-priority work should not sit idle",
        Severity::Critical,
    ))
}

fn no_activity(severity: Severity, hours: f64, ctx: &AdviceContext<'_>) -> Vec<Suggestion> {
    let issue = ctx.issue;
    let mut out = Vec::new();

    match issue.assignee.as_ref() {
        Some(assignee) if assignee.active => out.push(
            Suggestion::new(
                SuggestionKind::PingAssignee,
                "👋",
                format!("Ping {} for a status update", assignee.display_name),
                format!("No meaningful activity for {:.0} hours", hours),
                severity,
            )
            .with_target(assignee.display_name.clone()),
        ),
        Some(assignee) => out.push(
            Suggestion::new(
                SuggestionKind::Reassign,
                "🔁",
                format!(
                    "Reassign from deactivated user {}",
                    assignee.display_name
                ),
                "The current assignee can no longer work on this",
                Severity::High,
            )
            .with_target(assignee.display_name.clone()),
        ),
        None => out.push(Suggestion::new(
            SuggestionKind::AssignOwner,
            "👤",
            "Assign an owner so someone is accountable",
            format!("Idle for {:.0} hours with nobody assigned", hours),
            Severity::Medium,
        )),
    }

    if ctx.settings.is_review(&issue.status) {
        out.push(Suggestion::new(
            SuggestionKind::RequestReview,
            "👀",
            "Nudge the reviewers or pick a new reviewer",
            format!("Waiting in {} for {:.0} hours", issue.status, hours),
            Severity::Medium,
        ));
    } else if ctx.settings.is_backlog(&issue.status) {
        out.push(Suggestion::new(
            SuggestionKind::GroomBacklog,
            "🗂️",
            "Re-prioritize this item or close it",
            "Backlog items that never move add noise to planning",
            Severity::Low,
        ));
    }

    out
}

fn add_context(issue: &IssueSnapshot) -> Suggestion {
    match issue.reporter.as_ref() {
        Some(reporter) => Suggestion::new(
            SuggestionKind::AddContext,
            "💬",
            format!("Ask {} for more context", reporter.display_name),
            "No one has commented since the issue was created",
            Severity::Medium,
        )
        .with_target(reporter.display_name.clone()),
        None => Suggestion::new(
            SuggestionKind::AddContext,
            "💬",
            "Add a comment describing the current state",
            "No one has commented since the issue was created",
            Severity::Medium,
        ),
    }
}

/// Reporter first, then the most recently active watcher, then anyone.
fn assign_owner(status: &str, ctx: &AdviceContext<'_>) -> Vec<Suggestion> {
    let mut out = Vec::new();
    let reporter = ctx.issue.reporter.as_ref().filter(|r| r.active);

    if let Some(reporter) = reporter {
        out.push(
            Suggestion::new(
                SuggestionKind::AssignOwner,
                "👤",
                format!("Assign to reporter {}", reporter.display_name),
                format!("The reporter knows the context and it is already in {}", status),
                Severity::High,
            )
            .with_target(reporter.display_name.clone()),
        );
    }

    if let Some((watcher, seen_active)) = most_recent_watcher(ctx, reporter) {
        let (rationale, confidence) = if seen_active {
            ("Most recently active watcher on this issue", Severity::Medium)
        } else {
            ("Watching this issue", Severity::Low)
        };
        out.push(
            Suggestion::new(
                SuggestionKind::AssignOwner,
                "👤",
                format!("Assign to watcher {}", watcher.display_name),
                rationale,
                confidence,
            )
            .with_target(watcher.display_name.clone()),
        );
    }

    out.push(Suggestion::new(
        SuggestionKind::AssignOwner,
        "👤",
        "Assign someone to own this issue",
        format!("Issues in {} need an owner", status),
        Severity::Medium,
    ));
    out
}

/// Picks the watcher with the latest changelog activity, falling back to
/// the first eligible watcher. The flag tells whether activity was seen.
fn most_recent_watcher<'a>(
    ctx: &AdviceContext<'a>,
    reporter: Option<&User>,
) -> Option<(&'a User, bool)> {
    let eligible = |w: &&User| {
        w.active && reporter.map(|r| r.account_id != w.account_id).unwrap_or(true)
    };

    if let Some(analysis) = ctx.analysis {
        for contributor in &analysis.contributors {
            if let Some(watcher) = ctx
                .watchers
                .iter()
                .filter(|w| eligible(w))
                .find(|w| w.account_id == contributor.account_id)
            {
                return Some((watcher, true));
            }
        }
    }
    ctx.watchers.iter().find(|w| eligible(w)).map(|w| (w, false))
}
