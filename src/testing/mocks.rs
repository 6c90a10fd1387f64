//! Mock issue tracker.
//!
//! Returns the same canned data for every issue, with per-operation and
//! per-issue failure injection and call counting.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::model::{ChangelogEntry, HumanComment, IssueLink, IssueSnapshot, User};
use crate::tracker::IssueTracker;

/// The collaborator operations a tracker exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackerOp {
    FetchChangelog,
    FetchLastHumanComment,
    FetchBlockers,
    FetchLinkedIssues,
    FetchWatchers,
    SearchIssues,
}

impl TrackerOp {
    pub const ALL: [TrackerOp; 6] = [
        TrackerOp::FetchChangelog,
        TrackerOp::FetchLastHumanComment,
        TrackerOp::FetchBlockers,
        TrackerOp::FetchLinkedIssues,
        TrackerOp::FetchWatchers,
        TrackerOp::SearchIssues,
    ];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            TrackerOp::FetchChangelog => "fetch_changelog",
            TrackerOp::FetchLastHumanComment => "fetch_last_human_comment",
            TrackerOp::FetchBlockers => "fetch_blockers",
            TrackerOp::FetchLinkedIssues => "fetch_linked_issues",
            TrackerOp::FetchWatchers => "fetch_watchers",
            TrackerOp::SearchIssues => "search_issues",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Mock implementation of [`IssueTracker`].
///
/// Thread-safe for use in async contexts.
///
/// # Example
///
/// ```rust,ignore
/// let tracker = MockTracker::new()
///     .with_blockers(vec!["PROJ-2".to_string()])
///     .failing(TrackerOp::FetchWatchers);
///
/// assert!(tracker.fetch_watchers("1").await.is_err());
/// assert_eq!(tracker.calls(TrackerOp::FetchWatchers), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockTracker {
    changelog: Vec<ChangelogEntry>,
    last_comment: Option<HumanComment>,
    blockers: Vec<String>,
    links: Vec<IssueLink>,
    watchers: Vec<User>,
    issues: Vec<IssueSnapshot>,
    failing_ops: HashSet<TrackerOp>,
    failing_issues: HashSet<String>,
    calls: [AtomicU32; 6],
}

impl Clone for MockTracker {
    fn clone(&self) -> Self {
        Self {
            changelog: self.changelog.clone(),
            last_comment: self.last_comment.clone(),
            blockers: self.blockers.clone(),
            links: self.links.clone(),
            watchers: self.watchers.clone(),
            issues: self.issues.clone(),
            failing_ops: self.failing_ops.clone(),
            failing_issues: self.failing_issues.clone(),
            calls: std::array::from_fn(|i| AtomicU32::new(self.calls[i].load(Ordering::SeqCst))),
        }
    }
}

impl MockTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_changelog(mut self, entries: Vec<ChangelogEntry>) -> Self {
        self.changelog = entries;
        self
    }

    #[must_use]
    pub fn with_last_comment(mut self, comment: HumanComment) -> Self {
        self.last_comment = Some(comment);
        self
    }

    #[must_use]
    pub fn with_blockers(mut self, blockers: Vec<String>) -> Self {
        self.blockers = blockers;
        self
    }

    #[must_use]
    pub fn with_links(mut self, links: Vec<IssueLink>) -> Self {
        self.links = links;
        self
    }

    #[must_use]
    pub fn with_watchers(mut self, watchers: Vec<User>) -> Self {
        self.watchers = watchers;
        self
    }

    /// Issues returned by `search_issues`, in this order.
    #[must_use]
    pub fn with_issues(mut self, issues: Vec<IssueSnapshot>) -> Self {
        self.issues = issues;
        self
    }

    /// Make `op` fail for every issue.
    #[must_use]
    pub fn failing(mut self, op: TrackerOp) -> Self {
        self.failing_ops.insert(op);
        self
    }

    /// Make every per-issue call fail for `issue_id`.
    #[must_use]
    pub fn failing_for_issue(mut self, issue_id: &str) -> Self {
        self.failing_issues.insert(issue_id.to_string());
        self
    }

    /// Number of times `op` was called.
    pub fn calls(&self, op: TrackerOp) -> u32 {
        self.calls[op.index()].load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> u32 {
        TrackerOp::ALL.iter().map(|op| self.calls(*op)).sum()
    }

    fn enter(&self, op: TrackerOp, issue_id: Option<&str>) -> Result<()> {
        self.calls[op.index()].fetch_add(1, Ordering::SeqCst);
        if self.failing_ops.contains(&op) {
            bail!("{} unavailable", op.name());
        }
        if let Some(id) = issue_id {
            if self.failing_issues.contains(id) {
                bail!("{} failed for issue {}", op.name(), id);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl IssueTracker for MockTracker {
    async fn fetch_changelog(&self, issue_id: &str) -> Result<Vec<ChangelogEntry>> {
        self.enter(TrackerOp::FetchChangelog, Some(issue_id))?;
        Ok(self.changelog.clone())
    }

    async fn fetch_last_human_comment(&self, issue_id: &str) -> Result<Option<HumanComment>> {
        self.enter(TrackerOp::FetchLastHumanComment, Some(issue_id))?;
        Ok(self.last_comment.clone())
    }

    async fn fetch_blockers(&self, issue_id: &str) -> Result<Vec<String>> {
        self.enter(TrackerOp::FetchBlockers, Some(issue_id))?;
        Ok(self.blockers.clone())
    }

    async fn fetch_linked_issues(&self, issue_id: &str) -> Result<Vec<IssueLink>> {
        self.enter(TrackerOp::FetchLinkedIssues, Some(issue_id))?;
        Ok(self.links.clone())
    }

    async fn fetch_watchers(&self, issue_id: &str) -> Result<Vec<User>> {
        self.enter(TrackerOp::FetchWatchers, Some(issue_id))?;
        Ok(self.watchers.clone())
    }

    async fn search_issues(&self, limit: usize) -> Result<Vec<IssueSnapshot>> {
        self.enter(TrackerOp::SearchIssues, None)?;
        Ok(self.issues.iter().take(limit).cloned().collect())
    }
}
