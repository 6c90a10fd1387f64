//! Issue tracker collaborator interface.
//!
//! Everything the engine knows about the outside world comes through
//! [`IssueTracker`]. Each call may fail independently; the engine turns a
//! failure into a logged degradation of the detector that needed it.

pub mod json;

pub use json::{IssueRecord, JsonTracker, TrackerDump};

use anyhow::Result;
use async_trait::async_trait;

use crate::model::{ChangelogEntry, HumanComment, IssueLink, IssueSnapshot, User};

/// Abstraction over the issue tracker.
///
/// # Example
///
/// ```rust,ignore
/// use stallwatch::tracker::IssueTracker;
///
/// async fn blocker_count(tracker: &impl IssueTracker, id: &str) -> usize {
///     tracker.fetch_blockers(id).await.map(|b| b.len()).unwrap_or(0)
/// }
/// ```
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Change history, most recent entry first.
    ///
    /// # Errors
    ///
    /// Returns an error if the tracker cannot be reached or the issue is unknown.
    async fn fetch_changelog(&self, issue_id: &str) -> Result<Vec<ChangelogEntry>>;

    /// Latest comment written by a human, if any.
    async fn fetch_last_human_comment(&self, issue_id: &str) -> Result<Option<HumanComment>>;

    /// Keys of issues blocking this one.
    async fn fetch_blockers(&self, issue_id: &str) -> Result<Vec<String>>;

    /// All linked issues with their relation label and current status.
    async fn fetch_linked_issues(&self, issue_id: &str) -> Result<Vec<IssueLink>>;

    async fn fetch_watchers(&self, issue_id: &str) -> Result<Vec<User>>;

    /// Up to `limit` open issues, least recently updated first.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing call fails.
    async fn search_issues(&self, limit: usize) -> Result<Vec<IssueSnapshot>>;
}
