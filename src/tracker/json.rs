//! File-backed tracker over a JSON export.
//!
//! The export is a single document:
//!
//! ```json
//! {
//!   "issues": [
//!     {
//!       "id": "10001", "key": "PROJ-1", "status": "In Progress",
//!       "created": "2024-05-01T09:00:00Z", "updated": "2024-05-03T09:00:00Z",
//!       "assignee": { "accountId": "u1", "displayName": "Dana" },
//!       "links": [ { "key": "PROJ-2", "relation": "is blocked by", "status": "To Do" } ],
//!       "changelog": [],
//!       "lastHumanComment": { "created": "2024-05-02T10:00:00Z", "authorName": "Dana" },
//!       "watchers": []
//!     }
//!   ]
//! }
//! ```

use std::path::Path;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::IssueTracker;
use crate::config::Settings;
use crate::error::{Result, StallError};
use crate::model::{ChangelogEntry, HumanComment, IssueLink, IssueSnapshot, User};

/// One issue plus everything the tracker would return about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRecord {
    #[serde(flatten)]
    pub snapshot: IssueSnapshot,
    #[serde(default)]
    pub changelog: Vec<ChangelogEntry>,
    #[serde(default)]
    pub last_human_comment: Option<HumanComment>,
    #[serde(default)]
    pub watchers: Vec<User>,
}

impl IssueRecord {
    #[must_use]
    pub fn new(snapshot: IssueSnapshot) -> Self {
        Self {
            snapshot,
            changelog: Vec::new(),
            last_human_comment: None,
            watchers: Vec::new(),
        }
    }
}

/// Top-level export document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerDump {
    #[serde(default)]
    pub issues: Vec<IssueRecord>,
}

/// [`IssueTracker`] answering from an in-memory export.
///
/// Issues in a terminal status are never listed by `search_issues`.
#[derive(Debug, Clone)]
pub struct JsonTracker {
    records: Vec<IssueRecord>,
    terminal_statuses: Vec<String>,
}

impl Default for JsonTracker {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl JsonTracker {
    #[must_use]
    pub fn new(records: Vec<IssueRecord>) -> Self {
        Self {
            records,
            terminal_statuses: Settings::default().terminal_statuses,
        }
    }

    /// Replaces the statuses treated as closed when listing.
    #[must_use]
    pub fn with_terminal_statuses(mut self, statuses: Vec<String>) -> Self {
        self.terminal_statuses = statuses;
        self
    }

    fn is_open(&self, snapshot: &IssueSnapshot) -> bool {
        !self
            .terminal_statuses
            .iter()
            .any(|s| s.eq_ignore_ascii_case(&snapshot.status))
    }

    /// Parses an export document.
    ///
    /// # Errors
    ///
    /// Returns [`StallError::Json`] if the document does not parse.
    pub fn from_json(content: &str) -> Result<Self> {
        let dump: TrackerDump = serde_json::from_str(content)?;
        Ok(Self::new(dump.issues))
    }

    /// Reads and parses an export file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            StallError::config_with_path(
                format!("Failed to read tracker data: {}", e),
                path.to_path_buf(),
            )
        })?;
        let tracker = Self::from_json(&content)?;
        debug!(
            path = %path.display(),
            issues = tracker.records.len(),
            "Loaded tracker export"
        );
        Ok(tracker)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks an issue up by key or id.
    #[must_use]
    pub fn find(&self, key_or_id: &str) -> Option<&IssueSnapshot> {
        self.record(key_or_id).map(|r| &r.snapshot)
    }

    fn record(&self, key_or_id: &str) -> Option<&IssueRecord> {
        self.records
            .iter()
            .find(|r| r.snapshot.id == key_or_id || r.snapshot.key == key_or_id)
    }

    fn require(&self, issue_id: &str) -> AnyResult<&IssueRecord> {
        self.record(issue_id).ok_or_else(|| {
            StallError::IssueNotFound {
                key: issue_id.to_string(),
            }
            .into()
        })
    }
}

#[async_trait]
impl IssueTracker for JsonTracker {
    async fn fetch_changelog(&self, issue_id: &str) -> AnyResult<Vec<ChangelogEntry>> {
        let mut entries = self.require(issue_id)?.changelog.clone();
        entries.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(entries)
    }

    async fn fetch_last_human_comment(&self, issue_id: &str) -> AnyResult<Option<HumanComment>> {
        Ok(self.require(issue_id)?.last_human_comment.clone())
    }

    async fn fetch_blockers(&self, issue_id: &str) -> AnyResult<Vec<String>> {
        Ok(self.require(issue_id)?.snapshot.blocker_keys())
    }

    async fn fetch_linked_issues(&self, issue_id: &str) -> AnyResult<Vec<IssueLink>> {
        Ok(self.require(issue_id)?.snapshot.links.clone())
    }

    async fn fetch_watchers(&self, issue_id: &str) -> AnyResult<Vec<User>> {
        Ok(self.require(issue_id)?.watchers.clone())
    }

    async fn search_issues(&self, limit: usize) -> AnyResult<Vec<IssueSnapshot>> {
        let mut issues: Vec<IssueSnapshot> = self
            .records
            .iter()
            .map(|r| &r.snapshot)
            .filter(|snapshot| self.is_open(snapshot))
            .cloned()
            .collect();
        issues.sort_by(|a, b| a.updated.cmp(&b.updated));
        issues.truncate(limit);
        Ok(issues)
    }
}
