//! Tracker data as seen by the engine.
//!
//! These types are read-only inputs: the caller owns them, the engine only
//! borrows them for the duration of a call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StallError};

/// A tracker account (assignee, reporter, watcher, changelog author).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub account_id: String,
    pub display_name: String,
    /// Tracker account type, e.g. `atlassian`, `app`, `system`.
    #[serde(default)]
    pub account_type: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl User {
    /// Create an active human account.
    #[must_use]
    pub fn new(account_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            display_name: display_name.into(),
            account_type: None,
            active: true,
        }
    }

    /// Set the account type.
    #[must_use]
    pub fn with_account_type(mut self, account_type: impl Into<String>) -> Self {
        self.account_type = Some(account_type.into());
        self
    }

    /// Mark the account as deactivated.
    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// An edge from this issue to another issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueLink {
    /// Key of the other issue.
    pub key: String,
    /// Relation label as the tracker renders it, e.g. `is blocked by`.
    pub relation: String,
    /// Current status of the other issue, when known.
    #[serde(default)]
    pub status: Option<String>,
}

impl IssueLink {
    #[must_use]
    pub fn new(key: impl Into<String>, relation: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            relation: relation.into(),
            status: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// True for `blocks` / `is blocked by` edges in either direction.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        let relation = self.relation.to_lowercase();
        relation == "blocks" || relation == "is blocked by" || relation == "blocked by"
    }

    /// True for edges this issue has to wait on.
    #[must_use]
    pub fn is_dependency(&self) -> bool {
        let relation = self.relation.to_lowercase();
        relation.contains("depend") || relation.contains("blocked by")
    }
}

/// Point-in-time view of one issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueSnapshot {
    pub id: String,
    pub key: String,
    pub status: String,
    #[serde(default)]
    pub assignee: Option<User>,
    #[serde(default)]
    pub reporter: Option<User>,
    #[serde(default)]
    pub priority: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    #[serde(default)]
    pub links: Vec<IssueLink>,
}

impl IssueSnapshot {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        key: impl Into<String>,
        status: impl Into<String>,
        created: DateTime<Utc>,
        updated: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            status: status.into(),
            assignee: None,
            reporter: None,
            priority: None,
            created,
            updated,
            links: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_assignee(mut self, assignee: User) -> Self {
        self.assignee = Some(assignee);
        self
    }

    #[must_use]
    pub fn with_reporter(mut self, reporter: User) -> Self {
        self.reporter = Some(reporter);
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    #[must_use]
    pub fn with_link(mut self, link: IssueLink) -> Self {
        self.links.push(link);
        self
    }

    /// Checks the fields the engine cannot work without.
    ///
    /// # Errors
    ///
    /// Returns [`StallError::MalformedIssue`] when `id` or `status` is empty.
    pub fn validate(&self) -> Result<()> {
        let label = if self.key.is_empty() {
            self.id.as_str()
        } else {
            self.key.as_str()
        };
        if self.id.trim().is_empty() {
            return Err(StallError::malformed(label, "id"));
        }
        if self.status.trim().is_empty() {
            return Err(StallError::malformed(label, "status"));
        }
        Ok(())
    }

    /// Keys of all blocking edges recorded on the snapshot itself.
    #[must_use]
    pub fn blocker_keys(&self) -> Vec<String> {
        self.links
            .iter()
            .filter(|l| l.is_blocking())
            .map(|l| l.key.clone())
            .collect()
    }

    /// Whether the current status matches `name`, ignoring case.
    #[must_use]
    pub fn status_is(&self, name: &str) -> bool {
        self.status.eq_ignore_ascii_case(name)
    }
}

/// One field transition inside a changelog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeItem {
    pub field: String,
    #[serde(default)]
    pub field_type: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

impl ChangeItem {
    #[must_use]
    pub fn new(field: impl Into<String>, from: Option<&str>, to: Option<&str>) -> Self {
        Self {
            field: field.into(),
            field_type: Some("jira".to_string()),
            from: from.map(str::to_string),
            to: to.map(str::to_string),
        }
    }
}

/// A batch of simultaneous field edits by one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogEntry {
    #[serde(default)]
    pub author: Option<User>,
    pub created: DateTime<Utc>,
    pub items: Vec<ChangeItem>,
}

impl ChangelogEntry {
    #[must_use]
    pub fn new(author: Option<User>, created: DateTime<Utc>, items: Vec<ChangeItem>) -> Self {
        Self {
            author,
            created,
            items,
        }
    }
}

/// The most recent comment written by a human.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanComment {
    pub created: DateTime<Utc>,
    pub author_name: String,
}

/// Hours elapsed from `earlier` to `later`, fractional, never negative.
#[must_use]
pub fn hours_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    let seconds = (later - earlier).num_seconds();
    (seconds.max(0) as f64) / 3600.0
}
