//! Test fixtures for building issues and histories relative to a fixed clock.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::model::{ChangeItem, ChangelogEntry, IssueSnapshot, User};

/// A fixed "now" so fixtures are reproducible.
///
/// # Panics
///
/// Never in practice; the timestamp is a valid constant.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// Builder for an issue plus its changelog, anchored at `now`.
#[derive(Debug, Clone)]
pub struct IssueFixture {
    now: DateTime<Utc>,
    issue: IssueSnapshot,
    changelog: Vec<ChangelogEntry>,
}

impl IssueFixture {
    /// An issue created 30 days ago and updated `updated_hours_ago`.
    #[must_use]
    pub fn new(key: &str, status: &str, updated_hours_ago: i64) -> Self {
        let now = fixed_now();
        Self {
            now,
            issue: IssueSnapshot::new(
                key.trim_start_matches(|c: char| !c.is_ascii_digit()),
                key,
                status,
                now - Duration::days(30),
                now - Duration::hours(updated_hours_ago),
            ),
            changelog: Vec::new(),
        }
    }

    #[must_use]
    pub fn assigned_to(mut self, name: &str) -> Self {
        self.issue.assignee = Some(User::new(name.to_lowercase(), name));
        self
    }

    /// Adds a human status change `hours_ago`.
    #[must_use]
    pub fn status_change(mut self, hours_ago: i64, from: &str, to: &str) -> Self {
        self.changelog.push(ChangelogEntry::new(
            Some(User::new("dana", "Dana")),
            self.now - Duration::hours(hours_ago),
            vec![ChangeItem::new("status", Some(from), Some(to))],
        ));
        self
    }

    /// Adds a bot edit `hours_ago`.
    #[must_use]
    pub fn bot_edit(mut self, hours_ago: i64, field: &str) -> Self {
        self.changelog.push(ChangelogEntry::new(
            Some(User::new("bot", "Automation for Jira").with_account_type("app")),
            self.now - Duration::hours(hours_ago),
            vec![ChangeItem::new(field, None, Some("x"))],
        ));
        self
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    #[must_use]
    pub fn issue(&self) -> &IssueSnapshot {
        &self.issue
    }

    #[must_use]
    pub fn changelog(&self) -> &[ChangelogEntry] {
        &self.changelog
    }
}
