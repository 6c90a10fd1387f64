//! Dashboard aggregation.
//!
//! Reduces per-issue verdicts into population-level metrics. The reducer is
//! pure; fetching and classifying the population is the engine's job.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::IssueSnapshot;
use crate::severity::Severity;
use crate::stall::StallResult;

/// Bucket label for issues nobody owns.
pub const UNASSIGNED_LABEL: &str = "Unassigned";

/// Total/stalled/healthy counts for one status or assignee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub total: usize,
    pub stalled: usize,
    pub healthy: usize,
}

impl Breakdown {
    fn record(&mut self, stalled: bool) {
        self.total += 1;
        if stalled {
            self.stalled += 1;
        } else {
            self.healthy += 1;
        }
    }
}

/// A stalled issue worth calling out on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotableIssue {
    pub key: String,
    pub status: String,
    pub assignee: Option<String>,
    pub severity: Option<Severity>,
    pub hours_since_update: f64,
    pub summary: String,
}

impl NotableIssue {
    fn from_result(issue: &IssueSnapshot, result: &StallResult) -> Self {
        Self {
            key: result.issue_key.clone(),
            status: issue.status.clone(),
            assignee: issue.assignee.as_ref().map(|a| a.display_name.clone()),
            severity: result.severity,
            hours_since_update: result.hours_since_update,
            summary: result.summary.clone(),
        }
    }
}

/// Population-level stall metrics.
///
/// `total_issues == stalled_issues + healthy_issues` always holds; issues
/// whose classification failed are counted in `failed_issues` only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_issues: usize,
    pub stalled_issues: usize,
    pub healthy_issues: usize,
    pub failed_issues: usize,
    pub by_status: BTreeMap<String, Breakdown>,
    pub by_assignee: BTreeMap<String, Breakdown>,
    pub by_severity: BTreeMap<Severity, usize>,
    /// Reason code to number of issues carrying it.
    pub reason_histogram: BTreeMap<String, usize>,
    /// Mean hours since update, over stalled issues only.
    pub average_stall_hours: f64,
    pub longest_stalled: Option<NotableIssue>,
    /// Stalled issues, least time since update first.
    pub recently_stalled: Vec<NotableIssue>,
    pub generated_at: DateTime<Utc>,
}

impl DashboardMetrics {
    /// All-zero metrics, reported when the population could not be listed.
    #[must_use]
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            total_issues: 0,
            stalled_issues: 0,
            healthy_issues: 0,
            failed_issues: 0,
            by_status: BTreeMap::new(),
            by_assignee: BTreeMap::new(),
            by_severity: BTreeMap::new(),
            reason_histogram: BTreeMap::new(),
            average_stall_hours: 0.0,
            longest_stalled: None,
            recently_stalled: Vec::new(),
            generated_at: now,
        }
    }

    #[must_use]
    pub fn stalled_ratio(&self) -> f64 {
        if self.total_issues == 0 {
            0.0
        } else {
            self.stalled_issues as f64 / self.total_issues as f64
        }
    }

    /// Most frequent reason code; ties go to the alphabetically first.
    #[must_use]
    pub fn top_reason(&self) -> Option<(&str, usize)> {
        self.reason_histogram
            .iter()
            .fold(None, |best: Option<(&str, usize)>, (code, &count)| match best {
                Some((_, top)) if top >= count => best,
                _ => Some((code.as_str(), count)),
            })
    }
}

/// Incremental reducer over classified issues.
#[derive(Debug, Clone)]
pub struct DashboardAggregator {
    metrics: DashboardMetrics,
    notable: Vec<NotableIssue>,
    stall_hours_total: f64,
    notable_limit: usize,
}

impl DashboardAggregator {
    #[must_use]
    pub fn new(notable_limit: usize, now: DateTime<Utc>) -> Self {
        Self {
            metrics: DashboardMetrics::empty(now),
            notable: Vec::new(),
            stall_hours_total: 0.0,
            notable_limit,
        }
    }

    /// Folds one successful classification into the metrics.
    pub fn record(&mut self, issue: &IssueSnapshot, result: &StallResult) {
        let m = &mut self.metrics;
        let stalled = result.is_stalled;

        m.total_issues += 1;
        m.by_status
            .entry(issue.status.clone())
            .or_default()
            .record(stalled);
        let assignee = issue
            .assignee
            .as_ref()
            .map(|a| a.display_name.clone())
            .unwrap_or_else(|| UNASSIGNED_LABEL.to_string());
        m.by_assignee.entry(assignee).or_default().record(stalled);

        if !stalled {
            m.healthy_issues += 1;
            return;
        }

        m.stalled_issues += 1;
        if let Some(severity) = result.severity {
            *m.by_severity.entry(severity).or_insert(0) += 1;
        }
        for reason in &result.reasons {
            *m.reason_histogram
                .entry(reason.code().to_string())
                .or_insert(0) += 1;
        }
        self.stall_hours_total += result.hours_since_update;

        let notable = NotableIssue::from_result(issue, result);
        let longer = m
            .longest_stalled
            .as_ref()
            .map(|l| notable.hours_since_update > l.hours_since_update)
            .unwrap_or(true);
        if longer {
            m.longest_stalled = Some(notable.clone());
        }
        self.notable.push(notable);
    }

    /// Counts an issue whose classification failed.
    pub fn record_failure(&mut self) {
        self.metrics.failed_issues += 1;
    }

    #[must_use]
    pub fn finish(mut self) -> DashboardMetrics {
        let mut m = self.metrics;
        if m.stalled_issues > 0 {
            m.average_stall_hours = self.stall_hours_total / m.stalled_issues as f64;
        }
        // Stable sort keeps population order among equal durations.
        self.notable
            .sort_by(|a, b| a.hours_since_update.total_cmp(&b.hours_since_update));
        self.notable.truncate(self.notable_limit);
        m.recently_stalled = self.notable;
        m
    }
}

/// Aggregates already-classified issues in one call.
#[must_use]
pub fn aggregate_results<'a, I>(
    results: I,
    notable_limit: usize,
    now: DateTime<Utc>,
) -> DashboardMetrics
where
    I: IntoIterator<Item = (&'a IssueSnapshot, &'a StallResult)>,
{
    let mut aggregator = DashboardAggregator::new(notable_limit, now);
    for (issue, result) in results {
        aggregator.record(issue, result);
    }
    aggregator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::User;
    use crate::stall::{ReasonKind, StallReason};

    fn issue(key: &str, status: &str, assignee: Option<&str>) -> IssueSnapshot {
        let now = Utc::now();
        let issue = IssueSnapshot::new(key, key, status, now, now);
        match assignee {
            Some(name) => issue.with_assignee(User::new(name, name)),
            None => issue,
        }
    }

    fn stalled(key: &str, severity: Severity, hours: f64) -> StallResult {
        StallResult::from_reasons(
            key,
            vec![StallReason::new(
                ReasonKind::StatusBlocked,
                severity,
                "Issue is in Blocked status",
            )],
            None,
            hours,
        )
    }

    fn healthy(key: &str) -> StallResult {
        StallResult::from_reasons(key, Vec::new(), None, 1.0)
    }

    #[test]
    fn test_counts_and_breakdowns() {
        let a = issue("A-1", "Blocked", Some("Dana"));
        let b = issue("A-2", "In Progress", Some("Dana"));
        let c = issue("A-3", "In Progress", None);
        let ra = stalled("A-1", Severity::Critical, 30.0);
        let rb = healthy("A-2");
        let rc = stalled("A-3", Severity::High, 90.0);

        let m = aggregate_results([(&a, &ra), (&b, &rb), (&c, &rc)], 10, Utc::now());
        assert_eq!(m.total_issues, 3);
        assert_eq!(m.stalled_issues, 2);
        assert_eq!(m.healthy_issues, 1);
        assert_eq!(m.total_issues, m.stalled_issues + m.healthy_issues);

        assert_eq!(
            m.by_status["In Progress"],
            Breakdown {
                total: 2,
                stalled: 1,
                healthy: 1
            }
        );
        assert_eq!(m.by_assignee["Dana"].total, 2);
        assert_eq!(m.by_assignee[UNASSIGNED_LABEL].stalled, 1);
        assert_eq!(m.by_severity[&Severity::Critical], 1);
        assert_eq!(m.reason_histogram["STATUS_BLOCKED"], 2);
        assert!((m.average_stall_hours - 60.0).abs() < f64::EPSILON);
        assert_eq!(m.longest_stalled.as_ref().unwrap().key, "A-3");
    }

    #[test]
    fn test_recently_stalled_ascending_and_capped() {
        let issues: Vec<IssueSnapshot> = (0..4)
            .map(|i| issue(&format!("A-{}", i), "Blocked", None))
            .collect();
        let results = [
            stalled("A-0", Severity::Critical, 80.0),
            stalled("A-1", Severity::Critical, 20.0),
            stalled("A-2", Severity::Critical, 50.0),
            stalled("A-3", Severity::Critical, 10.0),
        ];
        let m = aggregate_results(issues.iter().zip(results.iter()), 3, Utc::now());
        let keys: Vec<&str> = m.recently_stalled.iter().map(|n| n.key.as_str()).collect();
        assert_eq!(keys, vec!["A-3", "A-1", "A-2"]);
        assert_eq!(m.longest_stalled.unwrap().key, "A-0");
    }

    #[test]
    fn test_failures_excluded_from_invariant() {
        let a = issue("A-1", "To Do", None);
        let mut aggregator = DashboardAggregator::new(10, Utc::now());
        aggregator.record(&a, &healthy("A-1"));
        aggregator.record_failure();
        let m = aggregator.finish();
        assert_eq!(m.total_issues, 1);
        assert_eq!(m.failed_issues, 1);
        assert_eq!(m.total_issues, m.stalled_issues + m.healthy_issues);
        assert_eq!(m.average_stall_hours, 0.0);
    }

    #[test]
    fn test_empty_metrics_are_zero() {
        let m = DashboardMetrics::empty(Utc::now());
        assert_eq!(m.total_issues, 0);
        assert_eq!(m.stalled_ratio(), 0.0);
        assert!(m.top_reason().is_none());
        assert!(m.recently_stalled.is_empty());
    }

    #[test]
    fn test_top_reason_prefers_count_then_name() {
        let mut m = DashboardMetrics::empty(Utc::now());
        m.reason_histogram.insert("NO_ACTIVITY".to_string(), 3);
        m.reason_histogram.insert("HAS_BLOCKERS".to_string(), 3);
        m.reason_histogram.insert("NO_COMMENTS".to_string(), 1);
        assert_eq!(m.top_reason(), Some(("HAS_BLOCKERS", 3)));
    }

    #[test]
    fn test_metrics_serialize_camel_case() {
        let json = serde_json::to_value(DashboardMetrics::empty(Utc::now())).unwrap();
        assert!(json.get("totalIssues").is_some());
        assert!(json.get("recentlyStalled").is_some());
    }
}
