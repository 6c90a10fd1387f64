//! Orchestration over an [`IssueTracker`].
//!
//! `StallEngine` is the outward face of the crate. It gathers collaborator
//! data, hands it to the pure analyzers, and absorbs collaborator failures:
//! a failed fetch is logged and the detector that needed it does not fire.
//!
//! # Example
//!
//! ```rust,ignore
//! use stallwatch::{StallConfig, StallEngine};
//! use stallwatch::tracker::JsonTracker;
//!
//! let engine = StallEngine::new(JsonTracker::load("issues.json")?, StallConfig::default());
//! let metrics = engine.aggregate().await;
//! println!("{} of {} stalled", metrics.stalled_issues, metrics.total_issues);
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::advisor::{ContextAdvisor, RelatedContext, Suggestion};
use crate::changelog::{ChangelogAnalysis, ChangelogAnalyzer};
use crate::config::StallConfig;
use crate::dashboard::{DashboardAggregator, DashboardMetrics};
use crate::error::{IntoStallError, Result};
use crate::model::IssueSnapshot;
use crate::stall::{DetectorInputs, Fetched, StallClassifier, StallResult};
use crate::tracker::IssueTracker;

/// Turns a collaborator result into [`Fetched`], logging the failure.
fn degrade<V>(issue: &str, operation: &str, result: anyhow::Result<V>) -> Fetched<V> {
    match result {
        Ok(value) => Fetched::Available(value),
        Err(e) => {
            warn!(
                issue = %issue,
                operation = operation,
                error = %e,
                "Collaborator call failed, detector degraded"
            );
            Fetched::Unavailable
        }
    }
}

/// Stall engine bound to one tracker and one configuration.
pub struct StallEngine<T: IssueTracker> {
    tracker: T,
    config: StallConfig,
    analyzer: ChangelogAnalyzer,
    classifier: StallClassifier,
    advisor: ContextAdvisor,
}

impl<T: IssueTracker> StallEngine<T> {
    #[must_use]
    pub fn new(tracker: T, config: StallConfig) -> Self {
        Self {
            classifier: StallClassifier::new(&config),
            advisor: ContextAdvisor::new(&config),
            analyzer: ChangelogAnalyzer::new(),
            tracker,
            config,
        }
    }

    #[must_use]
    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    #[must_use]
    pub fn config(&self) -> &StallConfig {
        &self.config
    }

    /// Fetches and analyzes one issue's changelog.
    ///
    /// # Errors
    ///
    /// Returns [`StallError::Collaborator`](crate::StallError::Collaborator)
    /// if the changelog cannot be fetched.
    pub async fn analyze_changelog(&self, issue_id: &str) -> Result<ChangelogAnalysis> {
        self.analyze_changelog_at(issue_id, Utc::now()).await
    }

    /// [`Self::analyze_changelog`] with an explicit clock.
    pub async fn analyze_changelog_at(
        &self,
        issue_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ChangelogAnalysis> {
        let entries = self
            .tracker
            .fetch_changelog(issue_id)
            .await
            .into_stall_collaborator("fetch_changelog")?;
        Ok(self.analyzer.analyze(&entries, now))
    }

    /// Classifies one issue, attaching suggestions when enabled.
    ///
    /// # Errors
    ///
    /// Returns [`StallError::MalformedIssue`](crate::StallError::MalformedIssue)
    /// if the snapshot lacks an id or status. Collaborator failures never
    /// surface here.
    pub async fn classify(&self, issue: &IssueSnapshot) -> Result<StallResult> {
        self.classify_at(issue, Utc::now()).await
    }

    /// [`Self::classify`] with an explicit clock.
    pub async fn classify_at(
        &self,
        issue: &IssueSnapshot,
        now: DateTime<Utc>,
    ) -> Result<StallResult> {
        let mut result = self.evaluate(issue, now).await?;
        if self.config.settings.features.contextual_suggestions {
            result.suggestions = self.suggest(issue, &result).await;
        }
        Ok(result)
    }

    /// Ranked suggestions for an already-classified issue.
    pub async fn suggest(&self, issue: &IssueSnapshot, result: &StallResult) -> Vec<Suggestion> {
        if !result.is_stalled {
            return Vec::new();
        }
        let watchers = degrade(
            &issue.key,
            "fetch_watchers",
            self.tracker.fetch_watchers(&issue.id).await,
        );
        let links = degrade(
            &issue.key,
            "fetch_linked_issues",
            self.tracker.fetch_linked_issues(&issue.id).await,
        );
        let related = RelatedContext {
            watchers: watchers.as_available().cloned().unwrap_or_default(),
            linked_issues: links.as_available().cloned().unwrap_or_default(),
        };
        self.advisor
            .advise(issue, result, result.analysis.as_ref(), &related)
    }

    /// Lists up to `maxIssuesPerRun` open issues from the tracker.
    ///
    /// Anything the tracker returns in a terminal status is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StallError::Collaborator`] if the listing call fails.
    pub async fn open_issues(&self) -> Result<Vec<IssueSnapshot>> {
        let settings = &self.config.settings;
        let mut issues = self
            .tracker
            .search_issues(settings.max_issues_per_run)
            .await
            .into_stall_collaborator("search_issues")?;
        let listed = issues.len();
        issues.retain(|issue| !settings.is_terminal(&issue.status));
        if issues.len() < listed {
            debug!(
                dropped = listed - issues.len(),
                "Ignoring closed issues returned by search"
            );
        }
        Ok(issues)
    }

    /// Classifies each issue in order, skipping the ones that fail.
    ///
    /// A failing issue is logged and left out of the returned results.
    pub async fn classify_all_at(
        &self,
        issues: &[IssueSnapshot],
        now: DateTime<Utc>,
    ) -> Vec<StallResult> {
        let mut results = Vec::with_capacity(issues.len());
        for issue in issues {
            match self.classify_at(issue, now).await {
                Ok(result) => results.push(result),
                Err(e) => warn!(issue = %issue.key, error = %e, "Skipping issue"),
            }
        }
        results
    }

    /// Lists up to `maxIssuesPerRun` issues and aggregates their verdicts.
    ///
    /// A failed listing yields all-zero metrics rather than an error.
    pub async fn aggregate(&self) -> DashboardMetrics {
        self.aggregate_at(Utc::now()).await
    }

    pub async fn aggregate_at(&self, now: DateTime<Utc>) -> DashboardMetrics {
        match self.open_issues().await {
            Ok(issues) => self.aggregate_population(&issues, now).await,
            Err(e) => {
                warn!(error = %e, "Issue search failed, reporting empty dashboard");
                DashboardMetrics::empty(now)
            }
        }
    }

    /// Aggregates a caller-supplied population, in the order given.
    ///
    /// Issues are processed one at a time with `interIssueDelayMs` between
    /// them. An issue that fails to classify is counted in `failed_issues`
    /// and the run continues.
    pub async fn aggregate_population(
        &self,
        issues: &[IssueSnapshot],
        now: DateTime<Utc>,
    ) -> DashboardMetrics {
        let settings = &self.config.settings;
        let delay = Duration::from_millis(settings.inter_issue_delay_ms);
        let mut aggregator = DashboardAggregator::new(settings.notable_limit, now);

        for (index, issue) in issues.iter().enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            match self.evaluate(issue, now).await {
                Ok(result) => aggregator.record(issue, &result),
                Err(e) => {
                    warn!(issue = %issue.key, error = %e, "Skipping issue in dashboard run");
                    aggregator.record_failure();
                }
            }
        }

        let metrics = aggregator.finish();
        info!(
            total = metrics.total_issues,
            stalled = metrics.stalled_issues,
            failed = metrics.failed_issues,
            "Dashboard aggregation complete"
        );
        metrics
    }

    /// Gathers detector inputs and runs the classifier, without suggestions.
    async fn evaluate(&self, issue: &IssueSnapshot, now: DateTime<Utc>) -> Result<StallResult> {
        issue.validate()?;
        let features = &self.config.settings.features;

        let analysis = if features.changelog_analysis || features.pattern_detection {
            let fetched = degrade(
                &issue.key,
                "fetch_changelog",
                self.tracker.fetch_changelog(&issue.id).await,
            );
            match fetched {
                Fetched::Available(entries) => {
                    let analysis = self.analyzer.analyze(&entries, now);
                    if features.pattern_detection {
                        Some(analysis)
                    } else {
                        Some(analysis.without_patterns())
                    }
                }
                Fetched::Unavailable => None,
            }
        } else {
            None
        };

        let last_human_comment = if features.comment_checks {
            degrade(
                &issue.key,
                "fetch_last_human_comment",
                self.tracker.fetch_last_human_comment(&issue.id).await,
            )
        } else {
            Fetched::Unavailable
        };

        let blockers = if features.blocker_checks {
            degrade(
                &issue.key,
                "fetch_blockers",
                self.tracker.fetch_blockers(&issue.id).await,
            )
        } else {
            Fetched::Unavailable
        };

        debug!(issue = %issue.key, status = %issue.status, "Evaluating issue");
        let inputs = DetectorInputs {
            analysis,
            last_human_comment,
            blockers,
        };
        Ok(self.classifier.evaluate(issue, inputs, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StallError;
    use crate::model::{ChangeItem, ChangelogEntry, HumanComment, User};
    use crate::severity::Severity;
    use crate::testing::{
        assert_has_reason, assert_healthy, assert_lacks_reason, assert_stalled, IssueFixture,
        MockTracker, TrackerOp,
    };
    use crate::SuggestionKind;
    use chrono::Duration as ChronoDuration;

    fn no_delay() -> StallConfig {
        let mut config = StallConfig::default();
        config.settings.inter_issue_delay_ms = 0;
        config
    }

    fn comment(now: DateTime<Utc>) -> HumanComment {
        HumanComment {
            created: now - ChronoDuration::hours(1),
            author_name: "Dana".to_string(),
        }
    }

    #[tokio::test]
    async fn test_classify_attaches_suggestions() {
        let now = Utc::now();
        let issue = IssueSnapshot::new("1", "PROJ-1", "In Review", now, now);
        let tracker = MockTracker::new().with_last_comment(comment(now));
        let engine = StallEngine::new(tracker, no_delay());

        let result = engine.classify_at(&issue, now).await.unwrap();
        assert_has_reason(&result, "UNASSIGNED_ACTIVE");
        assert!(!result.suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_suggestions_toggle_off() {
        let now = Utc::now();
        let issue = IssueSnapshot::new("1", "PROJ-1", "In Review", now, now);
        let mut config = no_delay();
        config.settings.features.contextual_suggestions = false;
        let engine = StallEngine::new(MockTracker::new(), config);

        let result = engine.classify_at(&issue, now).await.unwrap();
        assert!(result.is_stalled);
        assert!(result.suggestions.is_empty());
        assert_eq!(engine.tracker().calls(TrackerOp::FetchWatchers), 0);
    }

    #[tokio::test]
    async fn test_comment_failure_degrades_only_that_detector() {
        let now = Utc::now();
        let issue = IssueSnapshot::new("1", "PROJ-1", "Blocked", now - ChronoDuration::days(5), now);
        let tracker = MockTracker::new()
            .failing(TrackerOp::FetchLastHumanComment)
            .with_blockers(vec!["PROJ-2".to_string()]);
        let engine = StallEngine::new(tracker, no_delay());

        let result = engine.classify_at(&issue, now).await.unwrap();
        assert!(!result.has_reason("NO_COMMENTS"));
        assert_has_reason(&result, "HAS_BLOCKERS");
        assert_has_reason(&result, "STATUS_BLOCKED");
    }

    #[tokio::test]
    async fn test_changelog_drives_effective_activity() {
        let now = Utc::now();
        let issue = IssueSnapshot::new("1", "PROJ-1", "In Progress", now, now)
            .with_assignee(User::new("u1", "Dana"));
        let entries = vec![ChangelogEntry::new(
            Some(User::new("u1", "Dana")),
            now - ChronoDuration::hours(60),
            vec![ChangeItem::new("description", None, None)],
        )];
        let tracker = MockTracker::new()
            .with_changelog(entries)
            .with_last_comment(comment(now));
        let engine = StallEngine::new(tracker, no_delay());

        let result = engine.classify_at(&issue, now).await.unwrap();
        assert_has_reason(&result, "NO_ACTIVITY");
        assert_has_reason(&result, "ASSIGNED_NOT_PROGRESSING");
    }

    #[tokio::test]
    async fn test_bot_edits_do_not_count_as_activity() {
        let fixture = IssueFixture::new("PROJ-12", "In Progress", 1)
            .assigned_to("Dana")
            .status_change(100, "To Do", "In Progress")
            .bot_edit(1, "labels");
        let now = fixture.now();
        let tracker = MockTracker::new()
            .with_changelog(fixture.changelog().to_vec())
            .with_last_comment(comment(now));
        let engine = StallEngine::new(tracker, no_delay());

        let result = engine.classify_at(fixture.issue(), now).await.unwrap();
        assert_stalled(&result, Severity::High);
        assert_has_reason(&result, "ASSIGNED_NOT_PROGRESSING");
        let analysis = result.analysis.as_ref().unwrap();
        assert_eq!(analysis.noise_changes, 1);
        assert_eq!(analysis.meaningful_changes, 1);
    }

    #[tokio::test]
    async fn test_pattern_toggle_off_hides_patterns_from_result_and_advice() {
        let fixture = IssueFixture::new("PROJ-20", "In Review", 100)
            .assigned_to("Dana")
            .status_change(100, "Reopened", "In Review")
            .status_change(120, "Done", "Reopened")
            .status_change(140, "Reopened", "Done")
            .status_change(160, "Done", "Reopened")
            .status_change(180, "In Review", "Done");
        let now = fixture.now();
        let tracker = MockTracker::new()
            .with_changelog(fixture.changelog().to_vec())
            .with_last_comment(comment(now));

        let engine = StallEngine::new(tracker.clone(), no_delay());
        let result = engine.classify_at(fixture.issue(), now).await.unwrap();
        assert_has_reason(&result, "MULTIPLE_REOPENS");

        let mut config = no_delay();
        config.settings.features.pattern_detection = false;
        let engine = StallEngine::new(tracker, config);
        let result = engine.classify_at(fixture.issue(), now).await.unwrap();
        assert_has_reason(&result, "NO_ACTIVITY");
        assert_lacks_reason(&result, "MULTIPLE_REOPENS");
        let analysis = result.analysis.as_ref().unwrap();
        assert!(analysis.patterns.is_empty());
        assert!(!analysis.is_thrashing);
        for kind in [
            SuggestionKind::RootCause,
            SuggestionKind::ClarifyWorkflow,
            SuggestionKind::ReassessStatus,
            SuggestionKind::SyncDirection,
        ] {
            assert!(result.suggestions.iter().all(|s| s.kind != kind));
        }
    }

    #[tokio::test]
    async fn test_malformed_issue_fails_fast() {
        let now = Utc::now();
        let issue = IssueSnapshot::new("1", "PROJ-1", "", now, now);
        let engine = StallEngine::new(MockTracker::new(), no_delay());
        let err = engine.classify_at(&issue, now).await.unwrap_err();
        assert!(matches!(err, StallError::MalformedIssue { .. }));
        assert_eq!(engine.tracker().total_calls(), 0);
    }

    #[tokio::test]
    async fn test_analyze_changelog_propagates_failure() {
        let engine = StallEngine::new(
            MockTracker::new().failing(TrackerOp::FetchChangelog),
            no_delay(),
        );
        let err = engine.analyze_changelog("1").await.unwrap_err();
        assert!(matches!(err, StallError::Collaborator { .. }));
    }

    #[tokio::test]
    async fn test_aggregate_search_failure_is_empty() {
        let engine = StallEngine::new(MockTracker::new().failing(TrackerOp::SearchIssues), no_delay());
        let metrics = engine.aggregate().await;
        assert_eq!(metrics.total_issues, 0);
        assert_eq!(metrics.failed_issues, 0);
    }

    #[tokio::test]
    async fn test_aggregate_ignores_closed_issues() {
        let now = Utc::now();
        let issues = vec![
            IssueSnapshot::new(
                "1",
                "PROJ-1",
                "Done",
                now - ChronoDuration::days(40),
                now - ChronoDuration::days(30),
            ),
            IssueSnapshot::new("2", "PROJ-2", "To Do", now, now),
        ];
        let tracker = MockTracker::new()
            .with_issues(issues)
            .with_last_comment(comment(now));
        let engine = StallEngine::new(tracker, no_delay());

        let open = engine.open_issues().await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].key, "PROJ-2");

        let metrics = engine.aggregate_at(now).await;
        assert_eq!(metrics.total_issues, 1);
        assert_eq!(metrics.stalled_issues, 0);
        assert!(metrics.reason_histogram.is_empty());
    }

    #[tokio::test]
    async fn test_classify_all_continues_past_malformed() {
        let now = Utc::now();
        let issues = vec![
            IssueSnapshot::new("1", "PROJ-1", "", now, now),
            IssueSnapshot::new("2", "PROJ-2", "Blocked", now, now),
        ];
        let tracker = MockTracker::new().with_last_comment(comment(now));
        let engine = StallEngine::new(tracker, no_delay());

        let results = engine.classify_all_at(&issues, now).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].issue_key, "PROJ-2");
        assert_has_reason(&results[0], "STATUS_BLOCKED");
    }

    #[tokio::test]
    async fn test_aggregate_skips_malformed_items() {
        let now = Utc::now();
        let issues = vec![
            IssueSnapshot::new("1", "PROJ-1", "To Do", now, now),
            IssueSnapshot::new("", "PROJ-2", "To Do", now, now),
            IssueSnapshot::new("3", "PROJ-3", "Blocked", now, now),
        ];
        let tracker = MockTracker::new().with_last_comment(comment(now));
        let engine = StallEngine::new(tracker, no_delay());

        let metrics = engine.aggregate_population(&issues, now).await;
        assert_eq!(metrics.total_issues, 2);
        assert_eq!(metrics.failed_issues, 1);
        assert_eq!(metrics.stalled_issues, 1);
        assert_eq!(
            metrics.total_issues,
            metrics.stalled_issues + metrics.healthy_issues
        );
        assert_healthy(&engine.classify_at(&issues[0], now).await.unwrap());
    }
}
