//! End-to-end engine tests through the public API.

use chrono::{DateTime, Duration, TimeZone, Utc};

use stallwatch::notify::{decide_notification, format_stall_message, StandardPhrasing};
use stallwatch::testing::{
    assert_has_reason, assert_has_suggestion, assert_healthy, assert_lacks_reason,
    assert_stalled, assert_suggestions_ranked, MockTracker, TrackerOp,
};
use stallwatch::tracker::{IssueRecord, JsonTracker};
use stallwatch::{
    ChangeItem, ChangelogEntry, HumanComment, IssueLink, IssueSnapshot, Severity, StallConfig,
    StallEngine, SuggestionKind, User,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap()
}

fn config() -> StallConfig {
    let mut config = StallConfig::default();
    config.settings.inter_issue_delay_ms = 0;
    config
}

fn recent_comment() -> HumanComment {
    HumanComment {
        created: now() - Duration::hours(2),
        author_name: "Rita".to_string(),
    }
}

fn status_change(hours_ago: i64, from: &str, to: &str) -> ChangelogEntry {
    ChangelogEntry::new(
        Some(User::new("dana", "Dana")),
        now() - Duration::hours(hours_ago),
        vec![ChangeItem::new("status", Some(from), Some(to))],
    )
}

#[tokio::test]
async fn test_thrashing_issue_is_flagged_and_advised() {
    let issue = IssueSnapshot::new("1", "PROJ-1", "In Review", now() - Duration::days(20), now())
        .with_assignee(User::new("dana", "Dana"));
    let history = vec![
        status_change(1, "In Progress", "In Review"),
        status_change(5, "In Review", "In Progress"),
        status_change(10, "In Progress", "In Review"),
        status_change(15, "In Review", "In Progress"),
        status_change(20, "In Progress", "In Review"),
    ];
    let tracker = MockTracker::new()
        .with_changelog(history)
        .with_last_comment(recent_comment());
    let engine = StallEngine::new(tracker, config());

    let result = engine.classify_at(&issue, now()).await.unwrap();
    assert_has_reason(&result, "STATUS_THRASHING");
    assert_has_reason(&result, "STATUS_PING_PONG");
    assert_lacks_reason(&result, "NO_ACTIVITY");
    assert!(result.analysis.as_ref().unwrap().is_thrashing);
    assert_has_suggestion(&result, SuggestionKind::SyncDirection);
    assert_suggestions_ranked(&result, 5);
}

#[tokio::test]
async fn test_every_collaborator_down_still_classifies() {
    let issue = IssueSnapshot::new(
        "1",
        "PROJ-1",
        "Blocked",
        now() - Duration::days(10),
        now() - Duration::hours(30),
    );
    let tracker = MockTracker::new().failing_for_issue("1");
    let engine = StallEngine::new(tracker, config());

    let result = engine.classify_at(&issue, now()).await.unwrap();
    assert_has_reason(&result, "STATUS_BLOCKED");
    assert_has_reason(&result, "NO_ACTIVITY");
    assert_lacks_reason(&result, "HAS_BLOCKERS");
    assert_lacks_reason(&result, "NO_COMMENTS");
    assert!(result.analysis.is_none());
    assert_stalled(&result, Severity::Critical);
}

#[tokio::test]
async fn test_disabled_detectors_are_not_called() {
    let issue = IssueSnapshot::new("1", "PROJ-1", "To Do", now(), now());
    let mut config = config();
    config.settings.features.comment_checks = false;
    config.settings.features.blocker_checks = false;
    let engine = StallEngine::new(MockTracker::new(), config);

    let result = engine.classify_at(&issue, now()).await.unwrap();
    assert_healthy(&result);
    assert_eq!(engine.tracker().calls(TrackerOp::FetchLastHumanComment), 0);
    assert_eq!(engine.tracker().calls(TrackerOp::FetchBlockers), 0);
    assert_eq!(engine.tracker().calls(TrackerOp::FetchChangelog), 1);
}

#[tokio::test]
async fn test_escalation_and_dependencies_for_critical_priority() {
    let issue = IssueSnapshot::new(
        "1",
        "PROJ-1",
        "In Progress",
        now() - Duration::days(10),
        now() - Duration::hours(100),
    )
    .with_priority("Highest")
    .with_assignee(User::new("dana", "Dana"));
    let tracker = MockTracker::new()
        .with_last_comment(recent_comment())
        .with_links(vec![
            IssueLink::new("PROJ-9", "depends on").with_status("In Progress"),
            IssueLink::new("PROJ-8", "depends on").with_status("Done"),
        ]);
    let engine = StallEngine::new(tracker, config());

    let result = engine.classify_at(&issue, now()).await.unwrap();
    assert_stalled(&result, Severity::High);
    assert_eq!(result.suggestions[0].kind, SuggestionKind::Escalate);
    let deps = result
        .suggestions
        .iter()
        .find(|s| s.kind == SuggestionKind::CheckDependencies)
        .unwrap();
    assert_eq!(deps.targets, vec!["PROJ-9"]);
    assert_suggestions_ranked(&result, 5);
}

#[tokio::test]
async fn test_dashboard_over_mock_population() {
    let issues = vec![
        IssueSnapshot::new("1", "PROJ-1", "Blocked", now(), now() - Duration::hours(40)),
        IssueSnapshot::new("2", "PROJ-2", "To Do", now(), now() - Duration::hours(2)),
        IssueSnapshot::new("3", "PROJ-3", "In Review", now(), now() - Duration::hours(1)),
        IssueSnapshot::new("4", "PROJ-4", "", now(), now()),
    ];
    let tracker = MockTracker::new()
        .with_issues(issues)
        .with_last_comment(recent_comment());
    let engine = StallEngine::new(tracker, config());

    let metrics = engine.aggregate_at(now()).await;
    assert_eq!(metrics.total_issues, 3);
    assert_eq!(metrics.failed_issues, 1);
    assert_eq!(metrics.stalled_issues, 2);
    assert_eq!(metrics.healthy_issues, 1);
    assert_eq!(metrics.by_severity[&Severity::Critical], 1);
    assert_eq!(metrics.by_severity[&Severity::High], 1);
    assert_eq!(metrics.reason_histogram["UNASSIGNED_ACTIVE"], 1);
    assert_eq!(metrics.longest_stalled.as_ref().unwrap().key, "PROJ-1");
    let recent: Vec<&str> = metrics
        .recently_stalled
        .iter()
        .map(|n| n.key.as_str())
        .collect();
    assert_eq!(recent, vec!["PROJ-3", "PROJ-1"]);
}

#[tokio::test]
async fn test_dashboard_respects_max_issues_per_run() {
    let issues = (0..10)
        .map(|i| IssueSnapshot::new(i.to_string(), format!("PROJ-{}", i), "To Do", now(), now()))
        .collect();
    let mut config = config();
    config.settings.max_issues_per_run = 4;
    let engine = StallEngine::new(MockTracker::new().with_issues(issues), config);

    let metrics = engine.aggregate_at(now()).await;
    assert_eq!(metrics.total_issues, 4);
}

#[tokio::test]
async fn test_json_tracker_end_to_end_message() {
    let mut record = IssueRecord::new(
        IssueSnapshot::new(
            "7",
            "PROJ-7",
            "In Review",
            now() - Duration::days(5),
            now() - Duration::hours(3),
        )
        .with_reporter(User::new("rita", "Rita"))
        .with_link(IssueLink::new("PROJ-2", "is blocked by").with_status("To Do")),
    );
    record.watchers = vec![User::new("walt", "Walt")];
    let engine = StallEngine::new(JsonTracker::new(vec![record.clone()]), config());

    let result = engine.classify_at(&record.snapshot, now()).await.unwrap();
    assert_has_reason(&result, "HAS_BLOCKERS");
    assert_has_reason(&result, "UNASSIGNED_ACTIVE");
    assert_has_reason(&result, "NO_COMMENTS");
    assert_stalled(&result, Severity::Critical);
    assert_eq!(result.suggestions[0].kind, SuggestionKind::ResolveBlocker);
    assert_has_suggestion(&result, SuggestionKind::AssignOwner);

    let message = format_stall_message(&result, &StandardPhrasing);
    assert!(message.contains("Blocked by PROJ-2"));
    assert!(message.contains("Suggested actions:"));

    let decision = decide_notification(
        &result,
        Some(now() - Duration::hours(1)),
        engine.config().settings.comment_cooldown_hours,
        now(),
    );
    assert!(!decision.should_post());
}

#[tokio::test]
async fn test_resolved_work_stays_off_the_dashboard() {
    let done = IssueRecord::new(IssueSnapshot::new(
        "9",
        "PROJ-9",
        "Done",
        now() - Duration::days(60),
        now() - Duration::days(30),
    ));
    let engine = StallEngine::new(JsonTracker::new(vec![done]), config());

    let metrics = engine.aggregate_at(now()).await;
    assert_eq!(metrics.total_issues, 0);
    assert_eq!(metrics.stalled_issues, 0);
    assert!(metrics.reason_histogram.is_empty());
}
