//! Custom assertions for domain-specific testing.
//!
//! Failure messages print the reason codes so a broken scenario is readable
//! without a debugger.

use crate::advisor::SuggestionKind;
use crate::severity::Severity;
use crate::stall::StallResult;

fn codes(result: &StallResult) -> Vec<&'static str> {
    result.reasons.iter().map(|r| r.code()).collect()
}

/// Assert that a result carries the given reason code.
///
/// # Panics
///
/// Panics if the reason is missing.
///
/// # Example
///
/// ```rust,ignore
/// let result = engine.classify(&issue).await?;
/// assert_has_reason(&result, "HAS_BLOCKERS");
/// ```
pub fn assert_has_reason(result: &StallResult, code: &str) {
    assert!(
        result.has_reason(code),
        "Expected {} to have reason {}, got {:?}",
        result.issue_key,
        code,
        codes(result)
    );
}

/// Assert that a result does not carry the given reason code.
///
/// # Panics
///
/// Panics if the reason is present.
pub fn assert_lacks_reason(result: &StallResult, code: &str) {
    assert!(
        !result.has_reason(code),
        "Expected {} not to have reason {}, got {:?}",
        result.issue_key,
        code,
        codes(result)
    );
}

/// Assert that a result is stalled at exactly `severity`.
///
/// # Panics
///
/// Panics if the issue is healthy or the overall severity differs.
pub fn assert_stalled(result: &StallResult, severity: Severity) {
    assert!(
        result.is_stalled,
        "Expected {} to be stalled, but it is healthy",
        result.issue_key
    );
    assert_eq!(
        result.severity,
        Some(severity),
        "Unexpected severity for {} with reasons {:?}",
        result.issue_key,
        codes(result)
    );
}

/// Assert that a result is healthy.
///
/// # Panics
///
/// Panics if any reason fired.
pub fn assert_healthy(result: &StallResult) {
    assert!(
        !result.is_stalled && result.reasons.is_empty(),
        "Expected {} to be healthy, got {:?}",
        result.issue_key,
        codes(result)
    );
}

/// Assert that suggestions are ordered by non-increasing confidence and
/// within the cap.
///
/// # Panics
///
/// Panics if the list is too long or out of order.
pub fn assert_suggestions_ranked(result: &StallResult, cap: usize) {
    assert!(
        result.suggestions.len() <= cap,
        "Expected at most {} suggestions, got {}",
        cap,
        result.suggestions.len()
    );
    for pair in result.suggestions.windows(2) {
        assert!(
            pair[0].confidence >= pair[1].confidence,
            "Suggestions out of order: {:?} before {:?}",
            pair[0].confidence,
            pair[1].confidence
        );
    }
}

/// Assert that at least one suggestion of `kind` was produced.
///
/// # Panics
///
/// Panics if no suggestion has that kind.
pub fn assert_has_suggestion(result: &StallResult, kind: SuggestionKind) {
    assert!(
        result.suggestions.iter().any(|s| s.kind == kind),
        "Expected a {:?} suggestion for {}, got {:?}",
        kind,
        result.issue_key,
        result.suggestions.iter().map(|s| s.kind).collect::<Vec<_>>()
    );
}
