//! Context-aware suggestions for stalled issues.
//!
//! Generators append raw suggestions to a [`SuggestionSet`]; the set is
//! finalized once: de-duplicated by `(kind, action)`, ranked by confidence
//! (CRITICAL first, ties keep generation order) and capped.

pub mod generators;
pub mod types;

pub use generators::AdviceContext;
pub use types::{Suggestion, SuggestionKind};

use std::collections::HashSet;

use crate::changelog::ChangelogAnalysis;
use crate::config::{Settings, StallConfig};
use crate::model::{IssueLink, IssueSnapshot, User};
use crate::stall::StallResult;

/// Maximum suggestions attached to a result.
pub const MAX_SUGGESTIONS: usize = 5;

/// Accumulates suggestions; nothing is dropped or reordered until
/// [`SuggestionSet::finalize`].
#[derive(Debug, Clone, Default)]
pub struct SuggestionSet {
    raw: Vec<Suggestion>,
}

impl SuggestionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, suggestion: Suggestion) {
        self.raw.push(suggestion);
    }

    pub fn push_opt(&mut self, suggestion: Option<Suggestion>) {
        if let Some(suggestion) = suggestion {
            self.raw.push(suggestion);
        }
    }

    pub fn extend<I: IntoIterator<Item = Suggestion>>(&mut self, suggestions: I) {
        self.raw.extend(suggestions);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// De-duplicates, ranks and truncates to `limit`.
    #[must_use]
    pub fn finalize(self, limit: usize) -> Vec<Suggestion> {
        let mut seen = HashSet::new();
        let mut unique: Vec<Suggestion> = self
            .raw
            .into_iter()
            .filter(|s| seen.insert((s.kind, s.action.clone())))
            .collect();
        // sort_by is stable, so equal confidence keeps generation order.
        unique.sort_by(|a, b| b.confidence.cmp(&a.confidence));
        unique.truncate(limit);
        unique
    }
}

/// Relationship and social data gathered for the advisor.
#[derive(Debug, Clone, Default)]
pub struct RelatedContext {
    pub watchers: Vec<User>,
    pub linked_issues: Vec<IssueLink>,
}

/// Maps a verdict plus context into ranked suggestions.
#[derive(Debug, Clone, Default)]
pub struct ContextAdvisor {
    settings: Settings,
}

impl ContextAdvisor {
    #[must_use]
    pub fn new(config: &StallConfig) -> Self {
        Self {
            settings: config.settings.clone(),
        }
    }

    /// Suggestions for `result`; empty for healthy issues.
    #[must_use]
    pub fn advise(
        &self,
        issue: &IssueSnapshot,
        result: &StallResult,
        analysis: Option<&ChangelogAnalysis>,
        related: &RelatedContext,
    ) -> Vec<Suggestion> {
        if !result.is_stalled {
            return Vec::new();
        }
        let analysis = analysis.or(result.analysis.as_ref());
        let ctx = AdviceContext {
            issue,
            settings: &self.settings,
            analysis,
            watchers: &related.watchers,
        };

        let mut set = SuggestionSet::new();
        for reason in &result.reasons {
            set.extend(generators::for_reason(reason, &ctx));
        }
        if let Some(analysis) = analysis.filter(|_| self.settings.features.pattern_detection) {
            for pattern in &analysis.patterns {
                set.extend(generators::for_pattern(&pattern.kind));
            }
        }
        set.push_opt(generators::for_dependencies(
            &related.linked_issues,
            &self.settings,
        ));
        set.push_opt(generators::for_priority(issue, &self.settings));

        set.finalize(MAX_SUGGESTIONS)
    }
}
