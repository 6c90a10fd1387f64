//! Suggestion types.

use serde::{Deserialize, Serialize};

use crate::severity::Confidence;

/// What kind of action a suggestion proposes. Together with the action
/// text it identifies a suggestion for de-duplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuggestionKind {
    PingAssignee,
    Reassign,
    AssignOwner,
    RequestReview,
    GroomBacklog,
    PostUpdate,
    AddContext,
    SplitWork,
    ResolveBlocker,
    LinkBlocker,
    SyncDirection,
    ClarifyWorkflow,
    SingleOwner,
    RootCause,
    ReassessStatus,
    CheckDependencies,
    Escalate,
}

/// A prioritized, actionable piece of advice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub icon: String,
    pub action: String,
    pub rationale: String,
    pub confidence: Confidence,
    /// People or issues the action refers to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,
}

impl Suggestion {
    #[must_use]
    pub fn new(
        kind: SuggestionKind,
        icon: &str,
        action: impl Into<String>,
        rationale: impl Into<String>,
        confidence: Confidence,
    ) -> Self {
        Self {
            kind,
            icon: icon.to_string(),
            action: action.into(),
            rationale: rationale.into(),
            confidence,
            targets: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.targets.push(target.into());
        self
    }

    #[must_use]
    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets.extend(targets.into_iter().map(Into::into));
        self
    }
}
