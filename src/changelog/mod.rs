//! Changelog intelligence.
//!
//! Separates meaningful human change from bot and field noise, builds the
//! status and assignment timelines, and runs the pattern detectors.
//!
//! # Example
//!
//! ```rust
//! use chrono::Utc;
//! use stallwatch::changelog::ChangelogAnalyzer;
//!
//! let analysis = ChangelogAnalyzer::new().analyze(&[], Utc::now());
//! assert_eq!(analysis.total_changes, 0);
//! assert!(analysis.last_meaningful_update.is_none());
//! assert!(analysis.patterns.is_empty());
//! ```

pub mod classify;
pub mod patterns;
pub mod types;

pub use classify::{SignalClassifier, BOT_NAME_PATTERNS, MEANINGFUL_FIELDS, NOISE_FIELDS};
pub use patterns::detect_patterns;
pub use types::{ChangelogAnalysis, Contributor, FieldTransition, Pattern, PatternKind};

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

use crate::model::ChangelogEntry;

/// Stateless analyzer; cheap to construct and safe to share.
#[derive(Debug, Clone, Default)]
pub struct ChangelogAnalyzer {
    classifier: SignalClassifier,
}

impl ChangelogAnalyzer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn classifier(&self) -> &SignalClassifier {
        &self.classifier
    }

    /// Analyzes one issue's history as of `now`.
    ///
    /// `entries` may arrive in any order; timelines in the result are
    /// always most-recent-first. The input is never modified.
    #[must_use]
    pub fn analyze(&self, entries: &[ChangelogEntry], now: DateTime<Utc>) -> ChangelogAnalysis {
        let mut analysis = ChangelogAnalysis::empty();
        let mut last_meaningful: Option<(DateTime<Utc>, Option<String>)> = None;
        let mut contributors: HashMap<String, Contributor> = HashMap::new();

        for entry in entries {
            let is_bot = self.classifier.is_bot(entry.author.as_ref());
            let author_name = entry.author.as_ref().map(|u| u.display_name.clone());

            if let (false, Some(user)) = (is_bot, entry.author.as_ref()) {
                contributors
                    .entry(user.account_id.clone())
                    .and_modify(|c| {
                        if entry.created > c.last_active {
                            c.last_active = entry.created;
                        }
                    })
                    .or_insert_with(|| Contributor {
                        account_id: user.account_id.clone(),
                        display_name: user.display_name.clone(),
                        last_active: entry.created,
                    });
            }

            for item in &entry.items {
                analysis.total_changes += 1;

                if self.classifier.is_meaningful(&item.field, is_bot) {
                    analysis.meaningful_changes += 1;
                    let newer = last_meaningful
                        .as_ref()
                        .map(|(date, _)| entry.created > *date)
                        .unwrap_or(true);
                    if newer {
                        last_meaningful = Some((entry.created, author_name.clone()));
                    }
                }
                if self.classifier.is_noise(&item.field, is_bot) {
                    analysis.noise_changes += 1;
                }

                let transition = || FieldTransition {
                    date: entry.created,
                    from: item.from.clone(),
                    to: item.to.clone(),
                    author: author_name.clone(),
                };
                let field = item.field.trim();
                if field.eq_ignore_ascii_case("status") {
                    analysis.status_changes.push(transition());
                } else if field.eq_ignore_ascii_case("assignee") {
                    analysis.assignment_changes.push(transition());
                }
            }
        }

        analysis
            .status_changes
            .sort_by(|a, b| b.date.cmp(&a.date));
        analysis
            .assignment_changes
            .sort_by(|a, b| b.date.cmp(&a.date));

        let mut contributors: Vec<Contributor> = contributors.into_values().collect();
        contributors.sort_by(|a, b| {
            b.last_active
                .cmp(&a.last_active)
                .then_with(|| a.account_id.cmp(&b.account_id))
        });
        analysis.contributors = contributors;

        if let Some((date, author)) = last_meaningful {
            analysis.last_meaningful_update = Some(date);
            analysis.last_meaningful_author = author;
        }

        analysis.patterns = detect_patterns(
            &analysis.status_changes,
            &analysis.assignment_changes,
            now,
        );
        analysis.is_thrashing = analysis.has_pattern("STATUS_THRASHING");

        debug!(
            total = analysis.total_changes,
            meaningful = analysis.meaningful_changes,
            noise = analysis.noise_changes,
            patterns = analysis.patterns.len(),
            "Changelog analyzed"
        );

        analysis
    }
}
