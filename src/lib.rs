//! Stallwatch - stall detection for issue trackers
//!
//! Decides whether a work item has stopped making real progress, explains
//! why, and suggests what to do about it.
//!
//! # Architecture
//!
//! - [`changelog`] - separates meaningful change from bot and field noise, detects patterns
//! - [`stall`] - multi-detector classifier producing a ranked, explained verdict
//! - [`advisor`] - maps a verdict plus context into prioritized suggestions
//! - [`dashboard`] - reduces verdicts across a population into metrics
//! - [`engine`] - orchestration over an [`IssueTracker`](tracker::IssueTracker)
//! - [`notify`] - message rendering and cooldown-aware posting decisions
//! - [`config`] - thresholds, settings, persistence and validation
//! - [`testing`] - mock tracker and assertions
//!
//! The analyzers are pure: every time-dependent call takes an explicit
//! `now`, so identical inputs always produce identical output.
//!
//! # Example
//!
//! ```rust,ignore
//! use stallwatch::{StallConfig, StallEngine};
//! use stallwatch::tracker::JsonTracker;
//! use stallwatch::notify::{format_stall_message, StandardPhrasing};
//!
//! let tracker = JsonTracker::load("issues.json")?;
//! let issue = tracker.find("PROJ-42").cloned().unwrap();
//! let engine = StallEngine::new(tracker, StallConfig::default());
//!
//! let result = engine.classify(&issue).await?;
//! if result.is_stalled {
//!     println!("{}", format_stall_message(&result, &StandardPhrasing));
//! }
//! ```

pub mod advisor;
pub mod changelog;
pub mod config;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod model;
pub mod notify;
pub mod severity;
pub mod stall;
pub mod testing;
pub mod tracker;

// Re-export commonly used types
pub use error::{IntoStallError, Result, StallError};

pub use advisor::{ContextAdvisor, Suggestion, SuggestionKind};
pub use changelog::{ChangelogAnalysis, ChangelogAnalyzer, Pattern, PatternKind};
pub use config::{ConfigStore, FeatureToggles, Settings, StallConfig, ThresholdConfig};
pub use dashboard::DashboardMetrics;
pub use engine::StallEngine;
pub use model::{ChangeItem, ChangelogEntry, HumanComment, IssueLink, IssueSnapshot, User};
pub use severity::{Confidence, Severity};
pub use stall::{ReasonKind, StallClassifier, StallReason, StallResult};
