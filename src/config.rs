//! Configuration for stall classification.
//!
//! The engine never reads configuration on its own. Callers load a
//! [`StallConfig`] once (usually through [`ConfigStore`]) and hand the value
//! to the engine, which treats it as immutable for the lifetime of a run.
//!
//! # Example
//!
//! ```rust
//! use stallwatch::config::{StallConfig, ThresholdConfig};
//!
//! let config = StallConfig::default();
//! assert_eq!(config.thresholds.hours_for("In Progress"), 48.0);
//! assert_eq!(config.thresholds.hours_for("Some Custom Status"), 72.0);
//!
//! let exported = config.export_json().unwrap();
//! let imported = StallConfig::import_json(&exported).unwrap();
//! assert_eq!(imported, config);
//! ```

pub mod validation;

pub use validation::{ConfigValidator, ValidationReport};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{Result, StallError};

/// Threshold used when neither the status nor `default` is configured.
pub const FALLBACK_THRESHOLD_HOURS: f64 = 72.0;

/// Key of the catch-all entry in a [`ThresholdConfig`].
pub const DEFAULT_THRESHOLD_KEY: &str = "default";

/// Default filename for persisted configuration.
pub const CONFIG_FILENAME: &str = "stallwatch.json";

// ============================================================================
// Thresholds
// ============================================================================

/// Per-status inactivity thresholds, in hours.
///
/// Serialized as a flat map, e.g. `{"In Progress": 48, "default": 72}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdConfig {
    by_status: BTreeMap<String, f64>,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        let by_status = [
            ("To Do", 168.0),
            ("Backlog", 168.0),
            ("In Progress", 48.0),
            ("In Review", 24.0),
            ("Blocked", 24.0),
            (DEFAULT_THRESHOLD_KEY, FALLBACK_THRESHOLD_HOURS),
        ]
        .into_iter()
        .map(|(status, hours)| (status.to_string(), hours))
        .collect();

        Self { by_status }
    }
}

impl ThresholdConfig {
    /// Creates an empty threshold table (every lookup hits the fallback).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            by_status: BTreeMap::new(),
        }
    }

    /// Sets the threshold for a status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>, hours: f64) -> Self {
        self.by_status.insert(status.into(), hours);
        self
    }

    /// Sets the `default` entry.
    #[must_use]
    pub fn with_default(self, hours: f64) -> Self {
        self.with_status(DEFAULT_THRESHOLD_KEY, hours)
    }

    /// Resolves the threshold for `status`.
    ///
    /// Exact name first, then a case-insensitive match, then `default`,
    /// then [`FALLBACK_THRESHOLD_HOURS`].
    #[must_use]
    pub fn hours_for(&self, status: &str) -> f64 {
        if let Some(hours) = self.by_status.get(status) {
            return *hours;
        }
        if let Some((_, hours)) = self
            .by_status
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(status))
        {
            return *hours;
        }
        self.default_hours()
    }

    /// The `default` entry, or the hard-coded fallback.
    #[must_use]
    pub fn default_hours(&self) -> f64 {
        self.by_status
            .get(DEFAULT_THRESHOLD_KEY)
            .copied()
            .unwrap_or(FALLBACK_THRESHOLD_HOURS)
    }

    /// Whether a `default` entry is present.
    #[must_use]
    pub fn has_default(&self) -> bool {
        self.by_status.contains_key(DEFAULT_THRESHOLD_KEY)
    }

    /// Iterates over configured `(status, hours)` pairs.
    pub fn entries(&self) -> impl Iterator<Item = (&str, f64)> {
        self.by_status.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Switches for individual detectors and the suggestion pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureToggles {
    /// Use the last meaningful changelog update as the activity timestamp.
    #[serde(default = "default_true")]
    pub changelog_analysis: bool,
    /// Promote changelog patterns into stall reasons.
    #[serde(default = "default_true")]
    pub pattern_detection: bool,
    /// Run the human-comment detectors.
    #[serde(default = "default_true")]
    pub comment_checks: bool,
    /// Run the blocker-link detector.
    #[serde(default = "default_true")]
    pub blocker_checks: bool,
    /// Run the assignment detectors.
    #[serde(default = "default_true")]
    pub assignment_checks: bool,
    /// Attach suggestions to stalled results.
    #[serde(default = "default_true")]
    pub contextual_suggestions: bool,
}

fn default_true() -> bool {
    true
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            changelog_analysis: true,
            pattern_detection: true,
            comment_checks: true,
            blocker_checks: true,
            assignment_checks: true,
            contextual_suggestions: true,
        }
    }
}

/// Scalar settings consulted by the classifier, advisor and aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_no_human_comment_hours")]
    pub no_human_comment_threshold_hours: f64,
    #[serde(default = "default_comment_cooldown_hours")]
    pub comment_cooldown_hours: f64,
    #[serde(default = "default_max_issues_per_run")]
    pub max_issues_per_run: usize,
    /// Pause between issues during a dashboard run, to share the API budget.
    #[serde(default = "default_inter_issue_delay_ms")]
    pub inter_issue_delay_ms: u64,
    #[serde(default = "default_in_progress_status")]
    pub in_progress_status: String,
    #[serde(default = "default_review_statuses")]
    pub review_statuses: Vec<String>,
    #[serde(default = "default_backlog_statuses")]
    pub backlog_statuses: Vec<String>,
    #[serde(default = "default_terminal_statuses")]
    pub terminal_statuses: Vec<String>,
    #[serde(default = "default_escalation_priorities")]
    pub escalation_priorities: Vec<String>,
    /// Maximum entries in the dashboard's notable list.
    #[serde(default = "default_notable_limit")]
    pub notable_limit: usize,
    #[serde(default)]
    pub features: FeatureToggles,
}

fn default_no_human_comment_hours() -> f64 {
    72.0
}

fn default_comment_cooldown_hours() -> f64 {
    24.0
}

fn default_max_issues_per_run() -> usize {
    50
}

fn default_inter_issue_delay_ms() -> u64 {
    250
}

fn default_in_progress_status() -> String {
    "In Progress".to_string()
}

fn default_review_statuses() -> Vec<String> {
    vec!["In Review".to_string()]
}

fn default_backlog_statuses() -> Vec<String> {
    vec!["To Do".to_string(), "Backlog".to_string(), "Open".to_string()]
}

fn default_terminal_statuses() -> Vec<String> {
    vec![
        "Done".to_string(),
        "Closed".to_string(),
        "Resolved".to_string(),
    ]
}

fn default_escalation_priorities() -> Vec<String> {
    vec![
        "Highest".to_string(),
        "Critical".to_string(),
        "Blocker".to_string(),
    ]
}

fn default_notable_limit() -> usize {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            no_human_comment_threshold_hours: default_no_human_comment_hours(),
            comment_cooldown_hours: default_comment_cooldown_hours(),
            max_issues_per_run: default_max_issues_per_run(),
            inter_issue_delay_ms: default_inter_issue_delay_ms(),
            in_progress_status: default_in_progress_status(),
            review_statuses: default_review_statuses(),
            backlog_statuses: default_backlog_statuses(),
            terminal_statuses: default_terminal_statuses(),
            escalation_priorities: default_escalation_priorities(),
            notable_limit: default_notable_limit(),
            features: FeatureToggles::default(),
        }
    }
}

fn contains_ignore_case(list: &[String], value: &str) -> bool {
    list.iter().any(|s| s.eq_ignore_ascii_case(value))
}

impl Settings {
    #[must_use]
    pub fn is_in_progress(&self, status: &str) -> bool {
        self.in_progress_status.eq_ignore_ascii_case(status)
    }

    #[must_use]
    pub fn is_review(&self, status: &str) -> bool {
        contains_ignore_case(&self.review_statuses, status)
    }

    #[must_use]
    pub fn is_backlog(&self, status: &str) -> bool {
        contains_ignore_case(&self.backlog_statuses, status)
    }

    #[must_use]
    pub fn is_terminal(&self, status: &str) -> bool {
        contains_ignore_case(&self.terminal_statuses, status)
    }

    /// Statuses where an unassigned issue is a problem.
    #[must_use]
    pub fn needs_owner(&self, status: &str) -> bool {
        self.is_in_progress(status) || self.is_review(status)
    }

    #[must_use]
    pub fn is_escalation_priority(&self, priority: &str) -> bool {
        contains_ignore_case(&self.escalation_priorities, priority)
    }
}

// ============================================================================
// Combined configuration
// ============================================================================

/// Everything the engine needs to know, passed by value into every run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StallConfig {
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub settings: Settings,
}

impl StallConfig {
    /// Serializes the configuration as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses and validates a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`StallError::Json`] for malformed documents and
    /// [`StallError::InvalidConfig`] when validation finds errors.
    pub fn import_json(content: &str) -> Result<Self> {
        let config: StallConfig = serde_json::from_str(content)?;
        let report = ConfigValidator::new().validate(&config);
        if let Some(first) = report.errors.first() {
            return Err(StallError::InvalidConfig {
                field: first.field.clone(),
                reason: first.reason.clone(),
            });
        }
        for warning in &report.warnings {
            warn!("Config warning: {}", warning);
        }
        Ok(config)
    }
}

// ============================================================================
// Persistence
// ============================================================================

/// File-backed configuration store.
///
/// This is the boundary where configuration is loaded; the engine only
/// ever sees the resulting [`StallConfig`] value.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Creates a store for an explicit config file path.
    #[must_use]
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Store at the per-user default location
    /// (e.g. `~/.config/stallwatch/stallwatch.json`).
    #[must_use]
    pub fn user_default() -> Self {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join("stallwatch").join(CONFIG_FILENAME))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the config, returning defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or is invalid.
    pub fn load(&self) -> Result<StallConfig> {
        if !self.path.exists() {
            return Ok(StallConfig::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| StallError::config_with_path(e.to_string(), self.path.clone()))?;
        StallConfig::import_json(&content).map_err(|e| match e {
            StallError::Json(err) => StallError::config_with_path(err.to_string(), self.path.clone()),
            other => other,
        })
    }

    /// Writes the config atomically (temp file then rename).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, config: &StallConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut temp_path = self.path.clone().into_os_string();
        temp_path.push(".tmp");
        let temp_path = PathBuf::from(temp_path);

        std::fs::write(&temp_path, config.export_json()?)?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    /// Current thresholds.
    ///
    /// # Errors
    ///
    /// Propagates load failures.
    pub fn get_thresholds(&self) -> Result<ThresholdConfig> {
        Ok(self.load()?.thresholds)
    }

    /// Current settings.
    ///
    /// # Errors
    ///
    /// Propagates load failures.
    pub fn get_settings(&self) -> Result<Settings> {
        Ok(self.load()?.settings)
    }
}
