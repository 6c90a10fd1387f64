//! Configuration validation.
//!
//! # Example
//!
//! ```rust
//! use stallwatch::config::{ConfigValidator, StallConfig};
//!
//! let report = ConfigValidator::new().validate(&StallConfig::default());
//! assert!(report.is_valid());
//! assert_eq!(report.exit_code(), 0);
//! ```

use std::fmt;

use super::StallConfig;

/// A single problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub reason: String,
}

impl ValidationIssue {
    fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Result of configuration validation.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Errors that prevent the configuration from being used.
    pub errors: Vec<ValidationIssue>,
    /// Warnings that indicate likely mistakes.
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the configuration is valid (no errors).
    ///
    /// Warnings do not affect validity.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns 0 if valid, 1 if invalid.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.is_valid() {
            0
        } else {
            1
        }
    }

    /// Generate a human-readable summary of the validation result.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.is_valid() {
            if self.warnings.is_empty() {
                "Configuration is valid.".to_string()
            } else {
                format!(
                    "Configuration is valid with {} warning(s).",
                    self.warnings.len()
                )
            }
        } else {
            format!(
                "Configuration is invalid with {} error(s).",
                self.errors.len()
            )
        }
    }

    /// Summary followed by every error and warning, one per line.
    #[must_use]
    pub fn verbose_report(&self) -> String {
        let mut lines = vec![self.summary()];
        for error in &self.errors {
            lines.push(format!("  \u{2717} {}", error));
        }
        for warning in &self.warnings {
            lines.push(format!("  ! {}", warning));
        }
        lines.join("\n")
    }
}

/// Checks a [`StallConfig`] before it is accepted.
#[derive(Debug, Clone, Default)]
pub struct ConfigValidator;

impl ConfigValidator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn validate(&self, config: &StallConfig) -> ValidationReport {
        let mut report = ValidationReport::new();

        for (status, hours) in config.thresholds.entries() {
            if !hours.is_finite() {
                report.errors.push(ValidationIssue::new(
                    format!("thresholds.{}", status),
                    "threshold must be a finite number",
                ));
            } else if hours <= 0.0 {
                report.errors.push(ValidationIssue::new(
                    format!("thresholds.{}", status),
                    format!("threshold must be positive, got {}", hours),
                ));
            }
        }
        if !config.thresholds.has_default() {
            report.warnings.push(ValidationIssue::new(
                "thresholds.default",
                "no default threshold; unknown statuses use the built-in fallback",
            ));
        }

        let settings = &config.settings;
        for (field, value) in [
            (
                "settings.noHumanCommentThresholdHours",
                settings.no_human_comment_threshold_hours,
            ),
            ("settings.commentCooldownHours", settings.comment_cooldown_hours),
        ] {
            if !value.is_finite() || value < 0.0 {
                report.errors.push(ValidationIssue::new(
                    field,
                    format!("must be a non-negative number, got {}", value),
                ));
            }
        }
        if settings.max_issues_per_run == 0 {
            report.errors.push(ValidationIssue::new(
                "settings.maxIssuesPerRun",
                "must be at least 1",
            ));
        }
        if settings.in_progress_status.trim().is_empty() {
            report.warnings.push(ValidationIssue::new(
                "settings.inProgressStatus",
                "empty; assignment detectors will never fire",
            ));
        }
        if settings.notable_limit == 0 {
            report.warnings.push(ValidationIssue::new(
                "settings.notableLimit",
                "zero; the dashboard notable list will always be empty",
            ));
        }

        report
    }
}
