//! Custom error types for stallwatch.
//!
//! Collaborator failures are normally absorbed by the engine and logged;
//! the variants here surface only at the edges (configuration loading,
//! malformed caller input, the CLI).

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for stallwatch operations
#[derive(Error, Debug)]
pub enum StallError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Failed to load configuration
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {reason}")]
    InvalidConfig { field: String, reason: String },

    // =========================================================================
    // Input Errors
    // =========================================================================
    /// A required snapshot field is missing or empty
    #[error("Malformed issue {issue}: missing required field '{field}'")]
    MalformedIssue { issue: String, field: String },

    /// Issue not present in the data source
    #[error("Issue not found: {key}")]
    IssueNotFound { key: String },

    // =========================================================================
    // Collaborator Errors
    // =========================================================================
    /// A tracker call failed
    #[error("Tracker call '{operation}' failed: {message}")]
    Collaborator { operation: String, message: String },

    // =========================================================================
    // Wrapped Errors
    // =========================================================================
    /// IO error wrapper
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON error wrapper
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StallError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            path: None,
        }
    }

    /// Create a configuration error with path
    pub fn config_with_path(message: impl Into<String>, path: PathBuf) -> Self {
        Self::Config {
            message: message.into(),
            path: Some(path),
        }
    }

    /// Create a malformed-issue error
    pub fn malformed(issue: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MalformedIssue {
            issue: issue.into(),
            field: field.into(),
        }
    }

    /// Create a collaborator error
    pub fn collaborator(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Collaborator {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Check if this error only affects a single issue or call
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Collaborator { .. } | Self::MalformedIssue { .. } | Self::IssueNotFound { .. }
        )
    }

    /// Get error code for exit status
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MalformedIssue { .. } | Self::IssueNotFound { .. } => 2,
            Self::Collaborator { .. } => 3,
            Self::Config { .. } | Self::InvalidConfig { .. } => 7,
            _ => 1,
        }
    }
}

/// Type alias for stallwatch results
pub type Result<T> = std::result::Result<T, StallError>;

/// Extension trait for converting foreign errors to StallError
pub trait IntoStallError<T> {
    fn into_stall_collaborator(self, operation: &str) -> Result<T>;
}

impl<T, E: Into<anyhow::Error>> IntoStallError<T> for std::result::Result<T, E> {
    fn into_stall_collaborator(self, operation: &str) -> Result<T> {
        self.map_err(|e| StallError::collaborator(operation, e.into().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StallError::malformed("PROJ-1", "status");
        assert!(err.to_string().contains("PROJ-1"));
        assert!(err.to_string().contains("status"));
    }

    #[test]
    fn test_is_recoverable() {
        assert!(StallError::collaborator("fetch_watchers", "503").is_recoverable());
        assert!(StallError::malformed("PROJ-1", "id").is_recoverable());
        assert!(!StallError::config("bad").is_recoverable());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(StallError::malformed("A-1", "status").exit_code(), 2);
        assert_eq!(StallError::collaborator("x", "y").exit_code(), 3);
        assert_eq!(StallError::config("test").exit_code(), 7);
    }

    #[test]
    fn test_config_with_path() {
        let path = PathBuf::from("/tmp/stallwatch.json");
        let err = StallError::config_with_path("failed to parse", path.clone());
        if let StallError::Config {
            message,
            path: opt_path,
        } = err
        {
            assert_eq!(message, "failed to parse");
            assert_eq!(opt_path, Some(path));
        } else {
            panic!("Wrong error variant");
        }
    }

    #[test]
    fn test_into_stall_error_trait() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));

        match result.into_stall_collaborator("fetch_changelog") {
            Err(StallError::Collaborator { operation, message }) => {
                assert_eq!(operation, "fetch_changelog");
                assert!(message.contains("file not found"));
            }
            other => panic!("Wrong error variant after conversion: {:?}", other),
        }
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: StallError = io_err.into();
        assert!(matches!(err, StallError::Io(_)));
        assert!(err.to_string().contains("access denied"));
    }
}
