//! Error types for LOOKOUT operations.
//!
//! This module defines [`LookoutError`], the error enum covering all error
//! cases across the LOOKOUT system. Errors in the alert path are designed to
//! be non-fatal: the dashboard must stay interactive even with a fully
//! failing backend, so transport and payload errors are surfaced as transient
//! indicators rather than propagated as process failures.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`LookoutError`].
pub type Result<T> = std::result::Result<T, LookoutError>;

/// Error type for all LOOKOUT operations.
#[derive(Debug, Error)]
pub enum LookoutError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration file not found
    #[error("Configuration not found at {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration file is invalid YAML
    #[error("Invalid configuration at {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    /// Configuration validation failed
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },

    /// Missing required configuration field
    #[error("Missing required config field: {field}")]
    ConfigMissingField { field: String },

    // =========================================================================
    // Snapshot Fetch Errors (transient, state retained)
    // =========================================================================
    /// Snapshot request failed at the transport level
    #[error("Snapshot fetch failed: {message}")]
    SnapshotTransport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Snapshot endpoint returned a non-success status
    #[error("Snapshot endpoint returned HTTP {status}")]
    SnapshotStatus { status: u16 },

    /// Snapshot fetch did not complete within the configured timeout
    #[error("Snapshot fetch timed out after {timeout_secs}s")]
    SnapshotTimeout { timeout_secs: u64 },

    /// The whole snapshot response body failed to parse
    #[error("Snapshot response unparseable: {message}")]
    SnapshotParse {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // =========================================================================
    // Push Channel Errors (transient, feature degrades to poll-only)
    // =========================================================================
    /// Push channel connection failed
    #[error("Push channel connect failed: {message}")]
    PushConnect { message: String },

    /// Push channel closed by the remote end
    #[error("Push channel closed: {reason}")]
    PushClosed { reason: String },

    // =========================================================================
    // Media Stream Errors (transient, alert path unaffected)
    // =========================================================================
    /// Media stream connection failed
    #[error("Media stream connect failed: {message}")]
    MediaConnect { message: String },

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// Generic I/O error with context
    #[error("I/O error {operation}: {path}")]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory creation failed
    #[error("Failed to create directory: {path}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // TUI Errors
    // =========================================================================
    /// Terminal initialization failed
    #[error("Terminal initialization failed: {message}")]
    TerminalInit { message: String },

    /// Terminal restore failed
    #[error("Failed to restore terminal: {message}")]
    TerminalRestore { message: String },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Internal error (bug in LOOKOUT)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl LookoutError {
    // =========================================================================
    // Constructor helpers for common error patterns
    // =========================================================================

    /// Create a ConfigNotFound error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound {
            path: path.into(),
            source: None,
        }
    }

    /// Create a ConfigValidation error
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create a SnapshotTransport error
    pub fn snapshot_transport(message: impl Into<String>) -> Self {
        Self::SnapshotTransport {
            message: message.into(),
            source: None,
        }
    }

    /// Create a SnapshotTransport error carrying the underlying cause
    pub fn snapshot_transport_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::SnapshotTransport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a SnapshotParse error from a serde failure
    pub fn snapshot_parse(source: serde_json::Error) -> Self {
        Self::SnapshotParse {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Create a PushConnect error
    pub fn push_connect(message: impl Into<String>) -> Self {
        Self::PushConnect {
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    // =========================================================================
    // Error classification helpers
    // =========================================================================

    /// Returns true if this error is transient: the previous state is
    /// retained and the operation retries on its own schedule.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::SnapshotTransport { .. }
                | Self::SnapshotStatus { .. }
                | Self::SnapshotTimeout { .. }
                | Self::SnapshotParse { .. }
                | Self::PushConnect { .. }
                | Self::PushClosed { .. }
                | Self::MediaConnect { .. }
        )
    }

    /// Returns true if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. }
                | Self::ConfigInvalid { .. }
                | Self::ConfigValidation { .. }
                | Self::ConfigMissingField { .. }
        )
    }

    /// Returns true if this error is fatal (should exit the application)
    pub fn is_fatal(&self) -> bool {
        self.is_config_error() || matches!(self, Self::TerminalInit { .. } | Self::Internal { .. })
    }

    /// Returns actionable guidance for the user
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            Self::ConfigNotFound { .. } => {
                Some("Create ~/.lookout/config.yaml or pass --alerts-url on the command line")
            }
            Self::ConfigInvalid { .. } => Some("Check YAML syntax in the configuration file"),
            Self::ConfigMissingField { .. } => {
                Some("Set the field in ~/.lookout/config.yaml or via the matching CLI flag")
            }
            Self::SnapshotTimeout { .. } => {
                Some("The alerts endpoint is slow; the next poll tick will retry automatically")
            }
            Self::PushConnect { .. } => {
                Some("Live push is unavailable; the dashboard continues in poll-only mode")
            }
            Self::TerminalInit { .. } => Some("Try running in a different terminal"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_error() {
        let err = LookoutError::config_not_found("/home/user/.lookout/config.yaml");
        assert!(err.to_string().contains("Configuration not found"));
        assert!(err.is_config_error());
        assert!(err.is_fatal());
        assert!(err.guidance().is_some());
    }

    #[test]
    fn test_snapshot_errors_are_transient() {
        assert!(LookoutError::snapshot_transport("connection refused").is_transient());
        assert!(LookoutError::SnapshotStatus { status: 503 }.is_transient());
        assert!(LookoutError::SnapshotTimeout { timeout_secs: 10 }.is_transient());
        assert!(!LookoutError::SnapshotTimeout { timeout_secs: 10 }.is_fatal());
    }

    #[test]
    fn test_push_errors_are_transient_not_fatal() {
        let err = LookoutError::push_connect("dns failure");
        assert!(err.is_transient());
        assert!(!err.is_fatal());
        assert!(err.guidance().unwrap().contains("poll-only"));
    }

    #[test]
    fn test_internal_is_fatal() {
        assert!(LookoutError::internal("bug").is_fatal());
        assert!(!LookoutError::internal("bug").is_transient());
    }
}
