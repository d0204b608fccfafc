//! Error handling module
//!
//! Provides unified error types for snapshot generation and scaffolding.

use std::path::PathBuf;
use thiserror::Error;

/// Snapshot-wide error type
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Identifier collision: entities '{first}' and '{second}' both map to '{identifier}'")]
    IdentifierCollision {
        identifier: String,
        first: String,
        second: String,
    },

    #[error("Failed to write {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration read failure: {0}")]
    ConfigurationRead(String),
}

impl SnapshotError {
    /// Path attached to a write failure, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            SnapshotError::WriteFailure { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Result type alias for snapshot operations
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Helper function to create an invalid argument error
pub fn invalid_argument(msg: impl Into<String>) -> SnapshotError {
    SnapshotError::InvalidArgument(msg.into())
}

/// Helper function to wrap an I/O error with the offending path
pub fn write_failure(path: impl Into<PathBuf>, source: std::io::Error) -> SnapshotError {
    SnapshotError::WriteFailure {
        path: path.into(),
        source,
    }
}

/// Fail with `InvalidArgument` when a required string input is empty
pub(crate) fn require(value: &str, name: &str) -> SnapshotResult<()> {
    if value.trim().is_empty() {
        return Err(invalid_argument(format!("{} must not be empty", name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_failure_carries_path() {
        let err = write_failure(
            "/tmp/Migrations/AppSnapshot.rs",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );

        assert_eq!(
            err.path().map(|p| p.display().to_string()),
            Some("/tmp/Migrations/AppSnapshot.rs".to_string())
        );
        assert!(err.to_string().contains("AppSnapshot.rs"));
    }

    #[test]
    fn test_require_rejects_blank() {
        assert!(require("  ", "owner type").is_err());
        assert!(require("AppContext", "owner type").is_ok());
    }
}
