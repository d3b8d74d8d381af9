//! Error types for the sync engine.

use notesync_storage::StorageError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// A backend call failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A backend ordinal outside the initialized range.
    #[error("backend index {index} out of range (have {count})")]
    IndexOutOfRange {
        /// Requested ordinal.
        index: usize,
        /// Number of initialized backends.
        count: usize,
    },

    /// The engine could not be configured.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A backend identifier is not in the catalog.
    #[error("unknown backend: {0}")]
    UnknownBackend(String),

    /// Every version-control backend failed to checkpoint.
    #[error("checkpoint failed on every backend: {}", .failures.join("; "))]
    CheckpointFailed {
        /// One message per failed backend.
        failures: Vec<String>,
    },
}

impl SyncError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Returns true if the error means the note does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::Storage(e) if e.is_not_found())
    }

    /// Returns true if repeating the call may succeed.
    ///
    /// I/O failures and lock contention are transient; configuration and
    /// addressing mistakes are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Storage(StorageError::Io(_) | StorageError::Locked(_)) => true,
            SyncError::CheckpointFailed { .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn retryable_errors() {
        let io = SyncError::from(StorageError::Io(io::Error::other("disk busy")));
        assert!(io.is_retryable());
        assert!(SyncError::from(StorageError::Locked("/nb".into())).is_retryable());
        assert!(!SyncError::configuration("no backend").is_retryable());
        assert!(!SyncError::IndexOutOfRange { index: 3, count: 2 }.is_retryable());
    }

    #[test]
    fn not_found_passes_through() {
        let err = SyncError::from(StorageError::not_found("A", "/a"));
        assert!(err.is_not_found());
        assert!(!SyncError::UnknownBackend("s3".into()).is_not_found());
    }

    #[test]
    fn error_display() {
        let err = SyncError::IndexOutOfRange { index: 2, count: 1 };
        assert_eq!(err.to_string(), "backend index 2 out of range (have 1)");

        let err = SyncError::CheckpointFailed {
            failures: vec!["memory: closed".into(), "file: locked".into()],
        };
        assert!(err.to_string().contains("memory: closed; file: locked"));
    }
}
