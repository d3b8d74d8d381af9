//! Error types for backend operations.

use std::io;
use thiserror::Error;

/// Result type for backend operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during backend operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A note could not be serialized or parsed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No note with the given id exists at the given path.
    #[error("note {id} not found at {path}")]
    NotFound {
        /// The requested note id.
        id: String,
        /// The requested note path.
        path: String,
    },

    /// The requested revision does not exist for the note.
    #[error("revision {revision} not found for note {id}")]
    RevisionNotFound {
        /// The note id.
        id: String,
        /// The requested revision id.
        revision: String,
    },

    /// A note or folder path is malformed.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Another process holds the backend's directory lock.
    #[error("notebook directory is locked: {0}")]
    Locked(String),

    /// The backend has been closed.
    #[error("backend is closed")]
    Closed,

    /// A backend-specific failure.
    #[error("{0}")]
    Backend(String),
}

impl StorageError {
    /// Creates a not-found error for a note id and path.
    pub fn not_found(id: impl Into<String>, path: impl Into<String>) -> Self {
        Self::NotFound {
            id: id.into(),
            path: path.into(),
        }
    }

    /// Creates a backend-specific error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// Returns true if the error means the note does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
