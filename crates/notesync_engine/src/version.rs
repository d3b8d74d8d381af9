//! Version-control operations across backends.
//!
//! Checkpoints and restores go to every backend that keeps revisions;
//! lookups only consult the primary.

use crate::error::{SyncError, SyncResult};
use crate::registry::BackendHandle;
use notesync_storage::{Identity, Note, NoteId, Revision};
use serde::Serialize;
use tracing::{debug, warn};

/// What one backend did with a checkpoint request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckpointOutcome {
    /// Backend ordinal.
    pub ordinal: usize,
    /// Backend identifier.
    pub kind: String,
    /// The recorded revision, `None` when nothing changed, or the error.
    pub result: Result<Option<Revision>, String>,
}

/// Aggregated checkpoint across backends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckpointResult {
    /// One outcome per attempted backend, in ordinal order.
    pub outcomes: Vec<CheckpointOutcome>,
    /// The first revision any backend recorded.
    pub revision: Option<Revision>,
}

impl CheckpointResult {
    /// Number of backends that failed.
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }
}

/// Checkpoints a note on every version-control backend among the first
/// `max` handles.
///
/// # Errors
///
/// Returns [`SyncError::CheckpointFailed`] when every attempted backend
/// failed. No attempted backend is not an error.
pub fn checkpoint(
    handles: &[BackendHandle],
    max: usize,
    id: &NoteId,
    path: &str,
    message: &str,
    identity: &Identity,
) -> SyncResult<CheckpointResult> {
    let mut outcomes = Vec::new();
    for handle in handles.iter().take(max) {
        let Some(vc) = handle.version_control() else {
            continue;
        };
        let result = vc.checkpoint(id, path, message, identity);
        if let Err(e) = &result {
            warn!(id = %id, backend = handle.kind(), error = %e, "checkpoint failed");
        }
        outcomes.push(CheckpointOutcome {
            ordinal: handle.ordinal(),
            kind: handle.kind().to_string(),
            result: result.map_err(|e| e.to_string()),
        });
    }

    let failures: Vec<String> = outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().err().map(|e| format!("{}: {e}", o.kind)))
        .collect();
    if !outcomes.is_empty() && failures.len() == outcomes.len() {
        return Err(SyncError::CheckpointFailed { failures });
    }

    let revision = outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok())
        .find_map(Clone::clone);
    debug!(id = %id, attempted = outcomes.len(), recorded = revision.is_some(), "checkpoint done");
    Ok(CheckpointResult { outcomes, revision })
}

/// Fetches a revision from the primary backend.
///
/// Returns `None` if the primary keeps no revisions or the lookup fails.
pub fn get_revision(
    primary: &BackendHandle,
    id: &NoteId,
    path: &str,
    revision_id: &str,
    identity: &Identity,
) -> Option<Note> {
    let vc = primary.version_control()?;
    match vc.get_revision(id, path, revision_id, identity) {
        Ok(note) => Some(note),
        Err(e) => {
            warn!(id = %id, revision = revision_id, error = %e, "cannot read revision");
            None
        }
    }
}

/// Lists revisions from the primary backend, newest first.
///
/// Returns an empty list if the primary keeps no revisions or the lookup
/// fails.
pub fn revision_history(
    primary: &BackendHandle,
    id: &NoteId,
    path: &str,
    identity: &Identity,
) -> Vec<Revision> {
    let Some(vc) = primary.version_control() else {
        return Vec::new();
    };
    vc.revision_history(id, path, identity).unwrap_or_else(|e| {
        warn!(id = %id, error = %e, "cannot read revision history");
        Vec::new()
    })
}

/// Restores a revision on every version-control backend.
///
/// Returns the first restored note in ordinal order. Failures count as
/// "no result".
pub fn set_note_revision(
    handles: &[BackendHandle],
    id: &NoteId,
    path: &str,
    revision_id: &str,
    identity: &Identity,
) -> Option<Note> {
    let mut restored = None;
    for handle in handles {
        let Some(vc) = handle.version_control() else {
            continue;
        };
        match vc.set_note_revision(id, path, revision_id, identity) {
            Ok(note) => {
                if restored.is_none() {
                    restored = note;
                }
            }
            Err(e) => {
                warn!(id = %id, backend = handle.kind(), revision = revision_id, error = %e, "restore failed");
            }
        }
    }
    restored
}
