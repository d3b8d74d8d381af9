//! Applying a [`SyncPlan`] to a pair of backends.

use crate::diff::SyncPlan;
use crate::error::SyncResult;
use notesync_storage::{Identity, NoteId, NoteSummary, NotebookBackend, StorageResult};
use serde::Serialize;
use tracing::{error, info, warn};

/// Which part of a plan an item belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncDirection {
    /// Source to destination.
    Push,
    /// Destination to source.
    Pull,
    /// Removal from the destination.
    Delete,
}

/// One item that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncFailure {
    /// The note involved.
    pub id: NoteId,
    /// The action that failed.
    pub direction: SyncDirection,
    /// Error message from the backend.
    pub error: String,
}

/// Outcome of one reconcile pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Notes copied to the destination.
    pub pushed: Vec<NoteId>,
    /// Notes copied to the source.
    pub pulled: Vec<NoteId>,
    /// Notes removed from the destination.
    pub deleted: Vec<NoteId>,
    /// Items that were skipped because of an error.
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    /// Returns true if nothing failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of notes changed on either side.
    pub fn changed(&self) -> usize {
        self.pushed.len() + self.pulled.len() + self.deleted.len()
    }
}

/// Applies `plan` in listing order: pushes, then pulls, then deletions.
///
/// A push or pull that fails is logged, recorded in the report, and
/// skipped. Deletions stop at the first failure and return it, unless
/// `isolate` is set, in which case they are treated like pushes.
///
/// # Errors
///
/// Returns the first deletion failure when `isolate` is false.
pub fn reconcile(
    plan: &SyncPlan,
    source: &dyn NotebookBackend,
    dest: &dyn NotebookBackend,
    identity: &Identity,
    isolate: bool,
) -> SyncResult<SyncReport> {
    let mut report = SyncReport::default();

    for summary in &plan.push {
        match copy_note(summary, source, dest, identity) {
            Ok(()) => report.pushed.push(summary.id.clone()),
            Err(e) => {
                error!(id = %summary.id, from = source.name(), to = dest.name(), error = %e, "push failed");
                report.failures.push(failure(summary, SyncDirection::Push, &e));
            }
        }
    }

    for summary in &plan.pull {
        match copy_note(summary, dest, source, identity) {
            Ok(()) => report.pulled.push(summary.id.clone()),
            Err(e) => {
                error!(id = %summary.id, from = dest.name(), to = source.name(), error = %e, "pull failed");
                report.failures.push(failure(summary, SyncDirection::Pull, &e));
            }
        }
    }

    for summary in &plan.delete {
        match dest.remove_note(&summary.id, &summary.path, identity) {
            Ok(()) => report.deleted.push(summary.id.clone()),
            Err(e) if isolate => {
                warn!(id = %summary.id, backend = dest.name(), error = %e, "delete failed, continuing");
                report.failures.push(failure(summary, SyncDirection::Delete, &e));
            }
            Err(e) => {
                error!(id = %summary.id, backend = dest.name(), error = %e, "delete failed, aborting");
                return Err(e.into());
            }
        }
    }

    info!(
        pushed = report.pushed.len(),
        pulled = report.pulled.len(),
        deleted = report.deleted.len(),
        failed = report.failures.len(),
        "reconcile finished"
    );
    Ok(report)
}

fn copy_note(
    summary: &NoteSummary,
    from: &dyn NotebookBackend,
    to: &dyn NotebookBackend,
    identity: &Identity,
) -> StorageResult<()> {
    let note = from.get(&summary.id, &summary.path, identity)?;
    to.save(&note, identity)
}

fn failure(summary: &NoteSummary, direction: SyncDirection, e: &impl std::fmt::Display) -> SyncFailure {
    SyncFailure {
        id: summary.id.clone(),
        direction,
        error: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notesync_storage::{InMemoryBackend, Note};

    fn anon() -> Identity {
        Identity::anonymous()
    }

    #[test]
    fn push_and_pull_copy_notes() {
        let src = InMemoryBackend::with_notes([Note::with_id("A", "/a")]);
        let dst = InMemoryBackend::with_notes([Note::with_id("B", "/b")]);
        let plan = SyncPlan {
            push: vec![NoteSummary::new("A", "/a")],
            pull: vec![NoteSummary::new("B", "/b")],
            delete: Vec::new(),
        };

        let report = reconcile(&plan, &src, &dst, &anon(), false).unwrap();
        assert_eq!(report.pushed, vec![NoteId::new("A")]);
        assert_eq!(report.pulled, vec![NoteId::new("B")]);
        assert!(report.is_clean());
        assert_eq!(src.list(&anon()).unwrap().len(), 2);
        assert_eq!(dst.list(&anon()).unwrap().len(), 2);
    }

    #[test]
    fn push_failure_is_recorded_and_skipped() {
        let src = InMemoryBackend::with_notes([Note::with_id("B", "/b")]);
        let dst = InMemoryBackend::new();
        let plan = SyncPlan {
            push: vec![NoteSummary::new("A", "/missing"), NoteSummary::new("B", "/b")],
            ..SyncPlan::default()
        };

        let report = reconcile(&plan, &src, &dst, &anon(), false).unwrap();
        assert_eq!(report.pushed, vec![NoteId::new("B")]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].id, NoteId::new("A"));
        assert_eq!(report.failures[0].direction, SyncDirection::Push);
    }

    #[test]
    fn delete_failure_aborts_by_default() {
        let src = InMemoryBackend::new();
        let dst = InMemoryBackend::with_notes([Note::with_id("B", "/b")]);
        let plan = SyncPlan {
            delete: vec![NoteSummary::new("A", "/gone"), NoteSummary::new("B", "/b")],
            ..SyncPlan::default()
        };

        let err = reconcile(&plan, &src, &dst, &anon(), false).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(dst.list(&anon()).unwrap().len(), 1);
    }

    #[test]
    fn delete_failure_is_isolated_when_asked() {
        let src = InMemoryBackend::new();
        let dst = InMemoryBackend::with_notes([Note::with_id("B", "/b")]);
        let plan = SyncPlan {
            delete: vec![NoteSummary::new("A", "/gone"), NoteSummary::new("B", "/b")],
            ..SyncPlan::default()
        };

        let report = reconcile(&plan, &src, &dst, &anon(), true).unwrap();
        assert_eq!(report.deleted, vec![NoteId::new("B")]);
        assert_eq!(report.failures[0].direction, SyncDirection::Delete);
        assert!(dst.list(&anon()).unwrap().is_empty());
    }
}
