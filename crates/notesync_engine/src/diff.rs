//! Partitioning two note listings into sync actions.

use chrono::{DateTime, Utc};
use notesync_storage::{Identity, Note, NoteListing, NoteSummary, NotebookBackend};
use tracing::{debug, warn};

/// Returns the most recent paragraph timestamp of a note.
///
/// Created, started and finished times all count. A note without any
/// timestamp is as old as the Unix epoch.
pub fn freshness(note: &Note) -> DateTime<Utc> {
    note.paragraphs
        .iter()
        .flat_map(|p| p.timestamps())
        .max()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// The actions one diff produced.
///
/// Entries in `push` carry the source-side summary; entries in `pull` and
/// `delete` carry the destination-side summary.
///
/// # Invariants
///
/// - A note id appears in at most one of the three sets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    /// Notes to copy from source to destination.
    pub push: Vec<NoteSummary>,
    /// Notes to copy from destination to source.
    pub pull: Vec<NoteSummary>,
    /// Notes to remove from the destination.
    pub delete: Vec<NoteSummary>,
}

impl SyncPlan {
    /// Returns true if the plan has nothing to do.
    pub fn is_empty(&self) -> bool {
        self.push.is_empty() && self.pull.is_empty() && self.delete.is_empty()
    }

    /// Total number of planned actions.
    pub fn len(&self) -> usize {
        self.push.len() + self.pull.len() + self.delete.len()
    }
}

/// Compares two listings and decides which way each note travels.
///
/// Notes present on both sides are fetched so their freshness can be
/// compared; a failed fetch skips the note.
pub fn diff(
    source: &dyn NotebookBackend,
    dest: &dyn NotebookBackend,
    source_notes: &NoteListing,
    dest_notes: &NoteListing,
    one_way: bool,
    identity: &Identity,
) -> SyncPlan {
    let mut plan = SyncPlan::default();

    for (id, src) in source_notes {
        let Some(dst) = dest_notes.get(id) else {
            plan.push.push(src.clone());
            continue;
        };

        let src_note = match source.get(id, &src.path, identity) {
            Ok(note) => note,
            Err(e) => {
                warn!(id = %id, backend = source.name(), error = %e, "cannot read note, skipping");
                continue;
            }
        };
        let dst_note = match dest.get(id, &dst.path, identity) {
            Ok(note) => note,
            Err(e) => {
                warn!(id = %id, backend = dest.name(), error = %e, "cannot read note, skipping");
                continue;
            }
        };

        let src_time = freshness(&src_note);
        let dst_time = freshness(&dst_note);
        if src_time == dst_time {
            continue;
        }
        if one_way || src_time > dst_time {
            debug!(id = %id, "source is newer");
            plan.push.push(src.clone());
        } else {
            debug!(id = %id, "destination is newer");
            plan.pull.push(dst.clone());
        }
    }

    for (id, dst) in dest_notes {
        if source_notes.contains_key(id) {
            continue;
        }
        if one_way {
            plan.delete.push(dst.clone());
        } else {
            plan.pull.push(dst.clone());
        }
    }

    plan
}
