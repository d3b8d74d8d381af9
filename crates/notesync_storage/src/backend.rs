//! Backend contract definitions.

use crate::error::StorageResult;
use crate::note::{Note, NoteId, NoteSummary};
use crate::types::{Identity, Revision, SettingInfo};
use std::collections::BTreeMap;

/// Notes known to a backend, keyed by id.
pub type NoteListing = BTreeMap<NoteId, NoteSummary>;

/// A notebook storage backend.
///
/// Backends own notes addressed by id and path. The sync engine never
/// inspects concrete backend types; it only talks to this trait and, where
/// available, to [`VersionControl`].
///
/// # Invariants
///
/// - A note's id never changes; `move_note` changes only its path
/// - At any instant a path identifies at most one note
/// - `close` is idempotent
/// - Backends must be `Send + Sync`; each owns its own locking
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For tests and ephemeral notebooks
/// - [`super::FileBackend`] - One JSON document per note on disk
pub trait NotebookBackend: Send + Sync {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// Lists every note visible to `identity`.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing cannot be produced.
    fn list(&self, identity: &Identity) -> StorageResult<NoteListing>;

    /// Fetches the full note stored under `id` at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorageError::NotFound`] if no such note exists.
    fn get(&self, id: &NoteId, path: &str, identity: &Identity) -> StorageResult<Note>;

    /// Creates or replaces a note.
    ///
    /// Saving a note whose id already exists at another path relocates it.
    ///
    /// # Errors
    ///
    /// Returns an error if the note cannot be written.
    fn save(&self, note: &Note, identity: &Identity) -> StorageResult<()>;

    /// Moves one note from `path` to `new_path`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorageError::NotFound`] if the note does not exist.
    fn move_note(
        &self,
        id: &NoteId,
        path: &str,
        new_path: &str,
        identity: &Identity,
    ) -> StorageResult<()>;

    /// Moves every note under `folder` to the same relative place under
    /// `new_folder`.
    ///
    /// # Errors
    ///
    /// Returns an error if any note cannot be moved.
    fn move_folder(&self, folder: &str, new_folder: &str, identity: &Identity)
        -> StorageResult<()>;

    /// Removes one note.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorageError::NotFound`] if the note does not exist.
    fn remove_note(&self, id: &NoteId, path: &str, identity: &Identity) -> StorageResult<()>;

    /// Removes every note under `folder`.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails.
    fn remove_folder(&self, folder: &str, identity: &Identity) -> StorageResult<()>;

    /// Returns the backend's settings descriptors.
    ///
    /// # Errors
    ///
    /// Returns an error if settings cannot be read.
    fn settings(&self, identity: &Identity) -> StorageResult<Vec<SettingInfo>>;

    /// Applies setting updates keyed by setting name.
    ///
    /// # Errors
    ///
    /// Returns an error if a setting value is rejected.
    fn update_settings(
        &self,
        settings: &BTreeMap<String, String>,
        identity: &Identity,
    ) -> StorageResult<()>;

    /// Releases backend resources. Safe to call more than once.
    fn close(&self);

    /// Returns the version-control capability, if this backend has one.
    fn version_control(&self) -> Option<&dyn VersionControl> {
        None
    }
}

/// Extended contract for backends that keep note revisions.
pub trait VersionControl: NotebookBackend {
    /// Records the current state of a note.
    ///
    /// Returns `None` when there is nothing new to record.
    ///
    /// # Errors
    ///
    /// Returns an error if the note cannot be read or the checkpoint
    /// cannot be written.
    fn checkpoint(
        &self,
        id: &NoteId,
        path: &str,
        message: &str,
        identity: &Identity,
    ) -> StorageResult<Option<Revision>>;

    /// Fetches a note as it was at `revision_id`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorageError::RevisionNotFound`] for unknown revisions.
    fn get_revision(
        &self,
        id: &NoteId,
        path: &str,
        revision_id: &str,
        identity: &Identity,
    ) -> StorageResult<Note>;

    /// Lists revisions of a note, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if history cannot be read.
    fn revision_history(
        &self,
        id: &NoteId,
        path: &str,
        identity: &Identity,
    ) -> StorageResult<Vec<Revision>>;

    /// Restores a note to `revision_id` and returns the restored note.
    ///
    /// # Errors
    ///
    /// Returns an error if the revision cannot be restored.
    fn set_note_revision(
        &self,
        id: &NoteId,
        path: &str,
        revision_id: &str,
        identity: &Identity,
    ) -> StorageResult<Option<Note>>;
}
