//! A backend wrapper that fails on demand.

use notesync_storage::{
    Identity, Note, NoteId, NoteListing, NotebookBackend, Revision, SettingInfo, StorageError,
    StorageResult, VersionControl,
};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Backend operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    /// `list`
    List,
    /// `get`
    Get,
    /// `save`
    Save,
    /// `move_note`
    MoveNote,
    /// `move_folder`
    MoveFolder,
    /// `remove_note`
    RemoveNote,
    /// `remove_folder`
    RemoveFolder,
    /// `settings`
    Settings,
    /// `update_settings`
    UpdateSettings,
    /// `checkpoint`
    Checkpoint,
    /// `get_revision`
    GetRevision,
    /// `revision_history`
    RevisionHistory,
    /// `set_note_revision`
    SetNoteRevision,
}

/// Wraps a backend and injects failures.
///
/// An operation fails if it was switched off with [`FaultyBackend::fail`],
/// or if it concerns a note marked with [`FaultyBackend::fail_note`].
/// Version control is exposed exactly when the wrapped backend has it.
///
/// # Example
///
/// ```rust
/// use notesync_storage::{Identity, InMemoryBackend, Note, NotebookBackend};
/// use notesync_testkit::{FaultyBackend, Operation};
/// use std::sync::Arc;
///
/// let backend = FaultyBackend::new(Arc::new(InMemoryBackend::new()));
/// backend.fail(Operation::Save);
/// assert!(backend.save(&Note::new("/a"), &Identity::anonymous()).is_err());
/// assert_eq!(backend.write_attempts(), 1);
/// ```
pub struct FaultyBackend {
    inner: Arc<dyn NotebookBackend>,
    failing_ops: RwLock<BTreeSet<Operation>>,
    failing_notes: RwLock<BTreeSet<NoteId>>,
    writes: AtomicUsize,
}

impl FaultyBackend {
    /// Wraps `inner` with no faults armed.
    pub fn new(inner: Arc<dyn NotebookBackend>) -> Self {
        Self {
            inner,
            failing_ops: RwLock::new(BTreeSet::new()),
            failing_notes: RwLock::new(BTreeSet::new()),
            writes: AtomicUsize::new(0),
        }
    }

    /// Makes every call of `op` fail.
    pub fn fail(&self, op: Operation) {
        self.failing_ops.write().insert(op);
    }

    /// Makes every note-level call concerning `id` fail.
    pub fn fail_note(&self, id: impl Into<NoteId>) {
        self.failing_notes.write().insert(id.into());
    }

    /// Disarms every fault.
    pub fn heal(&self) {
        self.failing_ops.write().clear();
        self.failing_notes.write().clear();
    }

    /// Number of save, move and remove calls seen, failed or not.
    pub fn write_attempts(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// The wrapped backend.
    pub fn inner(&self) -> &Arc<dyn NotebookBackend> {
        &self.inner
    }

    fn check(&self, op: Operation, id: Option<&NoteId>) -> StorageResult<()> {
        if self.failing_ops.read().contains(&op) {
            return Err(StorageError::backend(format!("injected {op:?} failure")));
        }
        if let Some(id) = id {
            if self.failing_notes.read().contains(id) {
                return Err(StorageError::backend(format!("injected failure for note {id}")));
            }
        }
        Ok(())
    }

    fn write(&self, op: Operation, id: Option<&NoteId>) -> StorageResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check(op, id)
    }

    fn inner_vc(&self) -> StorageResult<&dyn VersionControl> {
        self.inner
            .version_control()
            .ok_or_else(|| StorageError::backend("wrapped backend keeps no revisions"))
    }
}

impl NotebookBackend for FaultyBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn list(&self, identity: &Identity) -> StorageResult<NoteListing> {
        self.check(Operation::List, None)?;
        self.inner.list(identity)
    }

    fn get(&self, id: &NoteId, path: &str, identity: &Identity) -> StorageResult<Note> {
        self.check(Operation::Get, Some(id))?;
        self.inner.get(id, path, identity)
    }

    fn save(&self, note: &Note, identity: &Identity) -> StorageResult<()> {
        self.write(Operation::Save, Some(&note.id))?;
        self.inner.save(note, identity)
    }

    fn move_note(
        &self,
        id: &NoteId,
        path: &str,
        new_path: &str,
        identity: &Identity,
    ) -> StorageResult<()> {
        self.write(Operation::MoveNote, Some(id))?;
        self.inner.move_note(id, path, new_path, identity)
    }

    fn move_folder(&self, folder: &str, new_folder: &str, identity: &Identity) -> StorageResult<()> {
        self.write(Operation::MoveFolder, None)?;
        self.inner.move_folder(folder, new_folder, identity)
    }

    fn remove_note(&self, id: &NoteId, path: &str, identity: &Identity) -> StorageResult<()> {
        self.write(Operation::RemoveNote, Some(id))?;
        self.inner.remove_note(id, path, identity)
    }

    fn remove_folder(&self, folder: &str, identity: &Identity) -> StorageResult<()> {
        self.write(Operation::RemoveFolder, None)?;
        self.inner.remove_folder(folder, identity)
    }

    fn settings(&self, identity: &Identity) -> StorageResult<Vec<SettingInfo>> {
        self.check(Operation::Settings, None)?;
        self.inner.settings(identity)
    }

    fn update_settings(
        &self,
        settings: &BTreeMap<String, String>,
        identity: &Identity,
    ) -> StorageResult<()> {
        self.check(Operation::UpdateSettings, None)?;
        self.inner.update_settings(settings, identity)
    }

    fn close(&self) {
        self.inner.close();
    }

    fn version_control(&self) -> Option<&dyn VersionControl> {
        if self.inner.version_control().is_some() {
            Some(self)
        } else {
            None
        }
    }
}

impl VersionControl for FaultyBackend {
    fn checkpoint(
        &self,
        id: &NoteId,
        path: &str,
        message: &str,
        identity: &Identity,
    ) -> StorageResult<Option<Revision>> {
        self.check(Operation::Checkpoint, Some(id))?;
        self.inner_vc()?.checkpoint(id, path, message, identity)
    }

    fn get_revision(
        &self,
        id: &NoteId,
        path: &str,
        revision_id: &str,
        identity: &Identity,
    ) -> StorageResult<Note> {
        self.check(Operation::GetRevision, Some(id))?;
        self.inner_vc()?.get_revision(id, path, revision_id, identity)
    }

    fn revision_history(
        &self,
        id: &NoteId,
        path: &str,
        identity: &Identity,
    ) -> StorageResult<Vec<Revision>> {
        self.check(Operation::RevisionHistory, Some(id))?;
        self.inner_vc()?.revision_history(id, path, identity)
    }

    fn set_note_revision(
        &self,
        id: &NoteId,
        path: &str,
        revision_id: &str,
        identity: &Identity,
    ) -> StorageResult<Option<Note>> {
        self.write(Operation::SetNoteRevision, Some(id))?;
        self.inner_vc()?.set_note_revision(id, path, revision_id, identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notesync_storage::InMemoryBackend;

    fn anon() -> Identity {
        Identity::anonymous()
    }

    #[test]
    fn passes_through_when_healthy() {
        let backend = FaultyBackend::new(Arc::new(InMemoryBackend::new()));
        let note = Note::with_id("A", "/a");
        backend.save(&note, &anon()).unwrap();
        assert!(backend.get(&note.id, "/a", &anon()).is_ok());
        assert_eq!(backend.write_attempts(), 1);
    }

    #[test]
    fn fails_only_marked_note() {
        let backend = FaultyBackend::new(Arc::new(InMemoryBackend::new()));
        backend.fail_note("A");
        assert!(backend.save(&Note::with_id("A", "/a"), &anon()).is_err());
        assert!(backend.save(&Note::with_id("B", "/b"), &anon()).is_ok());

        backend.heal();
        assert!(backend.save(&Note::with_id("A", "/a"), &anon()).is_ok());
    }

    #[test]
    fn mirrors_version_control_capability() {
        let plain = FaultyBackend::new(Arc::new(InMemoryBackend::new()));
        assert!(plain.version_control().is_none());

        let versioned = FaultyBackend::new(Arc::new(InMemoryBackend::versioned()));
        versioned.save(&Note::with_id("A", "/a"), &anon()).unwrap();
        let vc = versioned.version_control().unwrap();
        assert!(vc.checkpoint(&NoteId::new("A"), "/a", "m", &anon()).unwrap().is_some());

        versioned.fail(Operation::Checkpoint);
        assert!(vc.checkpoint(&NoteId::new("A"), "/a", "m", &anon()).is_err());
    }
}
