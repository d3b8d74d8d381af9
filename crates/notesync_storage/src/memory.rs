//! In-memory notebook backend.

use crate::backend::{NoteListing, NotebookBackend, VersionControl};
use crate::error::{StorageError, StorageResult};
use crate::history::{self, Snapshot};
use crate::note::{Note, NoteId};
use crate::path;
use crate::types::{Identity, Revision, SettingInfo};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// An in-memory notebook backend.
///
/// This backend keeps every note in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral notebooks that don't need persistence
///
/// Created with [`InMemoryBackend::versioned`], it also implements
/// [`VersionControl`] by keeping snapshots per note.
///
/// # Example
///
/// ```rust
/// use notesync_storage::{Identity, InMemoryBackend, Note, NotebookBackend};
///
/// let backend = InMemoryBackend::new();
/// let note = Note::new("/p1/n1");
/// backend.save(&note, &Identity::anonymous()).unwrap();
/// assert_eq!(backend.list(&Identity::anonymous()).unwrap().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    notes: RwLock<BTreeMap<NoteId, Note>>,
    history: Option<RwLock<BTreeMap<NoteId, Vec<Snapshot>>>>,
    settings: RwLock<BTreeMap<String, String>>,
    closed: AtomicBool,
}

impl InMemoryBackend {
    /// Creates an empty backend without revision support.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty backend that keeps note revisions.
    #[must_use]
    pub fn versioned() -> Self {
        Self {
            history: Some(RwLock::new(BTreeMap::new())),
            ..Self::default()
        }
    }

    /// Creates a backend pre-populated with notes.
    #[must_use]
    pub fn with_notes(notes: impl IntoIterator<Item = Note>) -> Self {
        let backend = Self::new();
        backend
            .notes
            .write()
            .extend(notes.into_iter().map(|n| (n.id.clone(), n)));
        backend
    }

    /// Returns a copy of every stored note.
    #[must_use]
    pub fn notes(&self) -> Vec<Note> {
        self.notes.read().values().cloned().collect()
    }

    /// Returns true once [`NotebookBackend::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.is_closed() {
            Err(StorageError::Closed)
        } else {
            Ok(())
        }
    }

    /// Returns the stored note if it lives at `path`.
    fn lookup(&self, id: &NoteId, path: &str) -> StorageResult<Note> {
        let path = path::normalize(path)?;
        match self.notes.read().get(id) {
            Some(note) if note.path == path => Ok(note.clone()),
            _ => Err(StorageError::not_found(id.as_str(), path)),
        }
    }

    fn ensure_path_free(notes: &BTreeMap<NoteId, Note>, id: &NoteId, path: &str) -> StorageResult<()> {
        match notes.values().find(|n| n.path == path && n.id != *id) {
            Some(other) => Err(StorageError::backend(format!(
                "path {path} is already used by note {}",
                other.id
            ))),
            None => Ok(()),
        }
    }

    fn snapshots(&self, id: &NoteId) -> Vec<Snapshot> {
        self.history
            .as_ref()
            .and_then(|h| h.read().get(id).cloned())
            .unwrap_or_default()
    }
}

impl NotebookBackend for InMemoryBackend {
    fn name(&self) -> &str {
        "InMemoryBackend"
    }

    fn list(&self, _identity: &Identity) -> StorageResult<NoteListing> {
        self.ensure_open()?;
        Ok(self
            .notes
            .read()
            .values()
            .map(|n| (n.id.clone(), n.summary()))
            .collect())
    }

    fn get(&self, id: &NoteId, path: &str, _identity: &Identity) -> StorageResult<Note> {
        self.ensure_open()?;
        self.lookup(id, path)
    }

    fn save(&self, note: &Note, _identity: &Identity) -> StorageResult<()> {
        self.ensure_open()?;
        let mut stored = note.clone();
        stored.path = path::normalize(&note.path)?;

        let mut notes = self.notes.write();
        Self::ensure_path_free(&notes, &stored.id, &stored.path)?;
        notes.insert(stored.id.clone(), stored);
        Ok(())
    }

    fn move_note(
        &self,
        id: &NoteId,
        path: &str,
        new_path: &str,
        _identity: &Identity,
    ) -> StorageResult<()> {
        self.ensure_open()?;
        let path = path::normalize(path)?;
        let new_path = path::normalize(new_path)?;

        let mut notes = self.notes.write();
        Self::ensure_path_free(&notes, id, &new_path)?;
        match notes.get_mut(id) {
            Some(note) if note.path == path => {
                note.path = new_path;
                Ok(())
            }
            _ => Err(StorageError::not_found(id.as_str(), path)),
        }
    }

    fn move_folder(
        &self,
        folder: &str,
        new_folder: &str,
        _identity: &Identity,
    ) -> StorageResult<()> {
        self.ensure_open()?;
        let folder = path::normalize(folder)?;
        let new_folder = path::normalize(new_folder)?;

        let mut notes = self.notes.write();
        let moves: Vec<(NoteId, String)> = notes
            .values()
            .filter_map(|note| {
                path::rebase(&note.path, &folder, &new_folder).map(|p| (note.id.clone(), p))
            })
            .collect();

        // Rebasing is injective, so only notes left in place can collide.
        for (_, target) in &moves {
            if let Some(other) = notes
                .values()
                .find(|n| n.path == *target && !path::is_within(&n.path, &folder))
            {
                return Err(StorageError::backend(format!(
                    "path {target} is already used by note {}",
                    other.id
                )));
            }
        }

        for (id, moved) in moves {
            if let Some(note) = notes.get_mut(&id) {
                note.path = moved;
            }
        }
        Ok(())
    }

    fn remove_note(&self, id: &NoteId, path: &str, _identity: &Identity) -> StorageResult<()> {
        self.ensure_open()?;
        let path = path::normalize(path)?;

        let mut notes = self.notes.write();
        match notes.get(id) {
            Some(note) if note.path == path => {
                notes.remove(id);
                Ok(())
            }
            _ => Err(StorageError::not_found(id.as_str(), path)),
        }
    }

    fn remove_folder(&self, folder: &str, _identity: &Identity) -> StorageResult<()> {
        self.ensure_open()?;
        let folder = path::normalize(folder)?;
        self.notes
            .write()
            .retain(|_, note| !path::is_within(&note.path, &folder));
        Ok(())
    }

    fn settings(&self, _identity: &Identity) -> StorageResult<Vec<SettingInfo>> {
        self.ensure_open()?;
        Ok(self
            .settings
            .read()
            .iter()
            .map(|(name, value)| SettingInfo::input(name, value))
            .collect())
    }

    fn update_settings(
        &self,
        settings: &BTreeMap<String, String>,
        _identity: &Identity,
    ) -> StorageResult<()> {
        self.ensure_open()?;
        self.settings
            .write()
            .extend(settings.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn version_control(&self) -> Option<&dyn VersionControl> {
        if self.history.is_some() {
            Some(self)
        } else {
            None
        }
    }
}

impl VersionControl for InMemoryBackend {
    fn checkpoint(
        &self,
        id: &NoteId,
        path: &str,
        message: &str,
        _identity: &Identity,
    ) -> StorageResult<Option<Revision>> {
        self.ensure_open()?;
        let log = self
            .history
            .as_ref()
            .ok_or_else(|| StorageError::backend("revisions are not enabled"))?;
        let note = self.lookup(id, path)?;

        let mut log = log.write();
        Ok(history::record(
            log.entry(id.clone()).or_default(),
            &note,
            message,
        ))
    }

    fn get_revision(
        &self,
        id: &NoteId,
        _path: &str,
        revision_id: &str,
        _identity: &Identity,
    ) -> StorageResult<Note> {
        self.ensure_open()?;
        let snapshots = self.snapshots(id);
        history::find(&snapshots, revision_id)
            .map(|s| s.note.clone())
            .ok_or_else(|| StorageError::RevisionNotFound {
                id: id.to_string(),
                revision: revision_id.to_string(),
            })
    }

    fn revision_history(
        &self,
        id: &NoteId,
        _path: &str,
        _identity: &Identity,
    ) -> StorageResult<Vec<Revision>> {
        self.ensure_open()?;
        Ok(history::revisions(&self.snapshots(id)))
    }

    fn set_note_revision(
        &self,
        id: &NoteId,
        path: &str,
        revision_id: &str,
        identity: &Identity,
    ) -> StorageResult<Option<Note>> {
        let mut restored = self.get_revision(id, path, revision_id, identity)?;
        restored.path = path::normalize(path)?;
        self.save(&restored, identity)?;
        Ok(Some(restored))
    }
}
