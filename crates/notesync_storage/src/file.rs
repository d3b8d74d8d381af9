//! File-based notebook backend.
//!
//! Layout of a notebook directory:
//!
//! ```text
//! <root>/
//! ├─ LOCK                     # Advisory lock for single-writer
//! ├─ .revisions/<id>.json     # Checkpoints (versioned mode only)
//! └─ <folders>/<name>_<id>.json
//! ```
//!
//! A note's path is derived from where its file lives, so listing never has
//! to parse note bodies.

use crate::backend::{NoteListing, NotebookBackend, VersionControl};
use crate::error::{StorageError, StorageResult};
use crate::history::{self, Snapshot};
use crate::note::{Note, NoteId, NoteSummary};
use crate::parser::NoteParser;
use crate::path;
use crate::types::{Identity, Revision, SettingInfo};
use fs2::FileExt;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Setting key holding the notebook directory.
pub const NOTEBOOK_DIR_SETTING: &str = "notebook_dir";

const LOCK_FILE: &str = "LOCK";
const REVISIONS_DIR: &str = ".revisions";
const NOTE_SUFFIX: &str = ".json";

/// Where one note lives on disk.
struct Location {
    dir: PathBuf,
    name: String,
    file: PathBuf,
}

/// A note file found while scanning.
struct StoredNote {
    id: NoteId,
    path: String,
    file: PathBuf,
}

/// A file-based notebook backend.
///
/// Each note is one document written through the configured
/// [`NoteParser`]. The backend holds an exclusive `LOCK` file in its root
/// until [`NotebookBackend::close`] is called, so two processes cannot
/// write the same notebook directory.
///
/// Opened with [`FileBackend::open_versioned`], it also implements
/// [`VersionControl`], keeping checkpoints under `.revisions/`.
///
/// # Example
///
/// ```no_run
/// use notesync_storage::{FileBackend, Identity, JsonNoteParser, Note, NotebookBackend};
/// use std::path::Path;
/// use std::sync::Arc;
///
/// let backend = FileBackend::open(Path::new("notebook"), Arc::new(JsonNoteParser::pretty())).unwrap();
/// backend.save(&Note::new("/p1/n1"), &Identity::anonymous()).unwrap();
/// backend.close();
/// ```
pub struct FileBackend {
    root: RwLock<PathBuf>,
    lock: Mutex<Option<File>>,
    /// Note id to file, built on first write and kept current by this
    /// backend's own changes. Valid because `LOCK` excludes other writers.
    index: Mutex<Option<BTreeMap<NoteId, PathBuf>>>,
    parser: Arc<dyn NoteParser>,
    versioned: bool,
}

impl FileBackend {
    /// Opens or creates a notebook directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Locked`] if another handle holds the
    /// directory, or an I/O error if it cannot be created.
    pub fn open(root: &Path, parser: Arc<dyn NoteParser>) -> StorageResult<Self> {
        Self::open_inner(root, parser, false)
    }

    /// Opens or creates a notebook directory that keeps revisions.
    ///
    /// # Errors
    ///
    /// Same as [`FileBackend::open`].
    pub fn open_versioned(root: &Path, parser: Arc<dyn NoteParser>) -> StorageResult<Self> {
        Self::open_inner(root, parser, true)
    }

    fn open_inner(root: &Path, parser: Arc<dyn NoteParser>, versioned: bool) -> StorageResult<Self> {
        let lock = acquire_lock(root)?;
        debug!(root = %root.display(), versioned, "opened notebook directory");
        Ok(Self {
            root: RwLock::new(root.to_path_buf()),
            lock: Mutex::new(Some(lock)),
            index: Mutex::new(None),
            parser,
            versioned,
        })
    }

    /// Returns the notebook directory.
    #[must_use]
    pub fn root(&self) -> PathBuf {
        self.root.read().clone()
    }

    fn open_root(&self) -> StorageResult<PathBuf> {
        if self.lock.lock().is_none() {
            return Err(StorageError::Closed);
        }
        Ok(self.root())
    }

    fn read_note(&self, location: &Location, id: &NoteId, path: &str) -> StorageResult<Note> {
        if !location.file.is_file() {
            return Err(StorageError::not_found(id.as_str(), path));
        }
        let mut note = self.parser.from_text(&fs::read_to_string(&location.file)?)?;
        if note.id != *id {
            return Err(StorageError::backend(format!(
                "{} holds note {} instead of {id}",
                location.file.display(),
                note.id
            )));
        }
        note.path = path.to_string();
        Ok(note)
    }

    /// Runs `f` with the index locked, building it from disk if needed.
    fn with_index<T>(
        &self,
        root: &Path,
        f: impl FnOnce(&mut BTreeMap<NoteId, PathBuf>) -> StorageResult<T>,
    ) -> StorageResult<T> {
        let mut guard = self.index.lock();
        if guard.is_none() {
            *guard = Some(scan(root)?.into_iter().map(|s| (s.id, s.file)).collect());
        }
        f(guard.get_or_insert_with(BTreeMap::new))
    }

    fn forget_index(&self) {
        *self.index.lock() = None;
    }

    fn write_note(&self, location: &Location, note: &Note) -> StorageResult<()> {
        write_atomic(&location.file, &self.parser.to_text(note)?)
    }

    fn reroot(&self, new_root: &Path) -> StorageResult<()> {
        let mut lock = self.lock.lock();
        if lock.is_none() {
            return Err(StorageError::Closed);
        }
        if *self.root.read() == new_root {
            return Ok(());
        }
        let new_lock = acquire_lock(new_root)?;
        *lock = Some(new_lock);
        *self.root.write() = new_root.to_path_buf();
        self.forget_index();
        debug!(root = %new_root.display(), "notebook directory changed");
        Ok(())
    }

    fn revisions_file(root: &Path, id: &NoteId) -> PathBuf {
        root.join(REVISIONS_DIR).join(format!("{id}{NOTE_SUFFIX}"))
    }

    fn load_snapshots(&self, root: &Path, id: &NoteId) -> StorageResult<Vec<Snapshot>> {
        let file = Self::revisions_file(root, id);
        if !file.is_file() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&fs::read_to_string(file)?)?)
    }

    fn store_snapshots(&self, root: &Path, id: &NoteId, snapshots: &[Snapshot]) -> StorageResult<()> {
        let text = serde_json::to_string(snapshots)?;
        write_atomic(&Self::revisions_file(root, id), &text)
    }
}

impl fmt::Debug for FileBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let root = self.root();
        let open = self.lock.lock().is_some();
        f.debug_struct("FileBackend")
            .field("root", &root)
            .field("versioned", &self.versioned)
            .field("open", &open)
            .finish()
    }
}

impl NotebookBackend for FileBackend {
    fn name(&self) -> &str {
        if self.versioned {
            "VersionedFileBackend"
        } else {
            "FileBackend"
        }
    }

    fn list(&self, _identity: &Identity) -> StorageResult<NoteListing> {
        let root = self.open_root()?;
        let mut listing = NoteListing::new();
        for stored in scan(&root)? {
            if let Some(previous) = listing.get(&stored.id) {
                warn!(
                    id = %stored.id,
                    first = %previous.path,
                    second = %stored.path,
                    "note id stored twice, keeping the later path"
                );
            }
            listing.insert(stored.id.clone(), NoteSummary::new(stored.id, stored.path));
        }
        Ok(listing)
    }

    fn get(&self, id: &NoteId, path: &str, _identity: &Identity) -> StorageResult<Note> {
        let root = self.open_root()?;
        let path = path::normalize(path)?;
        let location = locate(&root, id, &path)?;
        self.read_note(&location, id, &path)
    }

    fn save(&self, note: &Note, _identity: &Identity) -> StorageResult<()> {
        let root = self.open_root()?;
        let path = path::normalize(&note.path)?;
        let location = locate(&root, &note.id, &path)?;

        self.with_index(&root, |index| {
            ensure_path_free(&location, &note.id)?;
            let mut stored = note.clone();
            stored.path = path;
            self.write_note(&location, &stored)?;

            // Drop the copy left at the note's previous path.
            if let Some(previous) = index.insert(note.id.clone(), location.file.clone()) {
                if previous != location.file {
                    debug!(id = %note.id, from = %previous.display(), "removing relocated note file");
                    remove_if_present(&previous)?;
                }
            }
            Ok(())
        })
    }

    fn move_note(
        &self,
        id: &NoteId,
        path: &str,
        new_path: &str,
        _identity: &Identity,
    ) -> StorageResult<()> {
        let root = self.open_root()?;
        let path = path::normalize(path)?;
        let new_path = path::normalize(new_path)?;
        let from = locate(&root, id, &path)?;
        let to = locate(&root, id, &new_path)?;
        if from.file == to.file {
            return Ok(());
        }

        self.with_index(&root, |index| {
            let mut note = self.read_note(&from, id, &path)?;
            ensure_path_free(&to, id)?;
            note.path = new_path;
            self.write_note(&to, &note)?;
            fs::remove_file(&from.file)?;
            index.insert(id.clone(), to.file.clone());
            Ok(())
        })
    }

    fn move_folder(
        &self,
        folder: &str,
        new_folder: &str,
        _identity: &Identity,
    ) -> StorageResult<()> {
        let root = self.open_root()?;
        let from = folder_dir(&root, folder)?;
        let to = folder_dir(&root, new_folder)?;
        if !from.is_dir() {
            return Ok(());
        }
        if to.exists() {
            return Err(StorageError::backend(format!(
                "target folder {new_folder} already exists"
            )));
        }
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(from, to)?;
        self.forget_index();
        Ok(())
    }

    fn remove_note(&self, id: &NoteId, path: &str, _identity: &Identity) -> StorageResult<()> {
        let root = self.open_root()?;
        let path = path::normalize(path)?;
        let location = locate(&root, id, &path)?;
        if !location.file.is_file() {
            return Err(StorageError::not_found(id.as_str(), path));
        }
        fs::remove_file(&location.file)?;
        if let Some(index) = self.index.lock().as_mut() {
            if index.get(id) == Some(&location.file) {
                index.remove(id);
            }
        }
        Ok(())
    }

    fn remove_folder(&self, folder: &str, _identity: &Identity) -> StorageResult<()> {
        let root = self.open_root()?;
        let dir = folder_dir(&root, folder)?;
        if dir.is_dir() {
            fs::remove_dir_all(dir)?;
            self.forget_index();
        }
        Ok(())
    }

    fn settings(&self, _identity: &Identity) -> StorageResult<Vec<SettingInfo>> {
        let root = self.open_root()?;
        Ok(vec![SettingInfo::input(
            NOTEBOOK_DIR_SETTING,
            root.display().to_string(),
        )])
    }

    fn update_settings(
        &self,
        settings: &BTreeMap<String, String>,
        _identity: &Identity,
    ) -> StorageResult<()> {
        for (name, value) in settings {
            match name.as_str() {
                NOTEBOOK_DIR_SETTING => self.reroot(Path::new(value))?,
                other => {
                    return Err(StorageError::backend(format!("unknown setting {other}")));
                }
            }
        }
        Ok(())
    }

    fn close(&self) {
        if self.lock.lock().take().is_some() {
            debug!(root = %self.root.read().display(), "closed notebook directory");
        }
    }

    fn version_control(&self) -> Option<&dyn VersionControl> {
        if self.versioned {
            Some(self)
        } else {
            None
        }
    }
}

impl VersionControl for FileBackend {
    fn checkpoint(
        &self,
        id: &NoteId,
        path: &str,
        message: &str,
        identity: &Identity,
    ) -> StorageResult<Option<Revision>> {
        let note = self.get(id, path, identity)?;
        let root = self.open_root()?;
        let mut snapshots = self.load_snapshots(&root, id)?;
        let revision = history::record(&mut snapshots, &note, message);
        if revision.is_some() {
            self.store_snapshots(&root, id, &snapshots)?;
        }
        Ok(revision)
    }

    fn get_revision(
        &self,
        id: &NoteId,
        _path: &str,
        revision_id: &str,
        _identity: &Identity,
    ) -> StorageResult<Note> {
        let root = self.open_root()?;
        let snapshots = self.load_snapshots(&root, id)?;
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
        let root = self.open_root()?;
        Ok(history::revisions(&self.load_snapshots(&root, id)?))
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

fn acquire_lock(root: &Path) -> StorageResult<File> {
    fs::create_dir_all(root)?;
    let lock_file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(root.join(LOCK_FILE))?;
    if lock_file.try_lock_exclusive().is_err() {
        return Err(StorageError::Locked(root.display().to_string()));
    }
    Ok(lock_file)
}

fn validate_id(id: &NoteId) -> StorageResult<()> {
    let id = id.as_str();
    if id.is_empty() || id.contains(['_', '/', '\\', '.']) {
        return Err(StorageError::InvalidPath(format!("unusable note id {id:?}")));
    }
    Ok(())
}

/// Splits a normalized path into directory segments, rejecting hidden names.
fn segments(path: &str) -> StorageResult<Vec<&str>> {
    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if parts.iter().any(|s| s.starts_with('.')) || parts.first() == Some(&LOCK_FILE) {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(parts)
}

fn locate(root: &Path, id: &NoteId, path: &str) -> StorageResult<Location> {
    validate_id(id)?;
    let mut parts = segments(path)?;
    let name = parts
        .pop()
        .ok_or_else(|| StorageError::InvalidPath(path.to_string()))?
        .to_string();
    let dir = parts.iter().fold(root.to_path_buf(), |dir, part| dir.join(part));
    let file = dir.join(format!("{name}_{id}{NOTE_SUFFIX}"));
    Ok(Location { dir, name, file })
}

fn folder_dir(root: &Path, folder: &str) -> StorageResult<PathBuf> {
    let folder = path::normalize(folder)?;
    let parts = segments(&folder)?;
    if parts.is_empty() {
        return Err(StorageError::InvalidPath(
            "the notebook root is not a movable folder".into(),
        ));
    }
    Ok(parts.iter().fold(root.to_path_buf(), |dir, part| dir.join(part)))
}

fn parse_file_name(file_name: &str) -> Option<(&str, &str)> {
    let stem = file_name.strip_suffix(NOTE_SUFFIX)?;
    let (name, id) = stem.rsplit_once('_')?;
    if name.is_empty() || id.is_empty() {
        None
    } else {
        Some((name, id))
    }
}

fn ensure_path_free(location: &Location, id: &NoteId) -> StorageResult<()> {
    if !location.dir.is_dir() {
        return Ok(());
    }
    for entry in fs::read_dir(&location.dir)? {
        let file_name = entry?.file_name();
        let Some((name, other)) = file_name.to_str().and_then(parse_file_name) else {
            continue;
        };
        if name == location.name && other != id.as_str() {
            return Err(StorageError::backend(format!(
                "path of note {id} is already used by note {other}"
            )));
        }
    }
    Ok(())
}

fn scan(root: &Path) -> StorageResult<Vec<StoredNote>> {
    let mut found = Vec::new();
    scan_dir(root, "", &mut found)?;
    Ok(found)
}

fn scan_dir(dir: &Path, prefix: &str, found: &mut Vec<StoredNote>) -> StorageResult<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if file_name.starts_with('.') || (prefix.is_empty() && file_name == LOCK_FILE) {
            continue;
        }
        if entry.file_type()?.is_dir() {
            scan_dir(&entry.path(), &format!("{prefix}/{file_name}"), found)?;
        } else if let Some((name, id)) = parse_file_name(file_name) {
            found.push(StoredNote {
                id: NoteId::new(id),
                path: format!("{prefix}/{name}"),
                file: entry.path(),
            });
        }
    }
    Ok(())
}

fn remove_if_present(file: &Path) -> StorageResult<()> {
    match fs::remove_file(file) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}

fn write_atomic(file: &Path, contents: &str) -> StorageResult<()> {
    let parent = file
        .parent()
        .ok_or_else(|| StorageError::InvalidPath(file.display().to_string()))?;
    fs::create_dir_all(parent)?;
    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("note");
    let tmp = parent.join(format!(".{file_name}.tmp"));
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, file)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::Paragraph;
    use crate::parser::JsonNoteParser;
    use tempfile::tempdir;

    fn anon() -> Identity {
        Identity::anonymous()
    }

    fn open(root: &Path) -> FileBackend {
        FileBackend::open(root, Arc::new(JsonNoteParser::new())).unwrap()
    }

    #[test]
    fn file_create_new() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("nb");

        let backend = open(&root);
        assert!(root.join(LOCK_FILE).exists());
        assert!(backend.list(&anon()).unwrap().is_empty());
        assert!(backend.version_control().is_none());
    }

    #[test]
    fn file_save_and_get() {
        let dir = tempdir().unwrap();
        let backend = open(dir.path());
        let note = Note::new("/my_project/my_note1").with_paragraph(Paragraph::new("%md hello"));
        backend.save(&note, &anon()).unwrap();

        let expected = dir
            .path()
            .join("my_project")
            .join(format!("my_note1_{}.json", note.id));
        assert!(expected.is_file());

        let loaded = backend.get(&note.id, "/my_project/my_note1", &anon()).unwrap();
        assert_eq!(loaded, note);

        let listing = backend.list(&anon()).unwrap();
        assert_eq!(listing[&note.id].path, "/my_project/my_note1");
        assert_eq!(listing[&note.id].name.as_deref(), Some("my_note1"));
    }

    #[test]
    fn file_persistence() {
        let dir = tempdir().unwrap();
        let note = Note::new("/folder1/folder2/folder3/my_note");

        {
            let backend = open(dir.path());
            backend.save(&note, &anon()).unwrap();
            backend.close();
        }

        let backend = open(dir.path());
        let listing = backend.list(&anon()).unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[&note.id].path, "/folder1/folder2/folder3/my_note");
    }

    #[test]
    fn file_second_open_is_locked() {
        let dir = tempdir().unwrap();
        let first = open(dir.path());
        let second = FileBackend::open(dir.path(), Arc::new(JsonNoteParser::new()));
        assert!(matches!(second, Err(StorageError::Locked(_))));

        first.close();
        assert!(FileBackend::open(dir.path(), Arc::new(JsonNoteParser::new())).is_ok());
    }

    #[test]
    fn file_move_note_and_folder() {
        let dir = tempdir().unwrap();
        let backend = open(dir.path());
        let note = Note::new("/my_note2");
        backend.save(&note, &anon()).unwrap();

        backend
            .move_note(&note.id, "/my_note2", "/my_project2/my_note2", &anon())
            .unwrap();
        assert!(backend.get(&note.id, "/my_note2", &anon()).unwrap_err().is_not_found());

        backend
            .move_folder("/my_project2", "/my_project3/my_project2", &anon())
            .unwrap();
        let moved = backend
            .get(&note.id, "/my_project3/my_project2/my_note2", &anon())
            .unwrap();
        assert_eq!(moved.id, note.id);
    }

    #[test]
    fn file_remove_note_and_folder() {
        let dir = tempdir().unwrap();
        let backend = open(dir.path());
        let a = Note::new("/proj/a");
        let b = Note::new("/proj/b");
        let keep = Note::new("/keep");
        for note in [&a, &b, &keep] {
            backend.save(note, &anon()).unwrap();
        }

        backend.remove_note(&a.id, "/proj/a", &anon()).unwrap();
        assert_eq!(backend.list(&anon()).unwrap().len(), 2);

        backend.remove_folder("/proj", &anon()).unwrap();
        let listing = backend.list(&anon()).unwrap();
        assert_eq!(listing.len(), 1);
        assert!(listing.contains_key(&keep.id));

        assert!(backend.remove_folder("/", &anon()).is_err());
    }

    #[test]
    fn file_save_relocates_and_rejects_collisions() {
        let dir = tempdir().unwrap();
        let backend = open(dir.path());
        let mut note = Note::new("/a/n");
        backend.save(&note, &anon()).unwrap();
        note.path = "/b/n".into();
        backend.save(&note, &anon()).unwrap();

        let listing = backend.list(&anon()).unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[&note.id].path, "/b/n");

        let clash = Note::new("/b/n");
        assert!(backend.save(&clash, &anon()).is_err());
    }

    #[test]
    fn file_relocation_tracks_folder_moves_and_reopen() {
        let dir = tempdir().unwrap();
        let mut note = Note::new("/p/a");
        {
            let backend = open(dir.path());
            backend.save(&note, &anon()).unwrap();
            backend.close();
        }

        let backend = open(dir.path());
        note.path = "/q/a".into();
        backend.save(&note, &anon()).unwrap();
        backend.move_folder("/q", "/r", &anon()).unwrap();
        note.path = "/s/a".into();
        backend.save(&note, &anon()).unwrap();

        let listing = backend.list(&anon()).unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[&note.id].path, "/s/a");
        assert!(!dir.path().join("p").join(format!("a_{}.json", note.id)).exists());
        assert!(!dir.path().join("r").join(format!("a_{}.json", note.id)).exists());
    }

    #[test]
    fn file_debug_while_rerooting() {
        let dir = tempdir().unwrap();
        let roots = [dir.path().join("one"), dir.path().join("two")];
        let backend = open(&roots[0]);

        std::thread::scope(|s| {
            s.spawn(|| {
                for i in 1..=200 {
                    let mut update = BTreeMap::new();
                    update.insert(
                        NOTEBOOK_DIR_SETTING.to_string(),
                        roots[i % 2].display().to_string(),
                    );
                    backend.update_settings(&update, &anon()).unwrap();
                }
            });
            for _ in 0..200 {
                assert!(format!("{backend:?}").contains("open: true"));
            }
        });
        assert_eq!(backend.root(), roots[0]);
    }

    #[test]
    fn file_rejects_unusable_ids_and_hidden_paths() {
        let dir = tempdir().unwrap();
        let backend = open(dir.path());
        assert!(backend.save(&Note::with_id("bad_id", "/n"), &anon()).is_err());
        assert!(backend.save(&Note::new("/.revisions/n"), &anon()).is_err());
    }

    #[test]
    fn file_settings_reroot() {
        let dir = tempdir().unwrap();
        let backend = open(&dir.path().join("one"));
        let note = Note::new("/n");
        backend.save(&note, &anon()).unwrap();

        let new_root = dir.path().join("two");
        let mut update = BTreeMap::new();
        update.insert(NOTEBOOK_DIR_SETTING.to_string(), new_root.display().to_string());
        backend.update_settings(&update, &anon()).unwrap();

        assert!(backend.list(&anon()).unwrap().is_empty());
        let settings = backend.settings(&anon()).unwrap();
        assert_eq!(settings[0].selected, new_root.display().to_string());

        let mut unknown = BTreeMap::new();
        unknown.insert("colour".to_string(), "blue".to_string());
        assert!(backend.update_settings(&unknown, &anon()).is_err());
    }

    #[test]
    fn file_closed_rejects_operations() {
        let dir = tempdir().unwrap();
        let backend = open(dir.path());
        backend.close();
        backend.close();
        assert!(matches!(backend.list(&anon()), Err(StorageError::Closed)));
    }

    #[test]
    fn versioned_file_checkpoints_survive_reopen() {
        let dir = tempdir().unwrap();
        let note = Note::new("/v/n").with_paragraph(Paragraph::new("one"));
        let revision = {
            let backend = FileBackend::open_versioned(dir.path(), Arc::new(JsonNoteParser::new())).unwrap();
            backend.save(&note, &anon()).unwrap();
            let vc = backend.version_control().unwrap();
            let revision = vc.checkpoint(&note.id, "/v/n", "first", &anon()).unwrap().unwrap();
            assert!(vc.checkpoint(&note.id, "/v/n", "again", &anon()).unwrap().is_none());
            backend.close();
            revision
        };

        let backend = FileBackend::open_versioned(dir.path(), Arc::new(JsonNoteParser::new())).unwrap();
        let vc = backend.version_control().unwrap();
        assert_eq!(vc.revision_history(&note.id, "/v/n", &anon()).unwrap(), vec![revision.clone()]);
        assert_eq!(backend.list(&anon()).unwrap().len(), 1);

        let mut changed = note.clone();
        changed.paragraphs.clear();
        backend.save(&changed, &anon()).unwrap();
        let restored = vc
            .set_note_revision(&note.id, "/v/n", &revision.id, &anon())
            .unwrap()
            .unwrap();
        assert_eq!(restored.paragraphs.len(), 1);
    }
}
