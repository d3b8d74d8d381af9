//! Note fixtures and temporary notebooks.

use chrono::{DateTime, Duration, TimeZone, Utc};
use notesync_storage::{FileBackend, JsonNoteParser, Note, NotebookBackend, Paragraph};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// The instant every fixture timestamp is measured from.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .expect("valid base time")
}

/// `minutes` after [`base_time`].
pub fn minutes(minutes: i64) -> DateTime<Utc> {
    base_time() + Duration::minutes(minutes)
}

/// A note with one paragraph created `created` minutes after [`base_time`].
pub fn note_at(id: &str, path: &str, created: i64) -> Note {
    Note::with_id(id, path).with_paragraph(
        Paragraph::new(format!("%md written at +{created}m")).with_created(Some(minutes(created))),
    )
}

/// A note with a single paragraph and no timestamps at all.
pub fn untimed_note(id: &str, path: &str) -> Note {
    Note::with_id(id, path).with_paragraph(Paragraph::new("%md untimed").with_created(None))
}

/// A file notebook in a temporary directory.
///
/// The directory is removed when the value is dropped; the backend is
/// declared first so its lock is released before that.
pub struct TestNotebook {
    /// The backend.
    pub backend: FileBackend,
    temp_dir: TempDir,
}

impl TestNotebook {
    /// Creates a plain file notebook.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let backend = FileBackend::open(temp_dir.path(), Arc::new(JsonNoteParser::pretty()))
            .expect("Failed to open file notebook");
        Self { backend, temp_dir }
    }

    /// Creates a file notebook that keeps revisions.
    pub fn versioned() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let backend =
            FileBackend::open_versioned(temp_dir.path(), Arc::new(JsonNoteParser::pretty()))
                .expect("Failed to open versioned notebook");
        Self { backend, temp_dir }
    }

    /// The notebook directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Moves the backend into an `Arc`, keeping the directory alive.
    pub fn into_shared(self) -> (Arc<dyn NotebookBackend>, TempDir) {
        (Arc::new(self.backend), self.temp_dir)
    }
}

impl std::ops::Deref for TestNotebook {
    type Target = FileBackend;

    fn deref(&self) -> &Self::Target {
        &self.backend
    }
}
