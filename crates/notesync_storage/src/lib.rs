//! # notesync Storage
//!
//! Notebook model and backend contract for notesync.
//!
//! This crate defines what a notebook backend is and ships the reference
//! backends the sync engine can mirror between. Backends address notes by
//! an immutable id plus a hierarchical path; the engine never looks past
//! the [`NotebookBackend`] trait.
//!
//! ## Design Principles
//!
//! - Backends own their locking and must be `Send + Sync`
//! - Revision support is an optional capability ([`VersionControl`])
//! - Note ids never change; moves only change paths
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral notebooks
//! - [`FileBackend`] - One parsed document per note on disk
//!
//! Both come in a plain and a versioned flavour.
//!
//! ## Example
//!
//! ```rust
//! use notesync_storage::{Identity, InMemoryBackend, Note, NotebookBackend};
//!
//! let backend = InMemoryBackend::versioned();
//! let note = Note::new("/project/todo");
//! backend.save(&note, &Identity::anonymous()).unwrap();
//!
//! let vc = backend.version_control().unwrap();
//! let revision = vc.checkpoint(&note.id, "/project/todo", "first", &Identity::anonymous());
//! assert!(revision.unwrap().is_some());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod history;
mod memory;
mod note;
mod parser;
pub mod path;
mod types;

pub use backend::{NoteListing, NotebookBackend, VersionControl};
pub use error::{StorageError, StorageResult};
pub use file::{FileBackend, NOTEBOOK_DIR_SETTING};
pub use memory::InMemoryBackend;
pub use note::{Note, NoteId, NoteSummary, Paragraph};
pub use parser::{JsonNoteParser, NoteParser};
pub use types::{Identity, Revision, SettingInfo, SettingKind, ANONYMOUS};
