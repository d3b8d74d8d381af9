//! # notesync Testkit
//!
//! Test utilities for notesync.
//!
//! This crate provides:
//! - Note fixtures with fixed, comparable timestamps
//! - Temporary file notebooks that clean up after themselves
//! - A fault-injecting backend wrapper
//! - Property-based generators for notes and notebook pairs
//!
//! ## Usage
//!
//! ```rust
//! use notesync_testkit::prelude::*;
//! use notesync_storage::{Identity, NotebookBackend};
//!
//! let notebook = TestNotebook::file();
//! notebook.save(&note_at("A", "/p1/n1", 5), &Identity::anonymous()).unwrap();
//! assert_eq!(notebook.list(&Identity::anonymous()).unwrap().len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod faulty;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::faulty::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use faulty::*;
pub use fixtures::*;
pub use generators::*;
