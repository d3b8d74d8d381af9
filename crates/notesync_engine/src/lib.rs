//! # notesync Engine
//!
//! Dual-backend sync engine for notebooks.
//!
//! This crate provides:
//! - A catalog of named backend constructors
//! - A registry of up to two initialized backends (primary first)
//! - Freshness-based diffing of two note listings
//! - Reconciliation of a diff into pushes, pulls and deletions
//! - Fan-out of writes with best-effort and all-or-abort policies
//! - Checkpoint aggregation over version-control backends
//!
//! ## Architecture
//!
//! Reads are served by the primary. Writes fan out: `save` and single-note
//! moves must succeed on the primary and are best effort on the secondary;
//! removals and folder moves must succeed on every backend. An explicit
//! sync diffs two backends and copies the newer side of each note.
//!
//! ## Key Invariants
//!
//! - The registry holds at least one backend and never more than the bound
//! - A note id lands in at most one of push, pull and delete
//! - Equal freshness means no write to either side
//! - Per-note push and pull failures never abort a sync
//! - Reads never fall back to the secondary

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
mod config;
mod diff;
mod engine;
mod error;
mod fanout;
mod reconcile;
mod registry;
mod version;

pub use catalog::{BackendCatalog, BackendFactory, FILE, FILE_VERSIONED, MEMORY, MEMORY_VERSIONED};
pub use config::{
    SyncConfig, DEFAULT_STORAGE, ENV_ANONYMOUS_ALLOWED, ENV_DEFAULT_STORAGE, ENV_ISOLATE_FAILURES,
    ENV_NOTEBOOK_DIR, ENV_ONE_WAY_SYNC, ENV_STORAGE, ENV_VERSIONED_DIR, MAX_BACKENDS,
};
pub use diff::{diff, freshness, SyncPlan};
pub use engine::{BackendSettings, NotebookSync, SyncStats};
pub use error::{SyncError, SyncResult};
pub use fanout::FanOutPolicy;
pub use reconcile::{reconcile, SyncDirection, SyncFailure, SyncReport};
pub use registry::{parse_identifiers, BackendHandle, Backends};
pub use version::{CheckpointOutcome, CheckpointResult};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
