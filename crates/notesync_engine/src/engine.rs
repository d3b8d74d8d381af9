//! The engine facade tying registry, diff, reconcile, fan-out and
//! version control together.

use crate::catalog::BackendCatalog;
use crate::config::SyncConfig;
use crate::diff::{self, SyncPlan};
use crate::error::SyncResult;
use crate::fanout::FanOutPolicy;
use crate::reconcile::{self, SyncReport};
use crate::registry::{BackendHandle, Backends};
use crate::version::{self, CheckpointResult};
use chrono::{DateTime, Utc};
use notesync_storage::{
    Identity, Note, NoteId, NoteListing, NoteParser, Revision, SettingInfo,
};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Cumulative counters over the engine's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    /// Reconcile passes that completed.
    pub cycles_completed: u64,
    /// Notes copied source to destination.
    pub notes_pushed: u64,
    /// Notes copied destination to source.
    pub notes_pulled: u64,
    /// Notes removed from a destination.
    pub notes_deleted: u64,
    /// Items skipped because of an error.
    pub notes_failed: u64,
    /// When the last pass finished.
    pub last_sync_time: Option<DateTime<Utc>>,
    /// Message of the last failed pass.
    pub last_error: Option<String>,
}

/// Settings of one backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendSettings {
    /// Catalog identifier.
    pub kind: String,
    /// Backend display name.
    pub name: String,
    /// Setting descriptors.
    pub settings: Vec<SettingInfo>,
}

/// Keeps up to two notebook backends consistent.
///
/// Reads go to the primary. `save` and single-note moves must succeed on
/// the primary and are best effort elsewhere; removals and folder moves
/// must succeed everywhere. Checkpoints go to every backend that keeps
/// revisions.
///
/// # Example
///
/// ```rust
/// use notesync_engine::{BackendCatalog, NotebookSync, SyncConfig};
/// use notesync_storage::{Identity, JsonNoteParser, Note};
/// use std::sync::Arc;
///
/// let config = SyncConfig::new("memory,memory-versioned");
/// let sync = NotebookSync::init(config, &BackendCatalog::builtin(), Arc::new(JsonNoteParser::new())).unwrap();
///
/// let anon = Identity::anonymous();
/// let note = Note::new("/p1/n1");
/// sync.save(&note, &anon).unwrap();
/// assert_eq!(sync.list_at(1, &anon).unwrap().len(), 1);
/// sync.close();
/// ```
#[derive(Debug)]
pub struct NotebookSync {
    config: SyncConfig,
    backends: Backends,
    stats: RwLock<SyncStats>,
}

impl NotebookSync {
    /// Creates an engine over an existing registry without syncing.
    pub fn new(config: SyncConfig, backends: Backends) -> Self {
        Self {
            config,
            backends,
            stats: RwLock::new(SyncStats::default()),
        }
    }

    /// Builds the registry from `config` and starts the engine.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SyncError::Configuration`] if no backend, including
    /// the default, could be initialized.
    pub fn init(
        config: SyncConfig,
        catalog: &BackendCatalog,
        parser: Arc<dyn NoteParser>,
    ) -> SyncResult<Self> {
        let backends = Backends::initialize(&config, catalog, parser)?;
        Ok(Self::start(config, backends))
    }

    /// Creates an engine and runs the startup sync.
    ///
    /// With two backends and anonymous access allowed, one anonymous sync
    /// from primary to secondary runs; its failure is only logged.
    pub fn start(config: SyncConfig, backends: Backends) -> Self {
        let engine = Self::new(config, backends);
        if engine.backends.len() > 1 && engine.config.anonymous_allowed {
            if let Err(e) = engine.sync(&Identity::anonymous()) {
                error!(error = %e, "startup sync failed");
            }
        }
        engine
    }

    /// The engine configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// The backend registry.
    pub fn backends(&self) -> &Backends {
        &self.backends
    }

    /// Number of initialized backends.
    pub fn repo_count(&self) -> usize {
        self.backends.len()
    }

    /// Returns the handle at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SyncError::IndexOutOfRange`] for unknown ordinals.
    pub fn repo_at(&self, index: usize) -> SyncResult<&BackendHandle> {
        self.backends.at(index)
    }

    /// Returns true if the primary keeps revisions.
    pub fn is_revision_supported_in_default_repo(&self) -> bool {
        self.backends.primary().supports_version_control()
    }

    /// Returns true if the backend at `index` keeps revisions.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SyncError::IndexOutOfRange`] for unknown ordinals.
    pub fn is_revision_supported_in_repo(&self, index: usize) -> SyncResult<bool> {
        Ok(self.backends.at(index)?.supports_version_control())
    }

    /// Lists notes on the primary.
    ///
    /// # Errors
    ///
    /// Returns the primary's failure.
    pub fn list(&self, identity: &Identity) -> SyncResult<NoteListing> {
        self.list_at(0, identity)
    }

    /// Lists notes on the backend at `index`.
    ///
    /// # Errors
    ///
    /// Returns an index error or the backend's failure.
    pub fn list_at(&self, index: usize, identity: &Identity) -> SyncResult<NoteListing> {
        Ok(self.backends.at(index)?.backend().list(identity)?)
    }

    /// Fetches a note from the primary.
    ///
    /// # Errors
    ///
    /// Returns the primary's failure; the secondary is never consulted.
    pub fn get(&self, id: &NoteId, path: &str, identity: &Identity) -> SyncResult<Note> {
        self.get_at(0, id, path, identity)
    }

    /// Fetches a note from the backend at `index`.
    ///
    /// # Errors
    ///
    /// Returns an index error or the backend's failure.
    pub fn get_at(
        &self,
        index: usize,
        id: &NoteId,
        path: &str,
        identity: &Identity,
    ) -> SyncResult<Note> {
        Ok(self.backends.at(index)?.backend().get(id, path, identity)?)
    }

    /// Saves a note on the primary, then best effort on the secondary.
    ///
    /// # Errors
    ///
    /// Returns the primary's failure.
    pub fn save(&self, note: &Note, identity: &Identity) -> SyncResult<()> {
        self.fan_out(FanOutPolicy::BestEffortSecondary, |h| {
            h.backend().save(note, identity)
        })
    }

    /// Saves a note on the backend at `index` only.
    ///
    /// # Errors
    ///
    /// Returns an index error or the backend's failure.
    pub fn save_at(&self, index: usize, note: &Note, identity: &Identity) -> SyncResult<()> {
        Ok(self.backends.at(index)?.backend().save(note, identity)?)
    }

    /// Moves one note on the primary, then best effort on the secondary.
    ///
    /// # Errors
    ///
    /// Returns the primary's failure.
    pub fn move_note(
        &self,
        id: &NoteId,
        path: &str,
        new_path: &str,
        identity: &Identity,
    ) -> SyncResult<()> {
        self.fan_out(FanOutPolicy::BestEffortSecondary, |h| {
            h.backend().move_note(id, path, new_path, identity)
        })
    }

    /// Moves a folder on every backend.
    ///
    /// # Errors
    ///
    /// Returns the first backend failure.
    pub fn move_folder(&self, folder: &str, new_folder: &str, identity: &Identity) -> SyncResult<()> {
        self.fan_out(FanOutPolicy::AllOrAbort, |h| {
            h.backend().move_folder(folder, new_folder, identity)
        })
    }

    /// Removes a note from every backend.
    ///
    /// # Errors
    ///
    /// Returns the first backend failure.
    pub fn remove_note(&self, id: &NoteId, path: &str, identity: &Identity) -> SyncResult<()> {
        self.fan_out(FanOutPolicy::AllOrAbort, |h| {
            h.backend().remove_note(id, path, identity)
        })
    }

    /// Removes a note from the backend at `index` only.
    ///
    /// # Errors
    ///
    /// Returns an index error or the backend's failure.
    pub fn remove_at(
        &self,
        index: usize,
        id: &NoteId,
        path: &str,
        identity: &Identity,
    ) -> SyncResult<()> {
        Ok(self.backends.at(index)?.backend().remove_note(id, path, identity)?)
    }

    /// Removes a folder from every backend.
    ///
    /// # Errors
    ///
    /// Returns the first backend failure.
    pub fn remove_folder(&self, folder: &str, identity: &Identity) -> SyncResult<()> {
        self.fan_out(FanOutPolicy::AllOrAbort, |h| {
            h.backend().remove_folder(folder, identity)
        })
    }

    fn fan_out<F>(&self, policy: FanOutPolicy, op: F) -> SyncResult<()>
    where
        F: FnMut(&BackendHandle) -> notesync_storage::StorageResult<()>,
    {
        policy.apply(
            self.backends.as_slice(),
            self.config.isolate_partial_failures,
            op,
        )
    }

    /// Syncs the primary with the secondary.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SyncError::IndexOutOfRange`] with a single backend,
    /// a listing failure, or a deletion failure.
    pub fn sync(&self, identity: &Identity) -> SyncResult<SyncReport> {
        self.sync_between(0, 1, identity)
    }

    /// Syncs the backend at `source` into the backend at `dest`.
    ///
    /// # Errors
    ///
    /// Same as [`NotebookSync::sync`].
    pub fn sync_between(&self, source: usize, dest: usize, identity: &Identity) -> SyncResult<SyncReport> {
        let result = self.run_sync(source, dest, identity);
        let mut stats = self.stats.write();
        match &result {
            Ok(report) => {
                stats.cycles_completed += 1;
                stats.notes_pushed += report.pushed.len() as u64;
                stats.notes_pulled += report.pulled.len() as u64;
                stats.notes_deleted += report.deleted.len() as u64;
                stats.notes_failed += report.failures.len() as u64;
                stats.last_sync_time = Some(Utc::now());
                stats.last_error = None;
            }
            Err(e) => stats.last_error = Some(e.to_string()),
        }
        result
    }

    /// Computes what a sync from `source` to `dest` would do.
    ///
    /// # Errors
    ///
    /// Returns an index error or a listing failure.
    pub fn plan(&self, source: usize, dest: usize, identity: &Identity) -> SyncResult<SyncPlan> {
        let src = self.backends.at(source)?.backend();
        let dst = self.backends.at(dest)?.backend();
        let source_notes = src.list(identity)?;
        let dest_notes = dst.list(identity)?;
        Ok(diff::diff(
            src,
            dst,
            &source_notes,
            &dest_notes,
            self.config.one_way_sync,
            identity,
        ))
    }

    fn run_sync(&self, source: usize, dest: usize, identity: &Identity) -> SyncResult<SyncReport> {
        let plan = self.plan(source, dest, identity)?;
        info!(
            source,
            dest,
            push = plan.push.len(),
            pull = plan.pull.len(),
            delete = plan.delete.len(),
            "sync planned"
        );
        reconcile::reconcile(
            &plan,
            self.backends.at(source)?.backend(),
            self.backends.at(dest)?.backend(),
            identity,
            self.config.isolate_partial_failures,
        )
    }

    /// Checkpoints a note and returns the representative revision.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SyncError::CheckpointFailed`] when every
    /// version-control backend failed.
    pub fn checkpoint(
        &self,
        id: &NoteId,
        path: &str,
        message: &str,
        identity: &Identity,
    ) -> SyncResult<Option<Revision>> {
        Ok(self.checkpoint_all(id, path, message, identity)?.revision)
    }

    /// Checkpoints a note and returns every backend's outcome.
    ///
    /// # Errors
    ///
    /// Same as [`NotebookSync::checkpoint`].
    pub fn checkpoint_all(
        &self,
        id: &NoteId,
        path: &str,
        message: &str,
        identity: &Identity,
    ) -> SyncResult<CheckpointResult> {
        version::checkpoint(
            self.backends.as_slice(),
            self.config.max_backends,
            id,
            path,
            message,
            identity,
        )
    }

    /// Fetches a revision from the primary, `None` if unavailable.
    pub fn get_revision(
        &self,
        id: &NoteId,
        path: &str,
        revision_id: &str,
        identity: &Identity,
    ) -> Option<Note> {
        version::get_revision(self.backends.primary(), id, path, revision_id, identity)
    }

    /// Lists revisions from the primary, newest first.
    pub fn revision_history(&self, id: &NoteId, path: &str, identity: &Identity) -> Vec<Revision> {
        version::revision_history(self.backends.primary(), id, path, identity)
    }

    /// Restores a revision on every version-control backend.
    pub fn set_note_revision(
        &self,
        id: &NoteId,
        path: &str,
        revision_id: &str,
        identity: &Identity,
    ) -> Option<Note> {
        version::set_note_revision(self.backends.as_slice(), id, path, revision_id, identity)
    }

    /// Settings of the primary; failures yield an empty list.
    pub fn settings(&self, identity: &Identity) -> Vec<SettingInfo> {
        let primary = self.backends.primary();
        primary.backend().settings(identity).unwrap_or_else(|e| {
            warn!(backend = primary.kind(), error = %e, "cannot read settings");
            Vec::new()
        })
    }

    /// Updates settings of the primary; failures are logged.
    pub fn update_settings(&self, settings: &BTreeMap<String, String>, identity: &Identity) {
        let primary = self.backends.primary();
        if let Err(e) = primary.backend().update_settings(settings, identity) {
            warn!(backend = primary.kind(), error = %e, "cannot update settings");
        }
    }

    /// Settings of every backend, in ordinal order.
    pub fn backend_settings(&self, identity: &Identity) -> Vec<BackendSettings> {
        self.backends
            .iter()
            .map(|h| describe(h, identity))
            .collect()
    }

    /// Updates the first backend whose identifier is `kind` and returns its
    /// refreshed settings, or `None` if no backend matches.
    ///
    /// # Errors
    ///
    /// Returns the backend's failure to apply the update.
    pub fn update_backend_settings(
        &self,
        kind: &str,
        settings: &BTreeMap<String, String>,
        identity: &Identity,
    ) -> SyncResult<Option<BackendSettings>> {
        let Some(handle) = self.backends.iter().find(|h| h.kind() == kind) else {
            warn!(backend = kind, "no backend to update");
            return Ok(None);
        };
        handle.backend().update_settings(settings, identity)?;
        Ok(Some(describe(handle, identity)))
    }

    /// Cumulative sync counters.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Closes every backend. Safe to call more than once.
    pub fn close(&self) {
        self.backends.close_all();
    }
}

fn describe(handle: &BackendHandle, identity: &Identity) -> BackendSettings {
    let settings = handle.backend().settings(identity).unwrap_or_else(|e| {
        warn!(backend = handle.kind(), error = %e, "cannot read settings");
        Vec::new()
    });
    BackendSettings {
        kind: handle.kind().to_string(),
        name: handle.backend().name().to_string(),
        settings,
    }
}
