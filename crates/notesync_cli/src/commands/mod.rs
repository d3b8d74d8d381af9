//! CLI command implementations.

pub mod inspect;
pub mod list;
pub mod revisions;
pub mod settings;
pub mod sync;

use notesync_engine::{BackendCatalog, Backends, NotebookSync, SyncConfig, SyncResult};
use notesync_storage::JsonNoteParser;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line overrides on top of the environment configuration.
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Backend identifiers.
    pub storage: Option<String>,
    /// `file` backend root.
    pub notebook_dir: Option<PathBuf>,
    /// `file-versioned` backend root.
    pub versioned_dir: Option<PathBuf>,
    /// Force one-way sync.
    pub one_way: bool,
}

impl EngineOptions {
    /// Applies the overrides to `config`.
    pub fn apply(&self, mut config: SyncConfig) -> SyncConfig {
        if let Some(storage) = &self.storage {
            config.storage = storage.clone();
        }
        if let Some(dir) = &self.notebook_dir {
            config = config.with_notebook_dir(dir);
        }
        if let Some(dir) = &self.versioned_dir {
            config = config.with_versioned_dir(dir);
        }
        if self.one_way {
            config = config.with_one_way_sync(true);
        }
        config
    }
}

/// Opens an engine from the environment plus `options`.
///
/// No startup sync runs; commands that change backends do so explicitly.
pub fn open(options: &EngineOptions) -> SyncResult<NotebookSync> {
    open_with(options.apply(SyncConfig::from_env()?))
}

/// Opens an engine over `config` with the builtin catalog.
pub fn open_with(config: SyncConfig) -> SyncResult<NotebookSync> {
    let backends = Backends::initialize(
        &config,
        &BackendCatalog::builtin(),
        Arc::new(JsonNoteParser::pretty()),
    )?;
    Ok(NotebookSync::new(config, backends))
}

/// Prints `value` as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
pub(crate) fn memory_engine() -> NotebookSync {
    open_with(SyncConfig::new("memory-versioned,memory")).unwrap()
}
