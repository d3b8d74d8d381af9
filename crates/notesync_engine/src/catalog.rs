//! Named backend constructors.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use notesync_storage::{FileBackend, InMemoryBackend, NoteParser, NotebookBackend, StorageResult};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Identifier of the plain in-memory backend.
pub const MEMORY: &str = "memory";
/// Identifier of the in-memory backend with revisions.
pub const MEMORY_VERSIONED: &str = "memory-versioned";
/// Identifier of the plain file backend.
pub const FILE: &str = "file";
/// Identifier of the file backend with revisions.
pub const FILE_VERSIONED: &str = "file-versioned";

/// Builds one backend from the engine configuration.
pub type BackendFactory = Arc<
    dyn Fn(&SyncConfig, Arc<dyn NoteParser>) -> StorageResult<Arc<dyn NotebookBackend>>
        + Send
        + Sync,
>;

/// Catalog mapping backend identifiers to constructors.
///
/// The registry resolves every configured identifier here. Callers can
/// register their own backends next to the built-in ones.
///
/// # Example
///
/// ```rust
/// use notesync_engine::BackendCatalog;
/// use notesync_storage::{InMemoryBackend, NotebookBackend};
/// use std::sync::Arc;
///
/// let catalog = BackendCatalog::builtin().with("scratch", |_, _| {
///     Ok(Arc::new(InMemoryBackend::new()) as Arc<dyn NotebookBackend>)
/// });
/// assert!(catalog.contains("scratch"));
/// assert!(catalog.contains("file-versioned"));
/// ```
#[derive(Clone)]
pub struct BackendCatalog {
    factories: BTreeMap<String, BackendFactory>,
}

impl BackendCatalog {
    /// Creates a catalog with no entries.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Creates a catalog holding the built-in backends.
    #[must_use]
    pub fn builtin() -> Self {
        Self::empty()
            .with(MEMORY, |_, _| Ok(Arc::new(InMemoryBackend::new()) as Arc<dyn NotebookBackend>))
            .with(MEMORY_VERSIONED, |_, _| {
                Ok(Arc::new(InMemoryBackend::versioned()) as Arc<dyn NotebookBackend>)
            })
            .with(FILE, |config, parser| {
                Ok(Arc::new(FileBackend::open(&config.notebook_dir, parser)?) as Arc<dyn NotebookBackend>)
            })
            .with(FILE_VERSIONED, |config, parser| {
                Ok(Arc::new(FileBackend::open_versioned(&config.versioned_dir, parser)?)
                    as Arc<dyn NotebookBackend>)
            })
    }

    /// Registers a constructor, replacing any previous one with the same identifier.
    pub fn register<F>(&mut self, identifier: impl Into<String>, factory: F)
    where
        F: Fn(&SyncConfig, Arc<dyn NoteParser>) -> StorageResult<Arc<dyn NotebookBackend>>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(identifier.into(), Arc::new(factory));
    }

    /// Builder form of [`BackendCatalog::register`].
    #[must_use]
    pub fn with<F>(mut self, identifier: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&SyncConfig, Arc<dyn NoteParser>) -> StorageResult<Arc<dyn NotebookBackend>>
            + Send
            + Sync
            + 'static,
    {
        self.register(identifier, factory);
        self
    }

    /// Returns true if `identifier` is registered.
    pub fn contains(&self, identifier: &str) -> bool {
        self.factories.contains_key(identifier)
    }

    /// Registered identifiers in sorted order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Instantiates the backend registered under `identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnknownBackend`] if nothing is registered under
    /// `identifier`, or the constructor's own failure.
    pub fn create(
        &self,
        identifier: &str,
        config: &SyncConfig,
        parser: Arc<dyn NoteParser>,
    ) -> SyncResult<Arc<dyn NotebookBackend>> {
        let factory = self
            .factories
            .get(identifier)
            .ok_or_else(|| SyncError::UnknownBackend(identifier.to_string()))?;
        Ok(factory(config, parser)?)
    }
}

impl Default for BackendCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for BackendCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.identifiers()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notesync_storage::{Identity, JsonNoteParser, Note};
    use tempfile::tempdir;

    fn parser() -> Arc<dyn NoteParser> {
        Arc::new(JsonNoteParser::new())
    }

    #[test]
    fn builtin_identifiers() {
        let catalog = BackendCatalog::builtin();
        let ids: Vec<&str> = catalog.identifiers().collect();
        assert_eq!(ids, vec![FILE, FILE_VERSIONED, MEMORY, MEMORY_VERSIONED]);
    }

    #[test]
    fn create_memory_backends() {
        let catalog = BackendCatalog::builtin();
        let config = SyncConfig::default();

        let plain = catalog.create(MEMORY, &config, parser()).unwrap();
        assert!(plain.version_control().is_none());
        let versioned = catalog.create(MEMORY_VERSIONED, &config, parser()).unwrap();
        assert!(versioned.version_control().is_some());
    }

    #[test]
    fn create_file_backend_uses_configured_dir() {
        let dir = tempdir().unwrap();
        let config = SyncConfig::default().with_notebook_dir(dir.path().join("nb"));
        let backend = BackendCatalog::builtin().create(FILE, &config, parser()).unwrap();

        backend.save(&Note::new("/a"), &Identity::anonymous()).unwrap();
        assert!(dir.path().join("nb").is_dir());
        backend.close();
    }

    #[test]
    fn unknown_identifier() {
        let err = BackendCatalog::empty()
            .create("s3", &SyncConfig::default(), parser())
            .err()
            .expect("expected UnknownBackend error");
        assert!(matches!(err, SyncError::UnknownBackend(ref id) if id == "s3"));
    }

    #[test]
    fn register_replaces_existing() {
        let mut catalog = BackendCatalog::builtin();
        catalog.register(MEMORY, |_, _| {
            Ok(Arc::new(InMemoryBackend::versioned()) as Arc<dyn NotebookBackend>)
        });
        let backend = catalog.create(MEMORY, &SyncConfig::default(), parser()).unwrap();
        assert!(backend.version_control().is_some());
    }
}
