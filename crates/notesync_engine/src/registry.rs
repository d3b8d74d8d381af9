//! Ordered set of initialized backends.

use crate::catalog::BackendCatalog;
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use notesync_storage::{NoteParser, NotebookBackend, VersionControl};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// One initialized backend and its position in the registry.
///
/// Ordinal 0 is the primary backend. Ordinals are fixed for the lifetime
/// of the registry.
#[derive(Clone)]
pub struct BackendHandle {
    ordinal: usize,
    kind: String,
    backend: Arc<dyn NotebookBackend>,
}

impl BackendHandle {
    /// Wraps a backend at `ordinal`.
    pub fn new(ordinal: usize, kind: impl Into<String>, backend: Arc<dyn NotebookBackend>) -> Self {
        Self {
            ordinal,
            kind: kind.into(),
            backend,
        }
    }

    /// Position in the registry.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Catalog identifier the backend was created from.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The backend itself.
    pub fn backend(&self) -> &dyn NotebookBackend {
        self.backend.as_ref()
    }

    /// A shared reference to the backend.
    pub fn shared(&self) -> Arc<dyn NotebookBackend> {
        Arc::clone(&self.backend)
    }

    /// The version-control capability, if the backend has one.
    pub fn version_control(&self) -> Option<&dyn VersionControl> {
        self.backend.version_control()
    }

    /// Returns true if the backend keeps revisions.
    pub fn supports_version_control(&self) -> bool {
        self.version_control().is_some()
    }
}

impl fmt::Debug for BackendHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendHandle")
            .field("ordinal", &self.ordinal)
            .field("kind", &self.kind)
            .field("name", &self.backend.name())
            .field("version_control", &self.supports_version_control())
            .finish()
    }
}

/// The registry of initialized backends, primary first.
///
/// # Invariants
///
/// - Holds at least one and at most `max_backends` handles
/// - `handles[i].ordinal() == i`
#[derive(Debug, Clone)]
pub struct Backends {
    handles: Vec<BackendHandle>,
}

impl Backends {
    /// Builds backends from the configured identifiers.
    ///
    /// Identifiers that are unknown or fail to initialize are logged and
    /// skipped. When nothing comes up, the default identifier is tried.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Configuration`] if the default backend cannot
    /// be initialized either.
    pub fn initialize(
        config: &SyncConfig,
        catalog: &BackendCatalog,
        parser: Arc<dyn NoteParser>,
    ) -> SyncResult<Self> {
        let identifiers =
            parse_identifiers(&config.storage, config.max_backends, &config.default_storage);

        let mut handles: Vec<BackendHandle> = Vec::with_capacity(identifiers.len());
        for identifier in identifiers {
            match catalog.create(&identifier, config, Arc::clone(&parser)) {
                Ok(backend) => {
                    info!(ordinal = handles.len(), backend = %identifier, "backend initialized");
                    handles.push(BackendHandle::new(handles.len(), identifier, backend));
                }
                Err(e) => {
                    warn!(backend = %identifier, error = %e, "failed to initialize backend, skipping");
                }
            }
        }

        if handles.is_empty() {
            let identifier = config.default_storage.trim();
            warn!(backend = %identifier, "no backend initialized, falling back to default");
            let backend = catalog.create(identifier, config, parser).map_err(|e| {
                SyncError::configuration(format!(
                    "default backend {identifier} failed to initialize: {e}"
                ))
            })?;
            handles.push(BackendHandle::new(0, identifier, backend));
        }

        Ok(Self { handles })
    }

    /// Builds a registry from already constructed backends.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Configuration`] if `backends` is empty.
    pub fn from_backends<I, S>(backends: I, max_backends: usize) -> SyncResult<Self>
    where
        I: IntoIterator<Item = (S, Arc<dyn NotebookBackend>)>,
        S: Into<String>,
    {
        let mut handles: Vec<BackendHandle> = backends
            .into_iter()
            .enumerate()
            .map(|(ordinal, (kind, backend))| BackendHandle::new(ordinal, kind, backend))
            .collect();
        if handles.len() > max_backends {
            warn!(
                configured = handles.len(),
                max = max_backends,
                "too many backends, ignoring the rest"
            );
            for extra in handles.drain(max_backends..) {
                extra.backend().close();
            }
        }
        if handles.is_empty() {
            return Err(SyncError::configuration("at least one backend is required"));
        }
        Ok(Self { handles })
    }

    /// Number of initialized backends.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Always false; a registry holds at least one backend.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Returns the handle at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::IndexOutOfRange`] when `index >= len()`.
    pub fn at(&self, index: usize) -> SyncResult<&BackendHandle> {
        self.handles.get(index).ok_or(SyncError::IndexOutOfRange {
            index,
            count: self.handles.len(),
        })
    }

    /// The primary backend.
    pub fn primary(&self) -> &BackendHandle {
        &self.handles[0]
    }

    /// The secondary backend, if one initialized.
    pub fn secondary(&self) -> Option<&BackendHandle> {
        self.handles.get(1)
    }

    /// Every handle, primary first.
    pub fn as_slice(&self) -> &[BackendHandle] {
        &self.handles
    }

    /// Iterates handles in ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = &BackendHandle> {
        self.handles.iter()
    }

    /// Closes every backend.
    pub fn close_all(&self) {
        for handle in &self.handles {
            handle.backend().close();
        }
    }
}

/// Splits a comma-separated identifier list.
///
/// Entries are trimmed and empty entries dropped. An empty list selects
/// `default`; a list longer than `max` is truncated.
pub fn parse_identifiers(raw: &str, max: usize, default: &str) -> Vec<String> {
    let mut identifiers: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    if identifiers.is_empty() {
        warn!(default = %default, "no storage configured, using default");
        identifiers.push(default.trim().to_string());
    }
    if identifiers.len() > max {
        warn!(
            configured = identifiers.len(),
            max,
            "more storage configured than supported, ignoring the rest"
        );
        identifiers.truncate(max);
    }
    identifiers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{MEMORY, MEMORY_VERSIONED};
    use notesync_storage::{InMemoryBackend, JsonNoteParser, StorageError};

    fn parser() -> Arc<dyn NoteParser> {
        Arc::new(JsonNoteParser::new())
    }

    #[test]
    fn parse_trims_and_skips_empty() {
        assert_eq!(
            parse_identifiers(" memory , ,file ", 2, "x"),
            vec!["memory".to_string(), "file".to_string()]
        );
    }

    #[test]
    fn parse_empty_selects_default() {
        assert_eq!(parse_identifiers("  ", 2, "file-versioned"), vec!["file-versioned"]);
        assert_eq!(parse_identifiers(",,", 2, "memory"), vec!["memory"]);
    }

    #[test]
    fn parse_truncates_to_max() {
        assert_eq!(parse_identifiers("a,b,c", 2, "x"), vec!["a", "b"]);
    }

    #[test]
    fn initialize_in_configured_order() {
        let config = SyncConfig::new("memory-versioned,memory");
        let backends = Backends::initialize(&config, &BackendCatalog::builtin(), parser()).unwrap();

        assert_eq!(backends.len(), 2);
        assert_eq!(backends.primary().kind(), MEMORY_VERSIONED);
        assert!(backends.primary().supports_version_control());
        let secondary = backends.secondary().unwrap();
        assert_eq!(secondary.kind(), MEMORY);
        assert_eq!(secondary.ordinal(), 1);
        assert!(!secondary.supports_version_control());
    }

    #[test]
    fn unknown_identifier_is_skipped() {
        let config = SyncConfig::new("nosuch,memory");
        let backends = Backends::initialize(&config, &BackendCatalog::builtin(), parser()).unwrap();
        assert_eq!(backends.len(), 1);
        assert_eq!(backends.primary().kind(), MEMORY);
        assert_eq!(backends.primary().ordinal(), 0);
    }

    #[test]
    fn falls_back_to_default() {
        let config = SyncConfig::new("nosuch").with_default_storage(MEMORY);
        let backends = Backends::initialize(&config, &BackendCatalog::builtin(), parser()).unwrap();
        assert_eq!(backends.len(), 1);
        assert_eq!(backends.primary().kind(), MEMORY);
    }

    #[test]
    fn failing_default_is_configuration_error() {
        let catalog = BackendCatalog::empty()
            .with("broken", |_, _| Err(StorageError::backend("cannot connect")));
        let config = SyncConfig::new("broken").with_default_storage("broken");
        let err = Backends::initialize(&config, &catalog, parser()).unwrap_err();
        assert!(matches!(err, SyncError::Configuration(_)));
    }

    #[test]
    fn at_checks_range() {
        let backends =
            Backends::from_backends([("memory", Arc::new(InMemoryBackend::new()) as Arc<dyn NotebookBackend>)], 2)
                .unwrap();
        assert!(backends.at(0).is_ok());
        assert!(matches!(
            backends.at(1),
            Err(SyncError::IndexOutOfRange { index: 1, count: 1 })
        ));
    }

    #[test]
    fn from_backends_truncates_and_closes_extras() {
        let extra = Arc::new(InMemoryBackend::new());
        let backends = Backends::from_backends(
            [
                ("a", Arc::new(InMemoryBackend::new()) as Arc<dyn NotebookBackend>),
                ("b", Arc::new(InMemoryBackend::new()) as Arc<dyn NotebookBackend>),
                ("c", Arc::clone(&extra) as Arc<dyn NotebookBackend>),
            ],
            2,
        )
        .unwrap();
        assert_eq!(backends.len(), 2);
        assert!(extra.is_closed());
    }

    #[test]
    fn from_backends_rejects_empty() {
        let none: Vec<(&str, Arc<dyn NotebookBackend>)> = Vec::new();
        assert!(matches!(
            Backends::from_backends(none, 2),
            Err(SyncError::Configuration(_))
        ));
    }
}
