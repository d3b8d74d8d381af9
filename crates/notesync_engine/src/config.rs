//! Configuration for the sync engine.

use crate::error::{SyncError, SyncResult};
use std::path::PathBuf;

/// Environment variable holding the comma-separated backend identifiers.
pub const ENV_STORAGE: &str = "NOTESYNC_STORAGE";
/// Environment variable holding the fallback backend identifier.
pub const ENV_DEFAULT_STORAGE: &str = "NOTESYNC_DEFAULT_STORAGE";
/// Environment variable for one-way sync.
pub const ENV_ONE_WAY_SYNC: &str = "NOTESYNC_ONE_WAY_SYNC";
/// Environment variable for anonymous access.
pub const ENV_ANONYMOUS_ALLOWED: &str = "NOTESYNC_ANONYMOUS_ALLOWED";
/// Environment variable for the `file` backend root.
pub const ENV_NOTEBOOK_DIR: &str = "NOTESYNC_NOTEBOOK_DIR";
/// Environment variable for the `file-versioned` backend root.
pub const ENV_VERSIONED_DIR: &str = "NOTESYNC_VERSIONED_DIR";
/// Environment variable for per-item failure isolation.
pub const ENV_ISOLATE_FAILURES: &str = "NOTESYNC_ISOLATE_FAILURES";

/// Backend identifier used when nothing else is configured.
pub const DEFAULT_STORAGE: &str = "file-versioned";
/// Maximum number of backends the engine keeps in sync.
pub const MAX_BACKENDS: usize = 2;

/// Configuration for the sync engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Comma-separated backend identifiers, primary first.
    pub storage: String,
    /// Identifier initialized when none of `storage` comes up.
    pub default_storage: String,
    /// Upper bound on initialized backends.
    pub max_backends: usize,
    /// Treat the source as authoritative and delete destination-only notes.
    pub one_way_sync: bool,
    /// Whether the anonymous identity may act (enables startup sync).
    pub anonymous_allowed: bool,
    /// Root directory of the `file` backend.
    pub notebook_dir: PathBuf,
    /// Root directory of the `file-versioned` backend.
    pub versioned_dir: PathBuf,
    /// Keep going after a per-item failure in strict loops.
    pub isolate_partial_failures: bool,
}

impl SyncConfig {
    /// Creates a configuration for the given backend list.
    pub fn new(storage: impl Into<String>) -> Self {
        Self {
            storage: storage.into(),
            ..Self::default()
        }
    }

    /// Sets the fallback backend identifier.
    pub fn with_default_storage(mut self, identifier: impl Into<String>) -> Self {
        self.default_storage = identifier.into();
        self
    }

    /// Sets the backend bound.
    pub fn with_max_backends(mut self, max: usize) -> Self {
        self.max_backends = max;
        self
    }

    /// Enables or disables one-way sync.
    pub fn with_one_way_sync(mut self, one_way: bool) -> Self {
        self.one_way_sync = one_way;
        self
    }

    /// Allows or forbids anonymous access.
    pub fn with_anonymous_allowed(mut self, allowed: bool) -> Self {
        self.anonymous_allowed = allowed;
        self
    }

    /// Sets the `file` backend root.
    pub fn with_notebook_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.notebook_dir = dir.into();
        self
    }

    /// Sets the `file-versioned` backend root.
    pub fn with_versioned_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.versioned_dir = dir.into();
        self
    }

    /// Enables or disables per-item failure isolation.
    pub fn with_isolate_partial_failures(mut self, isolate: bool) -> Self {
        self.isolate_partial_failures = isolate;
        self
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Configuration`] for malformed boolean values.
    pub fn from_env() -> SyncResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary key lookup.
    ///
    /// Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Configuration`] for malformed boolean values.
    pub fn from_lookup<F>(lookup: F) -> SyncResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(storage) = lookup(ENV_STORAGE) {
            config.storage = storage;
        }
        if let Some(default_storage) = lookup(ENV_DEFAULT_STORAGE) {
            config.default_storage = default_storage.trim().to_string();
        }
        if let Some(value) = lookup(ENV_ONE_WAY_SYNC) {
            config.one_way_sync = parse_bool(ENV_ONE_WAY_SYNC, &value)?;
        }
        if let Some(value) = lookup(ENV_ANONYMOUS_ALLOWED) {
            config.anonymous_allowed = parse_bool(ENV_ANONYMOUS_ALLOWED, &value)?;
        }
        if let Some(dir) = lookup(ENV_NOTEBOOK_DIR) {
            config.notebook_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_VERSIONED_DIR) {
            config.versioned_dir = PathBuf::from(dir);
        }
        if let Some(value) = lookup(ENV_ISOLATE_FAILURES) {
            config.isolate_partial_failures = parse_bool(ENV_ISOLATE_FAILURES, &value)?;
        }
        Ok(config)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            storage: DEFAULT_STORAGE.to_string(),
            default_storage: DEFAULT_STORAGE.to_string(),
            max_backends: MAX_BACKENDS,
            one_way_sync: false,
            anonymous_allowed: true,
            notebook_dir: PathBuf::from("notebook"),
            versioned_dir: PathBuf::from("notebook-versioned"),
            isolate_partial_failures: false,
        }
    }
}

fn parse_bool(key: &str, value: &str) -> SyncResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(SyncError::configuration(format!(
            "{key} must be a boolean, got {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.storage, "file-versioned");
        assert_eq!(config.default_storage, "file-versioned");
        assert_eq!(config.max_backends, 2);
        assert!(!config.one_way_sync);
        assert!(config.anonymous_allowed);
        assert_eq!(config.notebook_dir, PathBuf::from("notebook"));
        assert!(!config.isolate_partial_failures);
    }

    #[test]
    fn sync_config_builder() {
        let config = SyncConfig::new("memory,file")
            .with_default_storage("memory")
            .with_one_way_sync(true)
            .with_anonymous_allowed(false)
            .with_notebook_dir("/tmp/nb")
            .with_isolate_partial_failures(true);

        assert_eq!(config.storage, "memory,file");
        assert_eq!(config.default_storage, "memory");
        assert!(config.one_way_sync);
        assert!(!config.anonymous_allowed);
        assert_eq!(config.notebook_dir, PathBuf::from("/tmp/nb"));
        assert!(config.isolate_partial_failures);
    }

    #[test]
    fn from_lookup_reads_every_key() {
        let config = SyncConfig::from_lookup(lookup(&[
            (ENV_STORAGE, "memory, file-versioned"),
            (ENV_DEFAULT_STORAGE, " memory "),
            (ENV_ONE_WAY_SYNC, "TRUE"),
            (ENV_ANONYMOUS_ALLOWED, "no"),
            (ENV_NOTEBOOK_DIR, "/srv/nb"),
            (ENV_VERSIONED_DIR, "/srv/nbv"),
            (ENV_ISOLATE_FAILURES, "1"),
        ]))
        .unwrap();

        assert_eq!(config.storage, "memory, file-versioned");
        assert_eq!(config.default_storage, "memory");
        assert!(config.one_way_sync);
        assert!(!config.anonymous_allowed);
        assert_eq!(config.notebook_dir, PathBuf::from("/srv/nb"));
        assert_eq!(config.versioned_dir, PathBuf::from("/srv/nbv"));
        assert!(config.isolate_partial_failures);
    }

    #[test]
    fn from_lookup_missing_keys_keep_defaults() {
        let config = SyncConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, SyncConfig::default());
    }

    #[test]
    fn malformed_bool_is_configuration_error() {
        let err = SyncConfig::from_lookup(lookup(&[(ENV_ONE_WAY_SYNC, "maybe")])).unwrap_err();
        assert!(matches!(err, SyncError::Configuration(_)));
        assert!(err.to_string().contains(ENV_ONE_WAY_SYNC));
    }
}
