//! Identity, revision, and settings types shared by every backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Principal name used for anonymous access.
pub const ANONYMOUS: &str = "anonymous";

/// The acting principal for a backend call.
///
/// Backends may use it for authorization; the sync engine only passes it
/// through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Principal name.
    pub principal: String,
    /// Roles granted to the principal.
    #[serde(default)]
    pub roles: BTreeSet<String>,
}

impl Identity {
    /// Creates an identity with no roles.
    pub fn new(principal: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            roles: BTreeSet::new(),
        }
    }

    /// The anonymous identity.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::new(ANONYMOUS)
    }

    /// Adds a role.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    /// Returns true for the anonymous principal.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.principal == ANONYMOUS
    }
}

/// A retrievable checkpoint of a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    /// Backend-assigned revision id.
    pub id: String,
    /// Checkpoint message.
    pub message: String,
    /// When the checkpoint was taken.
    pub time: DateTime<Utc>,
}

/// How a setting is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingKind {
    /// Free-form text input.
    Input,
    /// Choice from a fixed list of options.
    Dropdown,
}

/// One backend setting descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingInfo {
    /// Setting key, used in update maps.
    pub name: String,
    /// Editing kind.
    pub kind: SettingKind,
    /// Current value.
    pub selected: String,
    /// Allowed values for dropdown settings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl SettingInfo {
    /// Creates a free-form input setting.
    pub fn input(name: impl Into<String>, selected: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SettingKind::Input,
            selected: selected.into(),
            options: Vec::new(),
        }
    }
}
