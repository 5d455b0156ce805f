//! Registry tree nodes.
//!
//! An [`Entry`] is one node of the configuration tree: either a `Folder`
//! (container, no value) or a `Property` (leaf carrying one encoded value).
//! Entries belong to exactly one environment; each environment has its own
//! root and subtree.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value::Value;

/// Key of the lazily created root entry of every environment.
pub const ROOT_KEY: &str = "root";
/// Label of the lazily created root entry.
pub const ROOT_LABEL: &str = "Configuration Schema";

/// Stable node identity, assigned at creation and immutable afterward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two node variants of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// Container only; holds children, never a value.
    Folder,
    /// Leaf carrying one typed, encoded value.
    Property,
}

/// One node of the registry tree.
///
/// `key` and `value` hold the codec-encoded persisted forms; decoding back
/// to native values happens at the export boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    /// Environment tag, inherited from the parent at creation; immutable.
    pub env: String,
    /// Encoded key, unique among siblings.
    pub key: String,
    /// Encoded value; `None` for folders.
    pub value: Option<String>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    /// Owning parent; `None` only for an environment root.
    pub parent: Option<EntryId>,
    pub kind: EntryKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entry {
    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Field assignments for creating or updating an entry.
///
/// `key` and `value` are native [`Value`]s; the store normalizes them
/// through the codec registry before persistence, so non-string keys
/// (symbols, ranges) persist deterministically.
#[derive(Debug, Clone, Default)]
pub struct EntryFields {
    pub key: Option<Value>,
    pub value: Option<Value>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

impl EntryFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, key: impl Into<Value>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}
