//! Tree operations over the persistence layer.
//!
//! [`EntryStore`] is the node store of the registry: it owns key/value
//! normalization through the codec registry, lazy per-environment root
//! creation, path resolution, cascading destruction, and the version
//! history bookkeeping that every mutation goes through. The merge-import
//! and export engines live in the [`merge`] and [`export`] submodules as
//! further `impl` blocks on the same type.

mod errors;
mod export;
mod merge;

pub use errors::StoreError;
pub use export::LAST_UPDATED_KEY;
pub use merge::MergeOptions;

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::Result;
use crate::backend::{Backend, BackendError};
use crate::clock::Clock;
use crate::codec::CodecRegistry;
use crate::entry::{Entry, EntryFields, EntryId, EntryKind, ROOT_KEY, ROOT_LABEL};
use crate::value::Value;
use crate::version::Version;

/// Service object for all tree mutations and queries.
///
/// Cheap to clone; clones share the backend, codec registry, and clock.
/// An optional actor identity travels with the store and is recorded on
/// every version snapshot it appends.
#[derive(Clone)]
pub struct EntryStore {
    backend: Arc<dyn Backend>,
    codecs: Arc<CodecRegistry>,
    clock: Arc<dyn Clock>,
    actor: Option<String>,
}

impl EntryStore {
    /// Create a store over a backend with the default codec set and the
    /// system clock.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_parts(
            backend,
            Arc::new(CodecRegistry::with_defaults()),
            Arc::new(crate::clock::SystemClock),
        )
    }

    /// Create a store with explicit codec registry and clock dependencies.
    pub fn with_parts(
        backend: Arc<dyn Backend>,
        codecs: Arc<CodecRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            backend,
            codecs,
            clock,
            actor: None,
        }
    }

    /// Return a store that records the given actor identity on versions.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// The root entry for an environment, created lazily on first access.
    pub fn root(&self, env: &str) -> Result<Entry> {
        if let Some(root) = self.backend.find_root(env)? {
            return Ok(root);
        }
        self.create(
            None,
            env,
            EntryKind::Folder,
            EntryFields::new().key(ROOT_KEY).label(ROOT_LABEL),
        )
    }

    /// Resolve a `/`-delimited path to a descendant.
    ///
    /// A leading slash and empty segments are ignored. Fails with
    /// [`StoreError::PathNotFound`] naming the first missing segment.
    pub fn child(&self, entry: &Entry, path: &str) -> Result<Entry> {
        let mut current = entry.clone();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = self.backend.find_child(&current.id, segment)?.ok_or_else(|| {
                StoreError::PathNotFound {
                    parent: current.key.clone(),
                    segment: segment.to_string(),
                }
            })?;
        }
        Ok(current)
    }

    /// Create a folder under `parent`.
    pub fn create_folder(&self, parent: &Entry, fields: EntryFields) -> Result<Entry> {
        self.create(Some(parent), &parent.env, EntryKind::Folder, fields)
    }

    /// Create a property under `parent`.
    pub fn create_property(&self, parent: &Entry, fields: EntryFields) -> Result<Entry> {
        self.create(Some(parent), &parent.env, EntryKind::Property, fields)
    }

    fn create(
        &self,
        parent: Option<&Entry>,
        env: &str,
        kind: EntryKind,
        fields: EntryFields,
    ) -> Result<Entry> {
        if let Some(parent) = parent
            && !parent.is_folder()
        {
            return Err(StoreError::NotAFolder {
                key: parent.key.clone(),
            }
            .into());
        }
        let key = fields
            .key
            .as_ref()
            .map(|k| self.codecs.encode(k))
            .ok_or(StoreError::MissingKey)?;
        let value = match kind {
            EntryKind::Folder => None,
            EntryKind::Property => fields.value.as_ref().map(|v| self.codecs.encode(v)),
        };
        let now = self.clock.now();
        let entry = Entry {
            id: EntryId::new(),
            env: env.to_string(),
            key,
            value,
            label: fields.label,
            description: fields.description,
            notes: fields.notes,
            parent: parent.map(|p| p.id),
            kind,
            created_at: now,
            updated_at: now,
        };
        self.backend.create_node(entry.clone())?;
        self.record_version(&entry, false)?;
        Ok(entry)
    }

    /// Apply field updates to an entry and persist.
    ///
    /// The environment is inherited at creation and never recomputed; it is
    /// not updatable. Key and value are normalized through the codec
    /// registry, as at creation.
    pub fn update(&self, entry: &Entry, fields: EntryFields) -> Result<Entry> {
        let mut updated = entry.clone();
        if let Some(key) = &fields.key {
            updated.key = self.codecs.encode(key);
        }
        if let Some(value) = &fields.value
            && !updated.is_folder()
        {
            updated.value = Some(self.codecs.encode(value));
        }
        if let Some(label) = fields.label {
            updated.label = Some(label);
        }
        if let Some(description) = fields.description {
            updated.description = Some(description);
        }
        if let Some(notes) = fields.notes {
            updated.notes = Some(notes);
        }
        updated.updated_at = self.clock.now();
        self.backend.update_node(updated.clone())?;
        self.record_version(&updated, false)?;
        Ok(updated)
    }

    /// Destroy an entry and all descendants, appending a deletion-annotated
    /// final version for every node removed.
    pub fn destroy(&self, entry: &Entry) -> Result<()> {
        let mut doomed = Vec::new();
        self.collect_subtree(entry, &mut doomed)?;
        // Children first, matching cascade order.
        for node in &doomed {
            self.record_version(node, true)?;
        }
        self.backend.delete_node(&entry.id)?;
        debug!(key = %entry.key, env = %entry.env, nodes = doomed.len(), "destroyed subtree");
        Ok(())
    }

    fn collect_subtree(&self, entry: &Entry, out: &mut Vec<Entry>) -> Result<()> {
        for child in self.backend.children(&entry.id)? {
            self.collect_subtree(&child, out)?;
        }
        out.push(entry.clone());
        Ok(())
    }

    /// Child folders of an entry, key ascending.
    pub fn folders(&self, entry: &Entry) -> Result<Vec<Entry>> {
        Ok(self
            .backend
            .children(&entry.id)?
            .into_iter()
            .filter(Entry::is_folder)
            .collect())
    }

    /// Child properties of an entry, key ascending.
    pub fn properties(&self, entry: &Entry) -> Result<Vec<Entry>> {
        Ok(self
            .backend
            .children(&entry.id)?
            .into_iter()
            .filter(|child| !child.is_folder())
            .collect())
    }

    /// Ancestors of an entry, nearest first, ending at the root.
    pub fn ancestors(&self, entry: &Entry) -> Result<Vec<Entry>> {
        let mut ancestors = Vec::new();
        let mut current = entry.clone();
        while let Some(parent_id) = current.parent {
            current = self.backend.find_node(&parent_id)?;
            ancestors.push(current.clone());
        }
        Ok(ancestors)
    }

    /// Distinct environments that have a root.
    pub fn environments(&self) -> Result<Vec<String>> {
        self.backend.environments()
    }

    /// Version history for an entry, sequence ascending.
    pub fn versions(&self, entry: &Entry) -> Result<Vec<Version>> {
        self.backend.list_versions(&entry.id)
    }

    /// Reassign an entry's mutable fields from a history snapshot and
    /// persist. The revert is itself a mutation and appends a new version;
    /// history length always grows.
    pub fn revert(&self, entry: &Entry, sequence: u64) -> Result<Entry> {
        let version = self
            .backend
            .find_version(&entry.id, sequence)?
            .ok_or(BackendError::VersionNotFound {
                entry_id: entry.id,
                sequence,
            })?;
        let mut reverted = entry.clone();
        reverted.key = version.key;
        reverted.value = version.value;
        reverted.label = version.label;
        reverted.notes = version.notes;
        reverted.updated_at = self.clock.now();
        self.backend.update_node(reverted.clone())?;
        self.record_version(&reverted, false)?;
        Ok(reverted)
    }

    /// Remove an entry's version trail. The only way history ever shrinks.
    pub fn purge_history(&self, entry: &Entry) -> Result<()> {
        self.backend.purge_versions(&entry.id)
    }

    fn record_version(&self, entry: &Entry, deleted: bool) -> Result<()> {
        let sequence = self
            .backend
            .list_versions(&entry.id)?
            .last()
            .map(|v| v.sequence + 1)
            .unwrap_or(1);
        let now = self.clock.now();
        let version = if deleted {
            Version::deletion(entry, sequence, now, self.actor.clone())
        } else {
            Version::snapshot(entry, sequence, now, self.actor.clone())
        };
        self.backend.append_version(version)
    }

    /// Summary form of a folder for external (UI) consumers.
    pub fn folder_summary(&self, entry: &Entry) -> FolderSummary {
        let label = entry.label.clone().unwrap_or_default();
        let text = if label.is_empty() {
            entry.key.clone()
        } else {
            label.clone()
        };
        FolderSummary {
            id: entry.id.to_string(),
            key: entry.key.clone(),
            label,
            text,
        }
    }

    /// Summary form of a property for external (UI) consumers.
    pub fn property_summary(&self, entry: &Entry) -> Result<PropertySummary> {
        let label = entry.label.clone().unwrap_or_default();
        Ok(PropertySummary {
            id: entry.id.to_string(),
            key: entry.key.clone(),
            value: entry.value.clone().unwrap_or_default(),
            label: if label.is_empty() {
                entry.key.clone()
            } else {
                label
            },
            description: entry.description.clone().unwrap_or_default(),
            access_code: self.access_code(entry)?,
            notes: entry.notes.clone().unwrap_or_default(),
        })
    }

    /// The accessor expression for a property, e.g. `Registry.api.enabled?`.
    ///
    /// Boolean-valued properties get the `?` probe suffix.
    fn access_code(&self, entry: &Entry) -> Result<String> {
        let mut parts = vec!["Registry".to_string()];
        let mut keys: Vec<String> = self
            .ancestors(entry)?
            .into_iter()
            .map(|a| a.key)
            .filter(|k| k != ROOT_KEY)
            .collect();
        keys.reverse();
        parts.extend(keys);
        let boolean = entry
            .value
            .as_deref()
            .is_some_and(|v| matches!(self.codecs.decode(v), Value::Bool(_)));
        parts.push(if boolean {
            format!("{}?", entry.key)
        } else {
            entry.key.clone()
        });
        Ok(parts.join("."))
    }
}

impl std::fmt::Debug for EntryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryStore")
            .field("actor", &self.actor)
            .finish_non_exhaustive()
    }
}

/// Folder summary exposed to external callers.
#[derive(Debug, Clone, Serialize)]
pub struct FolderSummary {
    pub id: String,
    pub key: String,
    pub label: String,
    pub text: String,
}

impl FolderSummary {
    /// JSON form, as served to tree-view UI consumers.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Property summary exposed to external callers.
#[derive(Debug, Clone, Serialize)]
pub struct PropertySummary {
    pub id: String,
    pub key: String,
    pub value: String,
    pub label: String,
    pub description: String,
    pub access_code: String,
    pub notes: String,
}

impl PropertySummary {
    /// JSON form, as served to tree-view UI consumers.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
