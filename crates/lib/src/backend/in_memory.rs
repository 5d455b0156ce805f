//! In-memory backend.

use std::collections::HashMap;
use std::sync::RwLock;

use super::{Backend, BackendError};
use crate::Result;
use crate::entry::{Entry, EntryId};
use crate::version::Version;

/// A simple in-memory backend using `HashMap` tables behind read-write
/// locks.
///
/// Suitable for testing, development, or scenarios where persistence is
/// handled externally. Enforces the sibling-key uniqueness constraint the
/// same way a database unique index on `(parent_id, key)` would.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    nodes: RwLock<HashMap<EntryId, Entry>>,
    versions: RwLock<HashMap<EntryId, Vec<Version>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of live nodes, across all environments.
    pub fn node_count(&self) -> usize {
        self.nodes.read().unwrap().len()
    }

    /// Total number of stored version snapshots.
    pub fn version_count(&self) -> usize {
        self.versions.read().unwrap().values().map(Vec::len).sum()
    }

    fn collect_subtree(nodes: &HashMap<EntryId, Entry>, id: &EntryId, out: &mut Vec<EntryId>) {
        out.push(*id);
        for entry in nodes.values() {
            if entry.parent.as_ref() == Some(id) {
                Self::collect_subtree(nodes, &entry.id, out);
            }
        }
    }
}

impl Backend for InMemoryBackend {
    fn find_node(&self, id: &EntryId) -> Result<Entry> {
        self.nodes
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| BackendError::NodeNotFound { id: *id }.into())
    }

    fn find_child(&self, parent: &EntryId, key: &str) -> Result<Option<Entry>> {
        let nodes = self.nodes.read().unwrap();
        Ok(nodes
            .values()
            .find(|entry| entry.parent.as_ref() == Some(parent) && entry.key == key)
            .cloned())
    }

    fn find_root(&self, env: &str) -> Result<Option<Entry>> {
        let nodes = self.nodes.read().unwrap();
        Ok(nodes
            .values()
            .find(|entry| entry.parent.is_none() && entry.env == env)
            .cloned())
    }

    fn children(&self, parent: &EntryId) -> Result<Vec<Entry>> {
        let nodes = self.nodes.read().unwrap();
        let mut children: Vec<Entry> = nodes
            .values()
            .filter(|entry| entry.parent.as_ref() == Some(parent))
            .cloned()
            .collect();
        children.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(children)
    }

    fn create_node(&self, entry: Entry) -> Result<()> {
        let mut nodes = self.nodes.write().unwrap();
        if let Some(parent) = &entry.parent
            && nodes
                .values()
                .any(|other| other.parent.as_ref() == Some(parent) && other.key == entry.key)
        {
            return Err(BackendError::DuplicateKey {
                parent: *parent,
                key: entry.key,
            }
            .into());
        }
        nodes.insert(entry.id, entry);
        Ok(())
    }

    fn update_node(&self, entry: Entry) -> Result<()> {
        let mut nodes = self.nodes.write().unwrap();
        if !nodes.contains_key(&entry.id) {
            return Err(BackendError::NodeNotFound { id: entry.id }.into());
        }
        if let Some(parent) = &entry.parent
            && nodes.values().any(|other| {
                other.id != entry.id
                    && other.parent.as_ref() == Some(parent)
                    && other.key == entry.key
            })
        {
            return Err(BackendError::DuplicateKey {
                parent: *parent,
                key: entry.key,
            }
            .into());
        }
        nodes.insert(entry.id, entry);
        Ok(())
    }

    fn delete_node(&self, id: &EntryId) -> Result<()> {
        let mut nodes = self.nodes.write().unwrap();
        if !nodes.contains_key(id) {
            return Err(BackendError::NodeNotFound { id: *id }.into());
        }
        let mut doomed = Vec::new();
        Self::collect_subtree(&nodes, id, &mut doomed);
        for id in doomed {
            nodes.remove(&id);
        }
        Ok(())
    }

    fn append_version(&self, version: Version) -> Result<()> {
        let mut versions = self.versions.write().unwrap();
        versions.entry(version.entry_id).or_default().push(version);
        Ok(())
    }

    fn list_versions(&self, entry_id: &EntryId) -> Result<Vec<Version>> {
        let versions = self.versions.read().unwrap();
        let mut list = versions.get(entry_id).cloned().unwrap_or_default();
        list.sort_by_key(|v| v.sequence);
        Ok(list)
    }

    fn find_version(&self, entry_id: &EntryId, sequence: u64) -> Result<Option<Version>> {
        let versions = self.versions.read().unwrap();
        Ok(versions
            .get(entry_id)
            .and_then(|list| list.iter().find(|v| v.sequence == sequence))
            .cloned())
    }

    fn was_deleted(&self, parent: &EntryId, key: &str) -> Result<bool> {
        let versions = self.versions.read().unwrap();
        Ok(versions.values().flatten().any(|v| {
            v.deleted && v.parent.as_ref() == Some(parent) && v.key == key
        }))
    }

    fn purge_versions(&self, entry_id: &EntryId) -> Result<()> {
        self.versions.write().unwrap().remove(entry_id);
        Ok(())
    }

    fn environments(&self) -> Result<Vec<String>> {
        let nodes = self.nodes.read().unwrap();
        let mut envs: Vec<String> = nodes
            .values()
            .filter(|entry| entry.parent.is_none())
            .map(|entry| entry.env.clone())
            .collect();
        envs.sort();
        envs.dedup();
        Ok(envs)
    }

    fn all_in_env(&self, env: &str) -> Result<Vec<Entry>> {
        let nodes = self.nodes.read().unwrap();
        Ok(nodes
            .values()
            .filter(|entry| entry.env == env)
            .cloned()
            .collect())
    }
}
