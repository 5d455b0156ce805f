//! Persistence layer for registry entries and version snapshots.
//!
//! The [`Backend`] trait defines the small repository interface the core
//! consumes: node CRUD, child queries, and version snapshot storage. The
//! tree/merge/codec logic above it is independent of how data is persisted.
//!
//! Operations are synchronous and block on the backing store; this is a
//! request/response model, not a streaming one. Implementations must be
//! `Send + Sync` since request-handling threads share one backend.

mod errors;
mod in_memory;

pub use errors::BackendError;
pub use in_memory::InMemoryBackend;

use crate::Result;
use crate::entry::{Entry, EntryId};
use crate::version::Version;

/// Storage abstraction consumed by the entry store and version history.
///
/// The core does not retry: constraint violations (duplicate sibling key)
/// and storage failures propagate to the caller unchanged.
pub trait Backend: Send + Sync {
    /// Retrieve a node by id, or `BackendError::NodeNotFound`.
    fn find_node(&self, id: &EntryId) -> Result<Entry>;

    /// Find a direct child of `parent` by its encoded key.
    fn find_child(&self, parent: &EntryId, key: &str) -> Result<Option<Entry>>;

    /// Find the root node of an environment, if the environment has one.
    fn find_root(&self, env: &str) -> Result<Option<Entry>>;

    /// All direct children of a node, ordered by key ascending.
    fn children(&self, parent: &EntryId) -> Result<Vec<Entry>>;

    /// Persist a new node. Fails with `BackendError::DuplicateKey` if a
    /// sibling with the same key exists.
    fn create_node(&self, entry: Entry) -> Result<()>;

    /// Persist updated fields of an existing node.
    fn update_node(&self, entry: Entry) -> Result<()>;

    /// Delete a node and, cascading, all of its descendants.
    fn delete_node(&self, id: &EntryId) -> Result<()>;

    /// Append an immutable version snapshot.
    fn append_version(&self, version: Version) -> Result<()>;

    /// All snapshots for an entry, ordered by sequence ascending.
    fn list_versions(&self, entry_id: &EntryId) -> Result<Vec<Version>>;

    /// One snapshot by entry and sequence number.
    fn find_version(&self, entry_id: &EntryId, sequence: u64) -> Result<Option<Version>>;

    /// Tombstone index query: true if any deletion snapshot exists for a
    /// node that lived under `parent` with the given encoded key.
    fn was_deleted(&self, parent: &EntryId, key: &str) -> Result<bool>;

    /// Remove all snapshots for an entry (explicit history purge).
    fn purge_versions(&self, entry_id: &EntryId) -> Result<()>;

    /// Distinct environments that have a root node, sorted.
    fn environments(&self) -> Result<Vec<String>>;

    /// Every node of an environment's subtree.
    fn all_in_env(&self, env: &str) -> Result<Vec<Entry>>;
}
