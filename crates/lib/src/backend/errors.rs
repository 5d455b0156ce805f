//! Structured error types for backend operations.

use thiserror::Error;

use crate::entry::EntryId;

/// Errors that can occur in the persistence layer.
///
/// New variants may be added in minor versions (enum is `#[non_exhaustive]`);
/// the `is_*()` helpers are the stable query surface.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// Node not found by id.
    #[error("node not found: {id}")]
    NodeNotFound {
        /// The id that was looked up
        id: EntryId,
    },

    /// Sibling key uniqueness constraint violated.
    #[error("duplicate key '{key}' under parent {parent}")]
    DuplicateKey {
        /// Parent owning the conflicting siblings
        parent: EntryId,
        /// The encoded key that already exists
        key: String,
    },

    /// Version snapshot not found for an entry and sequence number.
    #[error("version {sequence} not found for entry {entry_id}")]
    VersionNotFound {
        /// The entry whose history was searched
        entry_id: EntryId,
        /// The missing sequence number
        sequence: u64,
    },

    /// The backing store rejected or failed the operation.
    #[error("storage unavailable: {reason}")]
    StorageUnavailable {
        /// Description of the storage failure
        reason: String,
    },
}

impl BackendError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BackendError::NodeNotFound { .. } | BackendError::VersionNotFound { .. }
        )
    }

    /// Check if this error indicates a uniqueness conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, BackendError::DuplicateKey { .. })
    }
}

impl From<BackendError> for crate::Error {
    fn from(err: BackendError) -> Self {
        crate::Error::Backend(err)
    }
}
