//! Append-only version history.
//!
//! Every persisted mutation of an entry (create, update, destroy, revert)
//! appends one immutable [`Version`] snapshot with a per-entry monotonic
//! sequence number. Destroying an entry appends a final snapshot flagged as
//! a deletion instead of erasing the trail; those deletion snapshots are the
//! tombstones the merge engine consults. Versions are never mutated, and
//! removed only by an explicit history purge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entry::{Entry, EntryId};

/// Notes text recorded on the final snapshot of a destroyed entry.
pub const DELETION_NOTES: &str = "*** entry deleted ***";

/// Immutable snapshot of one entry mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub id: Uuid,
    /// The entry this snapshot is of.
    pub entry_id: EntryId,
    pub parent: Option<EntryId>,
    pub key: String,
    pub value: Option<String>,
    pub label: Option<String>,
    pub notes: Option<String>,
    /// Monotonically increasing, starting at 1, per entry.
    pub sequence: u64,
    /// True for the final snapshot appended when the entry was destroyed.
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    /// Actor identity, when the mutating store carries one.
    pub user_id: Option<String>,
}

impl Version {
    /// Snapshot the current state of an entry.
    pub fn snapshot(
        entry: &Entry,
        sequence: u64,
        at: DateTime<Utc>,
        user_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            entry_id: entry.id,
            parent: entry.parent,
            key: entry.key.clone(),
            value: entry.value.clone(),
            label: entry.label.clone(),
            notes: entry.notes.clone(),
            sequence,
            deleted: false,
            created_at: at,
            user_id,
        }
    }

    /// Snapshot an entry as it is destroyed.
    pub fn deletion(
        entry: &Entry,
        sequence: u64,
        at: DateTime<Utc>,
        user_id: Option<String>,
    ) -> Self {
        let mut version = Self::snapshot(entry, sequence, at, user_id);
        version.deleted = true;
        version.notes = Some(DELETION_NOTES.to_string());
        version
    }
}
