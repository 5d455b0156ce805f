//! Export engine.
//!
//! Serializes a subtree back into a nested map, decoding values through the
//! codec registry. The inverse of the merge-import direction, up to the
//! `_last_updated_at` freshness marker added at the top level.

use chrono::{DateTime, Utc};

use super::{EntryStore, StoreError};
use crate::Result;
use crate::entry::Entry;
use crate::value::{Value, ValueMap};

/// Reserved top-level key carrying the maximum `updated_at` across all
/// entries of the exported environment. Used for cache-freshness
/// comparisons by external callers; stripped again on import.
pub const LAST_UPDATED_KEY: &str = "_last_updated_at";

impl EntryStore {
    /// Export an environment's tree as a nested map.
    ///
    /// Fails with [`StoreError::UnsupportedEnvironment`] when the
    /// environment has no root.
    pub fn export_env(&self, env: &str) -> Result<ValueMap> {
        let root = self
            .backend()
            .find_root(env)?
            .ok_or_else(|| StoreError::UnsupportedEnvironment {
                env: env.to_string(),
            })?;
        self.export(&root)
    }

    /// Export the subtree rooted at `entry` as a nested map, with the
    /// `_last_updated_at` marker computed once for this top-level call.
    ///
    /// Values are decoded through the codecs; keys stay in their stored
    /// encoded form, since map keys are strings and the encoded form is
    /// what a re-import normalizes back to.
    pub fn export(&self, entry: &Entry) -> Result<ValueMap> {
        let mut map = ValueMap::new();
        if let Some(last) = self.last_updated_at(entry)? {
            map.insert(LAST_UPDATED_KEY.to_string(), Value::Time(last));
        }
        self.export_into(entry, &mut map)?;
        Ok(map)
    }

    fn export_into(&self, entry: &Entry, map: &mut ValueMap) -> Result<()> {
        for property in self.properties(entry)? {
            let value = property
                .value
                .as_deref()
                .map(|v| self.codecs().decode(v))
                .unwrap_or_else(|| Value::Text(String::new()));
            map.insert(property.key, value);
        }
        for folder in self.folders(entry)? {
            if self.backend().children(&folder.id)?.is_empty() {
                continue;
            }
            let mut nested = ValueMap::new();
            self.export_into(&folder, &mut nested)?;
            map.insert(folder.key, Value::Map(nested));
        }
        Ok(())
    }

    /// Maximum `updated_at` across the environment's entries, excluding the
    /// subtree root itself. `None` when the environment holds nothing else.
    fn last_updated_at(&self, entry: &Entry) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .backend()
            .all_in_env(&entry.env)?
            .into_iter()
            .filter(|other| other.id != entry.id)
            .map(|other| other.updated_at)
            .max())
    }
}
