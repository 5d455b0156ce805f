//! Merge-import engine.
//!
//! Recursively merges a nested map into a subtree without clobbering
//! existing leaves: a leaf that already exists always wins over the merge
//! source. This is deliberately asymmetric and order-independent per key;
//! it is not a conflict resolver.

use tracing::debug;

use super::EntryStore;
use crate::Result;
use crate::entry::{Entry, EntryFields, EntryId};
use crate::value::{Value, ValueMap};

/// Options controlling merge-import behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
    /// Don't create nodes whose parent+key has a deletion tombstone in the
    /// version history. Prevents administratively-deleted keys from
    /// silently reappearing on re-import.
    pub skip_already_deleted: bool,
    /// After merging, destroy existing children whose key is absent from
    /// the source map: reconciliation instead of additive merge.
    pub delete: bool,
}

impl MergeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_already_deleted(mut self, skip: bool) -> Self {
        self.skip_already_deleted = skip;
        self
    }

    pub fn delete(mut self, delete: bool) -> Self {
        self.delete = delete;
        self
    }
}

impl EntryStore {
    /// Merge a nested map into the subtree rooted at `target`.
    ///
    /// For each key/value pair: nested maps become folders (created if
    /// absent, recursed into either way); scalars become properties only
    /// when no child with that key exists. Existing leaf values are never
    /// overwritten.
    pub fn merge(&self, target: &Entry, source: &ValueMap, opts: &MergeOptions) -> Result<()> {
        for (key, value) in source {
            let key = self.codecs().encode(&Value::Text(key.clone()));
            let existing = self.backend().find_child(&target.id, &key)?;
            match value {
                Value::Map(nested) => {
                    let folder = match existing {
                        Some(child) => Some(child),
                        None if self.should_create(&target.id, &key, opts)? => Some(
                            self.create_folder(target, EntryFields::new().key(key.as_str()))?,
                        ),
                        None => None,
                    };
                    if let Some(folder) = folder {
                        self.merge(&folder, nested, opts)?;
                    }
                }
                scalar => {
                    if existing.is_none() && self.should_create(&target.id, &key, opts)? {
                        self.create_property(
                            target,
                            EntryFields::new().key(key.as_str()).value(scalar.clone()),
                        )?;
                    }
                    // Existing leaves win; don't overwrite.
                }
            }
        }

        if opts.delete {
            let keys: Vec<String> = source
                .keys()
                .map(|k| self.codecs().encode(&Value::Text(k.clone())))
                .collect();
            for child in self.backend().children(&target.id)? {
                if !keys.contains(&child.key) {
                    debug!(key = %child.key, "reconcile: removing child absent from source");
                    self.destroy(&child)?;
                }
            }
        }
        Ok(())
    }

    fn should_create(&self, parent: &EntryId, key: &str, opts: &MergeOptions) -> Result<bool> {
        if !opts.skip_already_deleted {
            return Ok(true);
        }
        Ok(!self.backend().was_deleted(parent, key)?)
    }
}
