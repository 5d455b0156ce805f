//! Cached read/write facade.
//!
//! [`Registry`] fronts an [`EntryStore`] with per-environment views: each
//! environment's tree is exported once into a nested [`ValueMap`] and
//! served from memory until reset, either explicitly or through an
//! optional time-to-live. [`Accessor`] is the handle application code
//! reads and writes through, addressing values by `/`-delimited paths.
//!
//! Temporary values can be layered over a view with
//! [`Registry::with_overrides`]; the overridden keys revert to their
//! prior values when the closure returns, panicking or not, while writes
//! to other keys made inside the scope stay visible. Cache resets are
//! suppressed while any override is active so the layered values cannot
//! be clobbered by a concurrent reset.

mod errors;

pub use errors::CacheError;

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::Result;
use crate::entry::{Entry, EntryFields, EntryId, EntryKind};
use crate::store::{
    EntryStore, FolderSummary, LAST_UPDATED_KEY, MergeOptions, PropertySummary,
};
use crate::value::{Value, ValueMap};
use crate::version::Version;

struct CacheState {
    views: HashMap<String, ValueMap>,
    last_reset: DateTime<Utc>,
    suppress_depth: usize,
}

/// Environment-aware configuration facade with an in-memory cache.
pub struct Registry {
    store: EntryStore,
    reset_interval: Option<Duration>,
    state: Mutex<CacheState>,
}

impl Registry {
    pub fn new(store: EntryStore) -> Self {
        let last_reset = store.clock().now();
        Self {
            store,
            reset_interval: None,
            state: Mutex::new(CacheState {
                views: HashMap::new(),
                last_reset,
                suppress_depth: 0,
            }),
        }
    }

    /// Expire all cached views after `interval`, re-reading from the
    /// store on the next access.
    pub fn with_reset_interval(mut self, interval: Duration) -> Self {
        self.reset_interval = Some(interval);
        self
    }

    /// The underlying store, for administrative operations. Call
    /// [`Registry::reset_all`] after mutating through it directly.
    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    /// A read/write handle rooted at an environment's top level.
    pub fn view(&self, env: &str) -> Accessor<'_> {
        Accessor {
            registry: self,
            env: env.to_string(),
            path: Vec::new(),
        }
    }

    /// Whether the reset interval has elapsed since the last reset.
    /// Always false when no interval is configured.
    pub fn should_reset(&self) -> bool {
        let state = self.state.lock().unwrap();
        self.interval_elapsed(&state)
    }

    /// Drop the cached view of one environment. No-op while overrides
    /// are active.
    pub fn reset(&self, env: &str) {
        let mut state = self.state.lock().unwrap();
        if state.suppress_depth > 0 {
            return;
        }
        state.views.remove(env);
    }

    /// Drop every cached view and restart the reset interval. No-op
    /// while overrides are active.
    pub fn reset_all(&self) {
        let mut state = self.state.lock().unwrap();
        if state.suppress_depth > 0 {
            return;
        }
        state.views.clear();
        state.last_reset = self.store.clock().now();
    }

    /// Layer `overrides` on top of an environment's view for the duration
    /// of `f`. Overridden keys shadow stored values; folders are merged
    /// key by key so untouched siblings stay visible. Only the overridden
    /// keys are snapshotted and restored, so writes to other keys made
    /// inside the scope survive it. Nesting is allowed and restores in
    /// reverse order.
    pub fn with_overrides<R>(
        &self,
        env: &str,
        overrides: ValueMap,
        f: impl FnOnce(Accessor<'_>) -> R,
    ) -> Result<R> {
        self.with_view(env, |_| ())?;
        let guard = {
            let mut state = self.state.lock().unwrap();
            let view = state.views.entry(env.to_string()).or_default();
            let saved = snapshot_overridden(view, &overrides);
            apply_overrides(view, &overrides);
            state.suppress_depth += 1;
            OverrideGuard {
                registry: self,
                env: env.to_string(),
                saved,
            }
        };
        let result = f(self.view(env));
        drop(guard);
        Ok(result)
    }

    /// Run `f` against the cached view of `env`, loading it from the
    /// store first when absent. Honors the reset interval unless an
    /// override is active.
    fn with_view<R>(&self, env: &str, f: impl FnOnce(&ValueMap) -> R) -> Result<R> {
        {
            let state = self.state.lock().unwrap();
            if state.suppress_depth == 0
                && let Some(view) = state.views.get(env)
                && !self.interval_elapsed(&state)
            {
                return Ok(f(view));
            }
            if state.suppress_depth > 0 {
                if let Some(view) = state.views.get(env) {
                    return Ok(f(view));
                }
            }
        }
        let map = self.load_view(env)?;
        let mut state = self.state.lock().unwrap();
        if state.suppress_depth == 0 && self.interval_elapsed(&state) {
            debug!(env, "cache interval elapsed, dropping all views");
            state.views.clear();
            state.last_reset = self.store.clock().now();
        }
        let view = state.views.entry(env.to_string()).or_insert(map);
        Ok(f(view))
    }

    fn interval_elapsed(&self, state: &CacheState) -> bool {
        let Some(interval) = self.reset_interval else {
            return false;
        };
        let elapsed = self.store.clock().now() - state.last_reset;
        elapsed >= chrono::Duration::from_std(interval).unwrap_or(chrono::Duration::MAX)
    }

    /// Export an environment into a view map. Environments that do not
    /// exist yet read as empty rather than failing.
    fn load_view(&self, env: &str) -> Result<ValueMap> {
        let Some(root) = self.store.backend().find_root(env)? else {
            return Ok(ValueMap::new());
        };
        let mut map = self.store.export(&root)?;
        map.remove(LAST_UPDATED_KEY);
        Ok(map)
    }

    /// Write a value through to the store, creating missing folders along
    /// the path, then patch the cached view in place.
    fn persist(&self, env: &str, segments: &[String], value: &Value) -> Result<()> {
        let Some((leaf, folders)) = segments.split_last() else {
            return Err(crate::store::StoreError::MissingKey.into());
        };
        let mut current = self.store.root(env)?;
        for (depth, segment) in folders.iter().enumerate() {
            current = match self.store.backend().find_child(&current.id, segment)? {
                Some(entry) if entry.kind == EntryKind::Folder => entry,
                Some(_) => {
                    return Err(CacheError::NotAFolder {
                        path: segments[..=depth].join("/"),
                    }
                    .into());
                }
                None => self
                    .store
                    .create_folder(&current, EntryFields::new().key(segment.as_str()))?,
            };
        }
        match self.store.backend().find_child(&current.id, leaf)? {
            Some(entry) if entry.kind == EntryKind::Property => {
                self.store
                    .update(&entry, EntryFields::new().value(value.clone()))?;
            }
            Some(_) => {
                return Err(CacheError::NotAProperty {
                    path: segments.join("/"),
                }
                .into());
            }
            None => {
                self.store.create_property(
                    &current,
                    EntryFields::new().key(leaf.as_str()).value(value.clone()),
                )?;
            }
        }
        Ok(())
    }

    /// Patch the cached view without touching the store.
    fn patch_view(&self, env: &str, segments: &[String], value: &Value) {
        let mut state = self.state.lock().unwrap();
        let view = state.views.entry(env.to_string()).or_default();
        insert_at(view, segments, value.clone());
    }
}

/// Administrative query surface, as consumed by an external UI.
///
/// These address nodes by id, delegate to the store, and drop the affected
/// environment's cached view on every mutation so facade reads never serve
/// stale admin edits.
impl Registry {
    pub fn node(&self, id: &EntryId) -> Result<Entry> {
        self.store.backend().find_node(id)
    }

    /// Child summaries of a node, partitioned into folders and properties.
    pub fn summaries(
        &self,
        id: &EntryId,
    ) -> Result<(Vec<FolderSummary>, Vec<PropertySummary>)> {
        let node = self.node(id)?;
        let folders = self
            .store
            .folders(&node)?
            .iter()
            .map(|folder| self.store.folder_summary(folder))
            .collect();
        let mut properties = Vec::new();
        for property in self.store.properties(&node)? {
            properties.push(self.store.property_summary(&property)?);
        }
        Ok((folders, properties))
    }

    pub fn create_folder(&self, parent: &EntryId, fields: EntryFields) -> Result<Entry> {
        let parent = self.node(parent)?;
        let created = self.store.create_folder(&parent, fields)?;
        self.reset(&created.env);
        Ok(created)
    }

    pub fn create_property(&self, parent: &EntryId, fields: EntryFields) -> Result<Entry> {
        let parent = self.node(parent)?;
        let created = self.store.create_property(&parent, fields)?;
        self.reset(&created.env);
        Ok(created)
    }

    pub fn update_node(&self, id: &EntryId, fields: EntryFields) -> Result<Entry> {
        let node = self.node(id)?;
        let updated = self.store.update(&node, fields)?;
        self.reset(&updated.env);
        Ok(updated)
    }

    pub fn delete_node(&self, id: &EntryId) -> Result<()> {
        let node = self.node(id)?;
        self.store.destroy(&node)?;
        self.reset(&node.env);
        Ok(())
    }

    pub fn node_versions(&self, id: &EntryId) -> Result<Vec<Version>> {
        let node = self.node(id)?;
        self.store.versions(&node)
    }

    /// Create-or-update each scalar in `values` as a property under `id`.
    /// Nested maps are skipped; folder structure is not bulk-editable.
    pub fn put_properties(&self, id: &EntryId, values: &ValueMap) -> Result<()> {
        let node = self.node(id)?;
        for (key, value) in values {
            if value.is_map() {
                continue;
            }
            let encoded = self.store.codecs().encode(&Value::Text(key.clone()));
            match self.store.backend().find_child(&node.id, &encoded)? {
                Some(existing) => {
                    self.store
                        .update(&existing, EntryFields::new().value(value.clone()))?;
                }
                None => {
                    self.store.create_property(
                        &node,
                        EntryFields::new().key(key.as_str()).value(value.clone()),
                    )?;
                }
            }
        }
        self.reset(&node.env);
        Ok(())
    }

    /// Destroy the named child properties of `id`. Folders are left alone.
    pub fn delete_properties(&self, id: &EntryId, keys: &[&str]) -> Result<()> {
        let node = self.node(id)?;
        for key in keys {
            if let Some(child) = self.store.backend().find_child(&node.id, key)?
                && !child.is_folder()
            {
                self.store.destroy(&child)?;
            }
        }
        self.reset(&node.env);
        Ok(())
    }

    /// Every environment exported as a nested map, interchange-compatible.
    pub fn export_tree(&self) -> Result<BTreeMap<String, ValueMap>> {
        crate::interchange::export_map(&self.store)
    }

    /// Import a whole interchange document, then drop every cached view.
    pub fn import_tree(&self, data: &str, opts: &MergeOptions) -> Result<()> {
        crate::interchange::import_str(&self.store, data, opts)?;
        self.reset_all();
        Ok(())
    }
}

/// Pre-override state of one overridden key.
enum Saved {
    Absent,
    Value(Value),
    Map(BTreeMap<String, Saved>),
}

/// Restores the overridden keys when dropped, including during panic
/// unwinding. Keys the override never touched keep whatever the scope
/// left in the view.
struct OverrideGuard<'a> {
    registry: &'a Registry,
    env: String,
    saved: BTreeMap<String, Saved>,
}

impl Drop for OverrideGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.registry.state.lock().unwrap();
        if let Some(view) = state.views.get_mut(&self.env) {
            restore_overridden(view, std::mem::take(&mut self.saved));
        }
        state.suppress_depth -= 1;
    }
}

fn apply_overrides(view: &mut ValueMap, overrides: &ValueMap) {
    for (key, value) in overrides {
        match (view.get_mut(key), value) {
            (Some(Value::Map(existing)), Value::Map(nested)) => {
                apply_overrides(existing, nested);
            }
            _ => {
                view.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Record the prior value of each key `apply_overrides` is about to
/// touch, recursing exactly where it merges instead of replacing.
fn snapshot_overridden(view: &ValueMap, overrides: &ValueMap) -> BTreeMap<String, Saved> {
    let mut saved = BTreeMap::new();
    for (key, value) in overrides {
        let prior = match (view.get(key), value) {
            (Some(Value::Map(existing)), Value::Map(nested)) => {
                Saved::Map(snapshot_overridden(existing, nested))
            }
            (Some(existing), _) => Saved::Value(existing.clone()),
            (None, _) => Saved::Absent,
        };
        saved.insert(key.clone(), prior);
    }
    saved
}

fn restore_overridden(view: &mut ValueMap, saved: BTreeMap<String, Saved>) {
    for (key, prior) in saved {
        match prior {
            Saved::Absent => {
                view.remove(&key);
            }
            Saved::Value(value) => {
                view.insert(key, value);
            }
            Saved::Map(nested) => {
                if let Some(Value::Map(existing)) = view.get_mut(&key) {
                    restore_overridden(existing, nested);
                }
            }
        }
    }
}

fn insert_at(view: &mut ValueMap, segments: &[String], value: Value) {
    let Some((leaf, folders)) = segments.split_last() else {
        return;
    };
    let mut current = view;
    for segment in folders {
        let slot = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Map(ValueMap::new()));
        if !slot.is_map() {
            *slot = Value::Map(ValueMap::new());
        }
        let Value::Map(map) = slot else { return };
        current = map;
    }
    current.insert(leaf.clone(), value);
}

fn lookup<'a>(view: &'a ValueMap, segments: &[String]) -> Option<&'a Value> {
    let (leaf, folders) = segments.split_last()?;
    let mut current = view;
    for segment in folders {
        current = current.get(segment)?.as_map()?;
    }
    current.get(leaf)
}

/// A read/write handle over one environment's cached view, scoped to a
/// path within the tree.
pub struct Accessor<'a> {
    registry: &'a Registry,
    env: String,
    path: Vec<String>,
}

impl<'a> Accessor<'a> {
    /// A handle scoped further down the tree. Leading slashes and empty
    /// segments are ignored. The result borrows the registry, not this
    /// handle, so it outlives a temporary parent.
    pub fn at(&self, path: &str) -> Accessor<'a> {
        let mut scoped = Vec::from(self.path.as_slice());
        scoped.extend(split_path(path));
        Accessor {
            registry: self.registry,
            env: self.env.clone(),
            path: scoped,
        }
    }

    fn segments(&self, key: &str) -> Vec<String> {
        let mut segments = self.path.clone();
        segments.extend(split_path(key));
        segments
    }

    /// The decoded value at `key`, which may itself be a `/`-delimited
    /// path. `None` when any segment is missing.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        let segments = self.segments(key);
        self.registry
            .with_view(&self.env, |view| lookup(view, &segments).cloned())
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        Ok(self.get(key)?.as_ref().and_then(Value::as_bool))
    }

    pub fn get_int(&self, key: &str) -> Result<Option<i64>> {
        Ok(self.get(key)?.as_ref().and_then(Value::as_int))
    }

    pub fn get_float(&self, key: &str) -> Result<Option<f64>> {
        Ok(self.get(key)?.as_ref().and_then(Value::as_float))
    }

    pub fn get_str(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .get(key)?
            .as_ref()
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    /// The boolean probe: false for a missing key, otherwise the value's
    /// truthiness, where only `false` itself is falsy.
    pub fn truthy(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some_and(|v| v.is_truthy()))
    }

    pub fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Persist a value and patch the cached view. Missing folders along
    /// the path are created; writing through an existing property or onto
    /// an existing folder fails.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let segments = self.segments(key);
        // Normalize through the codecs so the cached view holds exactly
        // what a reload from the store would produce.
        let codecs = self.registry.store.codecs();
        let value = codecs.decode(&codecs.encode(&value.into()));
        // Load before patching so a partial view never masks stored data.
        self.registry.with_view(&self.env, |_| ())?;
        self.registry.persist(&self.env, &segments, &value)?;
        self.registry.patch_view(&self.env, &segments, &value);
        Ok(())
    }

    /// Patch the cached view only. The change is lost on the next reset
    /// and never reaches the store.
    pub fn set_unsaved(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let segments = self.segments(key);
        self.registry.with_view(&self.env, |_| ())?;
        self.registry.patch_view(&self.env, &segments, &value.into());
        Ok(())
    }
}

fn split_path(path: &str) -> impl Iterator<Item = String> + '_ {
    path.split('/').filter(|s| !s.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::clock::FixedClock;
    use crate::codec::CodecRegistry;
    use crate::store::MergeOptions;

    fn registry() -> Registry {
        Registry::new(EntryStore::new(Arc::new(InMemoryBackend::new())))
    }

    fn seeded() -> Registry {
        let registry = registry();
        let source: ValueMap = [(
            "api".to_string(),
            Value::Map(
                [
                    ("enabled".to_string(), Value::Bool(true)),
                    ("limit".to_string(), Value::Int(1)),
                ]
                .into(),
            ),
        )]
        .into();
        let root = registry.store().root("test").unwrap();
        registry
            .store()
            .merge(&root, &source, &MergeOptions::new())
            .unwrap();
        registry
    }

    #[test]
    fn reads_through_paths() {
        let registry = seeded();
        let view = registry.view("test");
        assert_eq!(view.get_bool("api/enabled").unwrap(), Some(true));
        assert_eq!(view.get_int("api/limit").unwrap(), Some(1));
        assert_eq!(view.at("/api").get_int("limit").unwrap(), Some(1));
        assert!(view.get("api/missing").unwrap().is_none());
        assert!(view.get("nope/limit").unwrap().is_none());
    }

    #[test]
    fn truthy_and_exists() {
        let registry = seeded();
        let view = registry.view("test");
        assert!(view.truthy("api/enabled").unwrap());
        assert!(!view.truthy("api/missing").unwrap());
        assert!(view.exists("api/limit").unwrap());
        assert!(!view.exists("api/missing").unwrap());

        view.set("api/enabled", false).unwrap();
        assert!(!view.truthy("api/enabled").unwrap());
    }

    #[test]
    fn missing_environment_reads_empty() {
        let registry = registry();
        let view = registry.view("nowhere");
        assert!(view.get("anything").unwrap().is_none());
        // Reading must not create a root as a side effect.
        assert!(registry.store().backend().find_root("nowhere").unwrap().is_none());
    }

    #[test]
    fn set_persists_and_versions() {
        let backend = Arc::new(InMemoryBackend::new());
        let registry = Registry::new(EntryStore::new(backend.clone()));
        let view = registry.view("test");

        view.set("api/limit", 5i64).unwrap();
        assert_eq!(view.get_int("api/limit").unwrap(), Some(5));

        let before = backend.version_count();
        view.set("api/limit", 6i64).unwrap();
        assert_eq!(backend.version_count(), before + 1);

        // Visible to a fresh registry over the same backend.
        let fresh = Registry::new(EntryStore::new(backend));
        assert_eq!(fresh.view("test").get_int("api/limit").unwrap(), Some(6));
    }

    #[test]
    fn set_refuses_to_tunnel_through_properties() {
        let registry = seeded();
        let view = registry.view("test");
        let err = view.set("api/limit/deep", 1i64).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Cache(CacheError::NotAFolder { .. })
        ));
        let err = view.set("api", 1i64).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Cache(CacheError::NotAProperty { .. })
        ));
    }

    #[test]
    fn set_unsaved_is_cache_only() {
        let registry = seeded();
        let view = registry.view("test");
        view.set_unsaved("api/limit", 99i64).unwrap();
        assert_eq!(view.get_int("api/limit").unwrap(), Some(99));

        registry.reset("test");
        assert_eq!(registry.view("test").get_int("api/limit").unwrap(), Some(1));
    }

    #[test]
    fn reset_interval_expires_views() {
        let clock = Arc::new(FixedClock::new(0));
        let store = EntryStore::with_parts(
            Arc::new(InMemoryBackend::new()),
            Arc::new(CodecRegistry::with_defaults()),
            clock.clone(),
        );
        let registry = Registry::new(store).with_reset_interval(Duration::from_secs(60));
        let view = registry.view("test");
        view.set("flag", true).unwrap();
        view.set_unsaved("scratch", true).unwrap();

        clock.advance(59_000);
        assert!(!registry.should_reset());
        assert!(view.exists("scratch").unwrap());

        clock.advance(2_000);
        assert!(registry.should_reset());
        // Next access reloads from the store, so the unsaved patch goes.
        assert!(!view.exists("scratch").unwrap());
        assert!(view.get_bool("flag").unwrap().unwrap());
        assert!(!registry.should_reset());
    }

    #[test]
    fn overrides_shadow_and_restore() {
        let registry = seeded();
        let overrides: ValueMap = [(
            "api".to_string(),
            Value::Map([("limit".to_string(), Value::Int(100))].into()),
        )]
        .into();

        let seen = registry
            .with_overrides("test", overrides, |view| {
                (
                    view.get_int("api/limit").unwrap(),
                    view.get_bool("api/enabled").unwrap(),
                )
            })
            .unwrap();
        // The untouched sibling stays visible under the override.
        assert_eq!(seen, (Some(100), Some(true)));
        assert_eq!(registry.view("test").get_int("api/limit").unwrap(), Some(1));
    }

    #[test]
    fn saved_writes_survive_an_override_scope() {
        let registry = seeded();
        let overrides: ValueMap = [(
            "api".to_string(),
            Value::Map([("limit".to_string(), Value::Int(100))].into()),
        )]
        .into();

        registry
            .with_overrides("test", overrides, |view| {
                view.set("api/burst", 50i64).unwrap();
                assert_eq!(view.get_int("api/limit").unwrap(), Some(100));
            })
            .unwrap();

        // The override is gone, the persisted sibling write is not.
        let view = registry.view("test");
        assert_eq!(view.get_int("api/limit").unwrap(), Some(1));
        assert_eq!(view.get_int("api/burst").unwrap(), Some(50));
        assert_eq!(
            registry.store().child(&registry.store().root("test").unwrap(), "api/burst")
                .unwrap()
                .value
                .as_deref(),
            Some("50")
        );
    }

    #[test]
    fn overrides_nest_and_suppress_resets() {
        let registry = seeded();
        let outer: ValueMap = [("a".to_string(), Value::Int(1))].into();
        let inner: ValueMap = [("b".to_string(), Value::Int(2))].into();

        registry
            .with_overrides("test", outer, |view| {
                registry
                    .with_overrides("test", inner, |nested| {
                        assert_eq!(nested.get_int("a").unwrap(), Some(1));
                        assert_eq!(nested.get_int("b").unwrap(), Some(2));
                        registry.reset_all();
                        assert_eq!(nested.get_int("b").unwrap(), Some(2));
                    })
                    .unwrap();
                assert_eq!(view.get_int("a").unwrap(), Some(1));
                assert!(view.get("b").unwrap().is_none());
            })
            .unwrap();
        assert!(registry.view("test").get("a").unwrap().is_none());
    }

    #[test]
    fn admin_surface_invalidates_the_cache() {
        let registry = seeded();
        let view = registry.view("test");
        assert_eq!(view.get_int("api/limit").unwrap(), Some(1));

        let root = registry.store().root("test").unwrap();
        let api = registry.store().child(&root, "api").unwrap();
        let (folders, properties) = registry.summaries(&root.id).unwrap();
        assert_eq!(folders.len(), 1);
        assert!(properties.is_empty());

        let values: ValueMap = [
            ("limit".to_string(), Value::Int(9)),
            ("rate".to_string(), Value::Float(0.5)),
        ]
        .into();
        registry.put_properties(&api.id, &values).unwrap();
        assert_eq!(view.get_int("api/limit").unwrap(), Some(9));
        assert_eq!(view.get("api/rate").unwrap(), Some(Value::Float(0.5)));

        registry.delete_properties(&api.id, &["rate"]).unwrap();
        assert!(!view.exists("api/rate").unwrap());

        // Creation snapshot only; bulk ops versioned the properties, not
        // the folder.
        assert_eq!(registry.node_versions(&api.id).unwrap().len(), 1);
    }

    #[test]
    fn whole_tree_delegation() {
        let registry = seeded();
        let tree = registry.export_tree().unwrap();
        assert!(tree.contains_key("test"));

        registry
            .import_tree("qa:\n  flag: true\n", &MergeOptions::new())
            .unwrap();
        assert!(registry.view("qa").truthy("flag").unwrap());
    }

    #[test]
    fn overrides_restore_on_panic() {
        let registry = seeded();
        let overrides: ValueMap = [("boom".to_string(), Value::Bool(true))].into();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            registry
                .with_overrides("test", overrides, |view| {
                    assert!(view.truthy("boom").unwrap());
                    panic!("kaboom");
                })
                .unwrap();
        }));
        assert!(result.is_err());
        assert!(!registry.view("test").exists("boom").unwrap());
        // Reset suppression was undone along with the override.
        registry.reset("test");
        assert_eq!(registry.view("test").get_int("api/limit").unwrap(), Some(1));
    }
}
