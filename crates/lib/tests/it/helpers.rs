//! Shared factories for the integration suite.

use std::sync::Arc;

use confregistry::Registry;
use confregistry::backend::InMemoryBackend;
use confregistry::clock::{Clock, FixedClock};
use confregistry::codec::CodecRegistry;
use confregistry::store::{EntryStore, MergeOptions};
use confregistry::{Value, ValueMap};

/// An empty store over a fresh in-memory backend.
pub fn test_store() -> EntryStore {
    EntryStore::new(Arc::new(InMemoryBackend::new()))
}

/// A store driven by a controllable clock, returned alongside it.
pub fn clocked_store() -> (EntryStore, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(0));
    let store = EntryStore::with_parts(
        Arc::new(InMemoryBackend::new()),
        Arc::new(CodecRegistry::with_defaults()),
        clock.clone() as Arc<dyn Clock>,
    );
    (store, clock)
}

/// The sample tree most scenarios start from:
///
/// ```text
/// test:
///   api:
///     enabled: true
///     limit: 1
/// ```
pub fn sample_tree() -> ValueMap {
    [(
        "api".to_string(),
        Value::Map(
            [
                ("enabled".to_string(), Value::Bool(true)),
                ("limit".to_string(), Value::Int(1)),
            ]
            .into(),
        ),
    )]
    .into()
}

/// A registry over a store seeded with [`sample_tree`] under `test`.
pub fn seeded_registry() -> Registry {
    let store = test_store();
    let root = store.root("test").unwrap();
    store
        .merge(&root, &sample_tree(), &MergeOptions::new())
        .unwrap();
    Registry::new(store)
}
