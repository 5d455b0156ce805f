//! The cached facade end to end: reads, writes, reset interval, overrides.

use std::sync::Arc;
use std::time::Duration;

use confregistry::codec::CodecRegistry;
use confregistry::store::{EntryStore, MergeOptions};
use confregistry::{Registry, Value, ValueMap};

use crate::helpers::{clocked_store, sample_tree, seeded_registry};

#[test]
fn typed_reads_and_writes_through_one_view() {
    let registry = seeded_registry();
    let config = registry.view("test");

    assert!(config.truthy("api/enabled").unwrap());
    assert_eq!(config.get_int("api/limit").unwrap(), Some(1));
    assert!(!config.exists("api/rate").unwrap());

    config.set("api/enabled", false).unwrap();
    assert!(!config.truthy("api/enabled").unwrap());

    // The write went through to storage, typed and versioned.
    let store = registry.store();
    let root = store.root("test").unwrap();
    let enabled = store.child(&root, "api/enabled").unwrap();
    assert_eq!(enabled.value.as_deref(), Some("false"));
    assert_eq!(store.versions(&enabled).unwrap().len(), 2);
}

#[test]
fn writes_create_missing_folders() {
    let registry = seeded_registry();
    let config = registry.view("test");
    config.set("features/search/enabled", true).unwrap();

    let store = registry.store();
    let root = store.root("test").unwrap();
    let search = store.child(&root, "features/search").unwrap();
    assert!(search.is_folder());
    assert!(config.truthy("features/search/enabled").unwrap());
}

#[test]
fn scoped_accessors_share_the_view() {
    let registry = seeded_registry();
    let api = registry.view("test").at("api");
    assert_eq!(api.get_int("limit").unwrap(), Some(1));
    api.set("burst", 50i64).unwrap();
    assert_eq!(
        registry.view("test").get_int("api/burst").unwrap(),
        Some(50)
    );
}

#[test]
fn reset_interval_reloads_from_storage() {
    let (store, clock) = clocked_store();
    let root = store.root("test").unwrap();
    store
        .merge(&root, &sample_tree(), &MergeOptions::new())
        .unwrap();
    let registry = Registry::new(store.clone()).with_reset_interval(Duration::from_secs(300));
    let config = registry.view("test");
    assert_eq!(config.get_int("api/limit").unwrap(), Some(1));

    // A write that bypasses the facade is invisible until the interval
    // elapses.
    let limit = store.child(&root, "api/limit").unwrap();
    store
        .update(&limit, confregistry::entry::EntryFields::new().value(7i64))
        .unwrap();
    assert_eq!(config.get_int("api/limit").unwrap(), Some(1));

    clock.advance(301_000);
    assert!(registry.should_reset());
    assert_eq!(config.get_int("api/limit").unwrap(), Some(7));
}

#[test]
fn overrides_are_scoped_and_panic_safe() {
    let registry = seeded_registry();
    let overrides: ValueMap = [(
        "api".to_string(),
        Value::Map([("limit".to_string(), Value::Int(0))].into()),
    )]
    .into();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        registry
            .with_overrides("test", overrides, |config| {
                assert_eq!(config.get_int("api/limit").unwrap(), Some(0));
                panic!("boom");
            })
            .unwrap();
    }));
    assert!(result.is_err());
    assert_eq!(registry.view("test").get_int("api/limit").unwrap(), Some(1));
}

#[test]
fn custom_codec_set_flows_through_the_facade() {
    // A registry built without the float codec reads "0.5" as an int-less
    // text value, demonstrating the codec set is a configuration point.
    let mut codecs = CodecRegistry::empty();
    codecs.register(confregistry::codec::BooleanCodec);
    codecs.register(confregistry::codec::IntegerCodec);

    let store = EntryStore::with_parts(
        Arc::new(confregistry::backend::InMemoryBackend::new()),
        Arc::new(codecs),
        Arc::new(confregistry::clock::SystemClock),
    );
    let registry = Registry::new(store);
    let config = registry.view("test");
    config.set("rate", "0.5").unwrap();
    assert_eq!(
        config.get("rate").unwrap(),
        Some(Value::Text("0.5".into()))
    );
    config.set("limit", "10").unwrap();
    assert_eq!(config.get_int("limit").unwrap(), Some(10));
}
