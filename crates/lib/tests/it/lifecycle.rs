//! Entry lifecycle: creation, update, destruction, and the version trail.

use confregistry::Value;
use confregistry::entry::EntryFields;
use confregistry::version::DELETION_NOTES;

use crate::helpers::test_store;

#[test]
fn property_lifecycle_is_fully_versioned() {
    let store = test_store();
    let root = store.root("test").unwrap();
    let api = store
        .create_folder(&root, EntryFields::new().key("api").label("API"))
        .unwrap();
    let limit = store
        .create_property(&api, EntryFields::new().key("limit").value(1i64))
        .unwrap();
    assert_eq!(limit.value.as_deref(), Some("1"));

    let limit = store
        .update(&limit, EntryFields::new().value(2i64))
        .unwrap();
    let limit = store
        .update(&limit, EntryFields::new().value(3i64))
        .unwrap();

    let versions = store.versions(&limit).unwrap();
    assert_eq!(versions.len(), 3);
    assert_eq!(
        versions.iter().map(|v| v.sequence).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(versions[0].value.as_deref(), Some("1"));
    assert_eq!(versions[2].value.as_deref(), Some("3"));
}

#[test]
fn revert_restores_an_old_value_as_a_new_version() {
    let store = test_store();
    let root = store.root("test").unwrap();
    let banner = store
        .create_property(&root, EntryFields::new().key("banner").value("old"))
        .unwrap();
    let banner = store
        .update(&banner, EntryFields::new().value("new"))
        .unwrap();

    let banner = store.revert(&banner, 1).unwrap();
    assert_eq!(banner.value.as_deref(), Some("old"));
    // History is append-only: the revert itself is version 3.
    assert_eq!(store.versions(&banner).unwrap().len(), 3);
}

#[test]
fn destroy_cascades_and_leaves_tombstones() {
    let store = test_store();
    let root = store.root("test").unwrap();
    let api = store
        .create_folder(&root, EntryFields::new().key("api"))
        .unwrap();
    let limit = store
        .create_property(&api, EntryFields::new().key("limit").value(1i64))
        .unwrap();

    store.destroy(&api).unwrap();

    assert!(
        store
            .child(&root, "api")
            .unwrap_err()
            .is_not_found()
    );
    let trail = store.backend().list_versions(&limit.id).unwrap();
    let last = trail.last().unwrap();
    assert!(last.deleted);
    assert_eq!(last.notes.as_deref(), Some(DELETION_NOTES));
    assert!(store.backend().was_deleted(&api.id, "limit").unwrap());
}

#[test]
fn values_round_trip_through_the_codecs() {
    let store = test_store();
    let root = store.root("test").unwrap();
    let window = store
        .create_property(
            &root,
            EntryFields::new()
                .key("window")
                .value(confregistry::value::RangeValue::inclusive(1, 10)),
        )
        .unwrap();
    assert_eq!(window.value.as_deref(), Some("1..10"));

    let decoded = store.codecs().decode(window.value.as_deref().unwrap());
    assert!(matches!(decoded, Value::Range(_)));
}

#[test]
fn access_codes_reflect_the_tree_and_value_type() {
    let store = test_store();
    let root = store.root("test").unwrap();
    let api = store
        .create_folder(&root, EntryFields::new().key("api"))
        .unwrap();
    let enabled = store
        .create_property(&api, EntryFields::new().key("enabled").value(true))
        .unwrap();
    let limit = store
        .create_property(&api, EntryFields::new().key("limit").value(1i64))
        .unwrap();

    let summary = store.property_summary(&enabled).unwrap();
    assert_eq!(summary.access_code, "Registry.api.enabled?");
    let summary = store.property_summary(&limit).unwrap();
    assert_eq!(summary.access_code, "Registry.api.limit");
    assert!(summary.to_json().unwrap().contains("\"access_code\""));
}
