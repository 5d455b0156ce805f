//! Merge-import scenarios: existing data wins, tombstones, reconciliation.

use confregistry::store::MergeOptions;
use confregistry::{Value, ValueMap};

use crate::helpers::{sample_tree, test_store};

fn subtree(entries: &[(&str, Value)]) -> ValueMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[test]
fn merge_never_overwrites_existing_leaves() {
    let store = test_store();
    let root = store.root("test").unwrap();
    store
        .merge(&root, &sample_tree(), &MergeOptions::new())
        .unwrap();

    let incoming = subtree(&[(
        "api",
        Value::Map(subtree(&[
            ("limit", Value::Int(999)),
            ("rate", Value::Float(0.5)),
        ])),
    )]);
    store.merge(&root, &incoming, &MergeOptions::new()).unwrap();

    let map = store.export(&root).unwrap();
    let api = map.get("api").and_then(Value::as_map).unwrap();
    // The preexisting value is preserved, the new sibling arrives.
    assert_eq!(api.get("limit"), Some(&Value::Int(1)));
    assert_eq!(api.get("rate"), Some(&Value::Float(0.5)));
}

#[test]
fn deleted_keys_stay_deleted_when_asked() {
    let store = test_store();
    let root = store.root("test").unwrap();
    store
        .merge(&root, &sample_tree(), &MergeOptions::new())
        .unwrap();

    let api = store.child(&root, "api").unwrap();
    let limit = store.child(&api, "limit").unwrap();
    store.destroy(&limit).unwrap();

    let opts = MergeOptions::new().skip_already_deleted(true);
    store.merge(&root, &sample_tree(), &opts).unwrap();
    assert!(store.child(&api, "limit").unwrap_err().is_not_found());

    // Without the option the key is recreated.
    store
        .merge(&root, &sample_tree(), &MergeOptions::new())
        .unwrap();
    assert!(store.child(&api, "limit").is_ok());
}

#[test]
fn reconcile_removes_keys_absent_from_the_source() {
    let store = test_store();
    let root = store.root("test").unwrap();
    store
        .merge(&root, &sample_tree(), &MergeOptions::new())
        .unwrap();
    let api = store.child(&root, "api").unwrap();
    store
        .create_property(
            &api,
            confregistry::entry::EntryFields::new()
                .key("stale")
                .value("x"),
        )
        .unwrap();

    let opts = MergeOptions::new().delete(true);
    store.merge(&root, &sample_tree(), &opts).unwrap();

    let map = store.export(&root).unwrap();
    let api = map.get("api").and_then(Value::as_map).unwrap();
    assert!(!api.contains_key("stale"));
    assert_eq!(api.get("limit"), Some(&Value::Int(1)));
}
