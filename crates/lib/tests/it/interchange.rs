//! Whole-registry YAML import and export.

use confregistry::interchange::{export_file, export_map, import_file, import_str};
use confregistry::store::MergeOptions;
use confregistry::{Value, ValueMap};

use crate::helpers::test_store;

const FIXTURE: &str = "\
defaults:
  api:
    timeout: 30
test:
  api:
    enabled: true
    limit: 1
production:
  api:
    enabled: false
    timeout: 5
";

#[test]
fn environments_import_with_shared_defaults() {
    let store = test_store();
    import_str(&store, FIXTURE, &MergeOptions::new()).unwrap();

    let envs = store.environments().unwrap();
    assert_eq!(envs, vec!["production".to_string(), "test".to_string()]);

    let api = |env: &str| -> ValueMap {
        store
            .export_env(env)
            .unwrap()
            .get("api")
            .and_then(Value::as_map)
            .cloned()
            .unwrap()
    };

    let test = api("test");
    assert_eq!(test.get("limit"), Some(&Value::Int(1)));
    assert_eq!(test.get("timeout"), Some(&Value::Int(30)));

    // The environment's own value shadows the default.
    let production = api("production");
    assert_eq!(production.get("timeout"), Some(&Value::Int(5)));
    assert_eq!(production.get("enabled"), Some(&Value::Bool(false)));
}

#[test]
fn export_file_is_a_valid_import() {
    let store = test_store();
    import_str(&store, FIXTURE, &MergeOptions::new()).unwrap();
    let view = store.root("test").unwrap();
    store
        .create_property(
            &view,
            confregistry::entry::EntryFields::new()
                .key("window")
                .value(confregistry::value::RangeValue::exclusive(2, 8)),
        )
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.yml");
    export_file(&store, &path).unwrap();

    let restored = test_store();
    import_file(&restored, &path, &MergeOptions::new()).unwrap();
    assert_eq!(export_map(&store).unwrap(), export_map(&restored).unwrap());

    let window = restored
        .export_env("test")
        .unwrap()
        .get("window")
        .cloned()
        .unwrap();
    assert!(matches!(window, Value::Range(r) if r.exclusive));
}

#[test]
fn repeated_import_is_idempotent() {
    let store = test_store();
    import_str(&store, FIXTURE, &MergeOptions::new()).unwrap();
    let first = export_map(&store).unwrap();
    import_str(&store, FIXTURE, &MergeOptions::new()).unwrap();
    assert_eq!(export_map(&store).unwrap(), first);
}
