//! YAML interchange.
//!
//! Moves whole registry contents between environments and YAML documents.
//! A document maps environment names to nested value maps; an optional
//! `defaults` section is deep-merged underneath every named environment
//! before import, so shared settings are written once.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_yaml::Value as Yaml;
use thiserror::Error;
use tracing::debug;

use crate::Result;
use crate::store::{EntryStore, LAST_UPDATED_KEY, MergeOptions};
use crate::value::{Value, ValueMap};

/// Reserved document section merged into every environment on import.
pub const DEFAULTS_KEY: &str = "defaults";

/// Errors raised while reading or interpreting an interchange document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportError {
    /// The document is not structured as environment name to mapping.
    #[error("malformed interchange data: {reason}")]
    MalformedData { reason: String },

    /// The document could not be read or written.
    #[error("interchange I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid YAML.
    #[error("interchange YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ImportError {
    fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedData {
            reason: reason.into(),
        }
    }
}

impl From<ImportError> for crate::Error {
    fn from(err: ImportError) -> Self {
        crate::Error::Import(err)
    }
}

/// Import a YAML interchange file into the store.
pub fn import_file(store: &EntryStore, path: &Path, opts: &MergeOptions) -> Result<()> {
    let data = fs::read_to_string(path).map_err(ImportError::from)?;
    import_str(store, &data, opts)
}

/// Import a YAML interchange document into the store.
///
/// Each top-level key names an environment whose root is created on
/// demand; its mapping is merged into that environment's tree under the
/// given merge options. The `defaults` section is folded into every
/// environment first and is never imported as an environment itself.
pub fn import_str(store: &EntryStore, data: &str, opts: &MergeOptions) -> Result<()> {
    let doc: Yaml = serde_yaml::from_str(data).map_err(ImportError::from)?;
    let doc = match doc {
        Yaml::Mapping(map) => map,
        Yaml::Null => return Ok(()),
        other => {
            return Err(ImportError::malformed(format!(
                "expected a mapping of environments, found {}",
                yaml_kind(&other)
            ))
            .into());
        }
    };

    let mut envs: BTreeMap<String, ValueMap> = BTreeMap::new();
    let mut defaults: Option<ValueMap> = None;
    for (key, value) in doc {
        let name = string_key(&key)?;
        let mut map = match yaml_to_value(store, &value)? {
            Value::Map(map) => map,
            other => {
                return Err(ImportError::malformed(format!(
                    "environment {name:?} must hold a mapping, found {}",
                    other.type_name()
                ))
                .into());
            }
        };
        map.remove(LAST_UPDATED_KEY);
        if name == DEFAULTS_KEY {
            defaults = Some(map);
        } else {
            envs.insert(name, map);
        }
    }

    for (env, mut map) in envs {
        if let Some(defaults) = &defaults {
            apply_defaults(&mut map, defaults);
        }
        debug!(env = %env, entries = map.len(), "importing environment");
        let root = store.root(&env)?;
        store.merge(&root, &map, opts)?;
    }
    Ok(())
}

/// Export every environment as a map of environment name to nested map.
/// The `_last_updated_at` marker is omitted so that the result is a valid
/// import document.
pub fn export_map(store: &EntryStore) -> Result<BTreeMap<String, ValueMap>> {
    let mut out = BTreeMap::new();
    for env in store.environments()? {
        let mut map = store.export_env(&env)?;
        map.remove(LAST_UPDATED_KEY);
        out.insert(env, map);
    }
    Ok(out)
}

/// Export every environment to a YAML interchange file.
pub fn export_file(store: &EntryStore, path: &Path) -> Result<()> {
    let mut doc = serde_yaml::Mapping::new();
    for (env, map) in export_map(store)? {
        doc.insert(Yaml::String(env), map_to_yaml(store, &map));
    }
    let data = serde_yaml::to_string(&Yaml::Mapping(doc)).map_err(ImportError::from)?;
    fs::write(path, data).map_err(ImportError::from)?;
    Ok(())
}

/// Fill gaps in `map` from `defaults`, recursing into shared folders.
/// Environment values always win over defaults.
fn apply_defaults(map: &mut ValueMap, defaults: &ValueMap) {
    for (key, default) in defaults {
        match map.get_mut(key) {
            None => {
                map.insert(key.clone(), default.clone());
            }
            Some(Value::Map(existing)) => {
                if let Value::Map(nested) = default {
                    apply_defaults(existing, nested);
                }
            }
            Some(_) => {}
        }
    }
}

fn yaml_kind(yaml: &Yaml) -> &'static str {
    match yaml {
        Yaml::Null => "null",
        Yaml::Bool(_) => "boolean",
        Yaml::Number(_) => "number",
        Yaml::String(_) => "string",
        Yaml::Sequence(_) => "sequence",
        Yaml::Mapping(_) => "mapping",
        Yaml::Tagged(_) => "tagged node",
    }
}

fn string_key(key: &Yaml) -> std::result::Result<String, ImportError> {
    match key {
        Yaml::String(s) => Ok(s.clone()),
        other => Err(ImportError::malformed(format!(
            "mapping keys must be strings, found {}",
            yaml_kind(other)
        ))),
    }
}

/// Interpret a YAML node as a registry value. Scalars arrive either as
/// native YAML types or as strings in the codec literal syntax; both are
/// funneled through the codec registry so that `"1..10"` and friends
/// decode the same way regardless of quoting.
fn yaml_to_value(store: &EntryStore, yaml: &Yaml) -> std::result::Result<Value, ImportError> {
    Ok(match yaml {
        Yaml::Null => Value::Text(String::new()),
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else {
                Value::Float(n.as_f64().unwrap_or_default())
            }
        }
        Yaml::String(s) => store.codecs().decode(s),
        Yaml::Sequence(seq) => {
            let mut items = Vec::with_capacity(seq.len());
            for item in seq {
                items.push(yaml_to_value(store, item)?);
            }
            Value::Array(items)
        }
        Yaml::Mapping(map) => {
            let mut out = ValueMap::new();
            for (key, value) in map {
                out.insert(string_key(key)?, yaml_to_value(store, value)?);
            }
            Value::Map(out)
        }
        Yaml::Tagged(_) => {
            return Err(ImportError::malformed("tagged YAML nodes are not supported"));
        }
    })
}

/// Render a registry value as a YAML node. Types YAML represents natively
/// stay native; everything else is written in the codec literal syntax so
/// that a re-import decodes to the same value.
fn value_to_yaml(store: &EntryStore, value: &Value) -> Yaml {
    match value {
        Value::Text(s) => Yaml::String(s.clone()),
        Value::Bool(b) => Yaml::Bool(*b),
        Value::Int(i) => Yaml::Number((*i).into()),
        Value::Float(f) => Yaml::Number((*f).into()),
        Value::Array(items) => {
            Yaml::Sequence(items.iter().map(|v| value_to_yaml(store, v)).collect())
        }
        Value::Map(map) => map_to_yaml(store, map),
        other => Yaml::String(store.codecs().encode(other)),
    }
}

fn map_to_yaml(store: &EntryStore, map: &ValueMap) -> Yaml {
    let mut out = serde_yaml::Mapping::new();
    for (key, value) in map {
        out.insert(Yaml::String(key.clone()), value_to_yaml(store, value));
    }
    Yaml::Mapping(out)
}
