//! Hierarchical, environment-aware, typed configuration registry.
//!
//! Configuration lives in a tree of folders and properties, one tree per
//! environment tag (`development`, `test`, `production`, ...). Values are
//! stored as strings in a literal syntax and decoded back to typed
//! [`Value`]s through an ordered, extensible codec registry. Every
//! mutation appends a version snapshot, so any property can be audited
//! and reverted.
//!
//! The layers, from the bottom up:
//!
//! - [`backend`]: the persistence trait and an in-memory implementation.
//! - [`codec`]: text encoding and decoding of typed values.
//! - [`store`]: tree operations, merge-import, export, version history.
//! - [`interchange`]: whole-registry YAML import and export.
//! - [`registry`]: the cached facade application code reads through.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use confregistry::Registry;
//! use confregistry::backend::InMemoryBackend;
//! use confregistry::store::EntryStore;
//!
//! # fn main() -> confregistry::Result<()> {
//! let registry = Registry::new(EntryStore::new(Arc::new(InMemoryBackend::new())));
//! let config = registry.view("development");
//!
//! config.set("api/enabled", true)?;
//! config.set("api/limit", 10i64)?;
//!
//! assert!(config.truthy("api/enabled")?);
//! assert_eq!(config.get_int("api/limit")?, Some(10));
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod clock;
pub mod codec;
pub mod entry;
pub mod interchange;
pub mod registry;
pub mod store;
pub mod value;
pub mod version;

pub use registry::{Accessor, Registry};
pub use value::{Value, ValueMap};

use thiserror::Error;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The unified error type for all registry operations.
///
/// Module-specific errors are wrapped transparently, so matching on the
/// inner type still works while call sites only deal with one error.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// File I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Persistence layer errors.
    #[error(transparent)]
    Backend(backend::BackendError),

    /// Tree operation errors.
    #[error(transparent)]
    Store(store::StoreError),

    /// Interchange document errors.
    #[error(transparent)]
    Import(interchange::ImportError),

    /// Cached facade errors.
    #[error(transparent)]
    Cache(registry::CacheError),
}

impl Error {
    /// The module this error originated in, for logging and metrics.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
            Error::Backend(_) => "backend",
            Error::Store(_) => "store",
            Error::Import(_) => "import",
            Error::Cache(_) => "cache",
        }
    }

    /// Check if this error indicates that a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Backend(err) => err.is_not_found(),
            Error::Store(err) => err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates a uniqueness conflict.
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Backend(err) => err.is_conflict(),
            _ => false,
        }
    }
}
