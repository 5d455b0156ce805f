//! Structured error types for the registry facade.

use thiserror::Error;

/// Errors raised by the cached read/write facade.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CacheError {
    /// A write walked into a property as if it were a folder.
    #[error("'{path}' is a property, values cannot be nested under it")]
    NotAFolder {
        /// The slash-joined path of the offending property
        path: String,
    },

    /// A scalar write targeted an existing folder.
    #[error("'{path}' is a folder, it cannot hold a scalar value")]
    NotAProperty {
        /// The slash-joined path of the offending folder
        path: String,
    },
}

impl From<CacheError> for crate::Error {
    fn from(err: CacheError) -> Self {
        crate::Error::Cache(err)
    }
}
