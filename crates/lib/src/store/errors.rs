//! Structured error types for entry store operations.

use thiserror::Error;

/// Errors that can occur in tree operations above the persistence layer.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// A path segment did not resolve to a child.
    ///
    /// Surfaced to the caller, never silently swallowed.
    #[error("'{parent}' has no child named '{segment}'")]
    PathNotFound {
        /// Key of the node the lookup happened under
        parent: String,
        /// The missing path segment
        segment: String,
    },

    /// A value was requested for an environment that has no root.
    #[error("unsupported environment: {env}")]
    UnsupportedEnvironment {
        /// The unknown environment tag
        env: String,
    },

    /// Children can only be created under folders.
    #[error("'{key}' is a property, not a folder")]
    NotAFolder {
        /// Key of the property that was used as a parent
        key: String,
    },

    /// Entry creation requires a key.
    #[error("cannot create an entry without a key")]
    MissingKey,
}

impl StoreError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::PathNotFound { .. } | StoreError::UnsupportedEnvironment { .. }
        )
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
