//! Resource error types for the Waypost library.
//!
//! These errors stay inside the resource manager in normal operation: it logs
//! them and hands out a degraded resource instead. They surface directly only
//! from the lower level helpers (`materialize`, `MapDatabase::open`, queries).

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while preparing or using map resources.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Copying a bundled asset into place failed.
    #[error("Failed to copy asset '{asset}' to {dest}")]
    AssetCopy {
        /// Name of the bundled asset
        asset: String,
        /// Destination path
        dest: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The map database could not be opened.
    #[error("Failed to open map database {path}")]
    DatabaseOpen {
        /// Path of the database file
        path: PathBuf,
        /// The underlying SQLite error
        #[source]
        source: rusqlite::Error,
    },

    /// A query against the map database failed.
    #[error("Map database query failed")]
    Query {
        /// The underlying SQLite error
        #[source]
        source: rusqlite::Error,
    },

    /// The resource is in degraded mode and has nothing to serve.
    #[error("Resource unavailable: {resource}")]
    Unavailable {
        /// Which resource is unavailable
        resource: String,
    },
}

impl ResourceError {
    /// Check if this error means the resource is degraded.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ResourceError::Unavailable { .. })
    }

    /// Check if this error is related to I/O operations.
    pub fn is_io_error(&self) -> bool {
        matches!(self, ResourceError::AssetCopy { .. })
    }

    /// Check if this error came from SQLite.
    pub fn is_database_error(&self) -> bool {
        matches!(
            self,
            ResourceError::DatabaseOpen { .. } | ResourceError::Query { .. }
        )
    }

    /// Check if a bundled asset was missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            ResourceError::AssetCopy { source, .. } => {
                source.kind() == std::io::ErrorKind::NotFound
            }
            _ => false,
        }
    }
}

impl From<ResourceError> for crate::Error {
    fn from(err: ResourceError) -> Self {
        crate::Error::Resource(err)
    }
}
