//! Settings error types for the Waypost library.
//!
//! This module defines structured error types for the durable settings store.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or persisting settings.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Serialization of the settings document failed.
    #[error("Settings serialization failed")]
    SerializationFailed {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// The settings document could not be parsed.
    #[error("Settings deserialization failed: {path}")]
    DeserializationFailed {
        /// The settings file that failed to parse
        path: PathBuf,
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error while loading or persisting settings.
    #[error("Settings file I/O error: {path}")]
    FileIo {
        /// The settings file involved
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A stored value cannot be used for the requested operation.
    #[error("Invalid value for setting '{key}': {reason}")]
    InvalidValue {
        /// The settings key
        key: String,
        /// Why the value was rejected
        reason: String,
    },
}

impl SettingsError {
    /// Check if this error is related to I/O operations.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            SettingsError::FileIo { .. }
                | SettingsError::SerializationFailed { .. }
                | SettingsError::DeserializationFailed { .. }
        )
    }

    /// Check if this error indicates stored data could not be interpreted.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            SettingsError::DeserializationFailed { .. } | SettingsError::InvalidValue { .. }
        )
    }

    /// Get the settings key if this error is about a specific key.
    pub fn key(&self) -> Option<&str> {
        match self {
            SettingsError::InvalidValue { key, .. } => Some(key),
            _ => None,
        }
    }
}

impl From<SettingsError> for crate::Error {
    fn from(err: SettingsError) -> Self {
        crate::Error::Settings(err)
    }
}
