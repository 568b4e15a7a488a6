//! Crash capture error types for the Waypost library.
//!
//! Failures while writing a crash report are logged and swallowed by
//! [`CrashCapture`](super::CrashCapture); these errors reach callers only
//! from the explicit write and crash log APIs.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while writing or inspecting crash reports.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CrashError {
    /// The report directory is missing or not writable.
    #[error("Crash report directory unavailable: {dir}")]
    DirectoryUnavailable {
        /// The directory that was checked
        dir: PathBuf,
    },

    /// Writing the report file failed.
    #[error("Failed to write crash report {path}")]
    Write {
        /// The report file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Reading the report file failed.
    #[error("Failed to read crash report {path}")]
    Read {
        /// The report file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The application version could not be determined.
    #[error("Application version unavailable: {reason}")]
    VersionUnavailable {
        /// Why the version is unknown
        reason: String,
    },
}

impl CrashError {
    /// Check if this error is related to I/O operations.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            CrashError::DirectoryUnavailable { .. }
                | CrashError::Write { .. }
                | CrashError::Read { .. }
        )
    }

    /// Check if the report could not be written because of its directory.
    pub fn is_directory_unavailable(&self) -> bool {
        matches!(self, CrashError::DirectoryUnavailable { .. })
    }

    /// Get the file or directory involved, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            CrashError::DirectoryUnavailable { dir } => Some(dir),
            CrashError::Write { path, .. } | CrashError::Read { path, .. } => Some(path),
            CrashError::VersionUnavailable { .. } => None,
        }
    }
}

impl From<CrashError> for crate::Error {
    fn from(err: CrashError) -> Self {
        crate::Error::Crash(err)
    }
}
