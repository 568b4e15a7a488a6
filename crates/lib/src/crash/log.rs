//! Tracking which crash report the user has already seen.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::CrashError;
use crate::{Result, constants::EXCEPTION_SIZE_KEY, settings::SettingsStore};

/// The crash report slot as seen from the next start of the application.
///
/// A report counts as seen once its byte length has been stored under
/// `exception_size`; a report of any other length is new.
#[derive(Debug, Clone)]
pub struct CrashLog {
    path: PathBuf,
    settings: Arc<dyn SettingsStore>,
}

impl CrashLog {
    pub fn new(path: impl Into<PathBuf>, settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            path: path.into(),
            settings,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a report appeared since the last check, marking it as seen.
    ///
    /// Returns true once per new report. When the report is gone or empty the
    /// stored length is reset so that the next report is reported again even
    /// if it has the same length as an old one.
    ///
    /// The compare and the mark are one atomic settings update, so concurrent
    /// callers see a given report as new at most once between them.
    pub fn has_unseen_crash(&self) -> Result<bool> {
        let len = self.report_len()?;
        let seen = self.seen_len()?;
        if len == seen {
            return Ok(false);
        }

        let mut unseen = false;
        self.settings.update_i64(EXCEPTION_SIZE_KEY, &mut |stored| {
            unseen = len > 0 && len != stored.unwrap_or(0);
            len
        })?;
        if unseen {
            tracing::info!(bytes = len, "Found unseen crash report");
        }
        Ok(unseen)
    }

    /// Length of an unseen report, without marking it as seen.
    pub fn pending_report_len(&self) -> Result<Option<u64>> {
        let len = self.report_len()?;
        if len > 0 && len != self.seen_len()? {
            Ok(Some(len as u64))
        } else {
            Ok(None)
        }
    }

    /// Mark the current report, if any, as seen.
    pub fn acknowledge(&self) -> Result<()> {
        let len = self.report_len()?;
        self.settings.set_i64(EXCEPTION_SIZE_KEY, len)
    }

    /// Contents of the report, `None` if there is none.
    pub fn read_report(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(report) if report.is_empty() => Ok(None),
            Ok(report) => Ok(Some(report)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CrashError::Read {
                path: self.path.clone(),
                source,
            }
            .into()),
        }
    }

    fn report_len(&self) -> Result<i64> {
        match std::fs::metadata(&self.path) {
            Ok(meta) if meta.is_file() => Ok(i64::try_from(meta.len()).unwrap_or(i64::MAX)),
            Ok(_) => Ok(0),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(source) => Err(CrashError::Read {
                path: self.path.clone(),
                source,
            }
            .into()),
        }
    }

    fn seen_len(&self) -> Result<i64> {
        Ok(self.settings.get_i64(EXCEPTION_SIZE_KEY)?.unwrap_or(0))
    }
}
