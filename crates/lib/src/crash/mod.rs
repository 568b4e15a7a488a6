//! Crash diagnostic capture.
//!
//! [`CrashCapture`] turns a failure into a plain text report in a single
//! report slot (each report replaces the previous one) and then hands the
//! failure on to an optional chained [`FailureHandler`]. Capturing never
//! fails from the caller's point of view: every problem while writing the
//! report is logged and dropped, and the chained handler runs regardless.
//!
//! [`install_panic_hook`] wires a capture into the process panic hook, in
//! front of whichever hook was installed before. [`CrashLog`] answers the
//! next start's question of whether a new report appeared since last time.

use std::fs;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;

pub mod errors;
mod log;
mod report;

pub use errors::CrashError;
pub use log::CrashLog;
pub use report::{Failure, ThreadDescription, render_report};

use crate::Clock;

/// Something that reacts to a failure on some thread.
pub trait FailureHandler: Send + Sync {
    fn handle(&self, thread: &ThreadDescription, failure: &Failure);
}

impl<F> FailureHandler for F
where
    F: Fn(&ThreadDescription, &Failure) + Send + Sync,
{
    fn handle(&self, thread: &ThreadDescription, failure: &Failure) {
        self(thread, failure)
    }
}

/// Supplies the application version for the report header.
pub type VersionProvider =
    Arc<dyn Fn() -> std::result::Result<String, CrashError> + Send + Sync>;

/// Writes crash reports to a single file and chains to another handler.
pub struct CrashCapture {
    path: PathBuf,
    clock: Arc<dyn Clock>,
    version: Option<String>,
    next: Option<Arc<dyn FailureHandler>>,
}

impl CrashCapture {
    /// Capture reports into the file at `path`.
    pub fn new(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            clock,
            version: None,
            next: None,
        }
    }

    /// Add a `Version : ...` line produced by `provider` to each report.
    ///
    /// The provider is called once, here, and never from the panic hook. If
    /// it fails or panics the line is omitted from every report.
    pub fn with_version(mut self, provider: VersionProvider) -> Self {
        self.version = match panic::catch_unwind(AssertUnwindSafe(|| provider())) {
            Ok(Ok(version)) => Some(version),
            Ok(Err(e)) => {
                tracing::warn!("Omitting version from crash reports: {e}");
                None
            }
            Err(_) => {
                tracing::warn!("Version provider panicked, omitting version from crash reports");
                None
            }
        };
        self
    }

    /// Invoke `handler` after every captured failure.
    pub fn with_fallback(mut self, handler: Arc<dyn FailureHandler>) -> Self {
        self.next = Some(handler);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the report, then always invoke the chained handler.
    pub fn capture(&self, thread: &ThreadDescription, failure: &Failure) {
        if let Err(e) = self.write_report(thread, failure) {
            tracing::error!("Failed to capture crash report: {e}");
        }
        if let Some(next) = &self.next {
            next.handle(thread, failure);
        }
    }

    /// Capture a failure that was handled, without chaining.
    ///
    /// The report is attributed to the calling thread.
    pub fn record(&self, failure: &Failure) {
        let thread = ThreadDescription::current();
        let written = panic::catch_unwind(AssertUnwindSafe(|| self.write_report(&thread, failure)));
        match written {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => tracing::error!("Failed to record failure: {e}"),
            Err(_) => tracing::error!("Panicked while recording failure"),
        }
    }

    /// Write a report replacing the previous one, returning its length in bytes.
    ///
    /// Nothing is written unless the report directory exists and is writable.
    /// The new report is staged next to the target and renamed over it, so
    /// the slot never holds a partial report.
    pub fn write_report(
        &self,
        thread: &ThreadDescription,
        failure: &Failure,
    ) -> std::result::Result<u64, CrashError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let writable = fs::metadata(dir)
            .map(|meta| meta.is_dir() && !meta.permissions().readonly())
            .unwrap_or(false);
        if !writable {
            return Err(CrashError::DirectoryUnavailable {
                dir: dir.to_path_buf(),
            });
        }

        let report = render_report(
            &self.clock.report_timestamp(),
            self.version.as_deref(),
            thread,
            failure,
        );

        let write_err = |source| CrashError::Write {
            path: self.path.clone(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(report.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        tracing::info!(path = %self.path.display(), thread = %thread, "Crash report written");
        Ok(report.len() as u64)
    }
}

impl FailureHandler for CrashCapture {
    fn handle(&self, thread: &ThreadDescription, failure: &Failure) {
        self.capture(thread, failure);
    }
}

impl std::fmt::Debug for CrashCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrashCapture")
            .field("path", &self.path)
            .field("clock", &self.clock)
            .field("version", &self.version)
            .field("has_fallback", &self.next.is_some())
            .finish()
    }
}

/// Install `capture` as the process panic hook.
///
/// Panics on any thread are captured first, then passed to the hook that
/// was installed before this call.
pub fn install_panic_hook(capture: Arc<CrashCapture>) {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let thread = ThreadDescription::current();
        let failure = Failure::from_panic(info);
        capture.capture(&thread, &failure);
        previous(info);
    }));
    tracing::debug!("Crash capture installed");
}
