//! Crash report contents.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::panic::PanicHookInfo;
use std::thread::{self, ThreadId};

/// The thread a failure happened on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadDescription {
    pub name: Option<String>,
    pub id: ThreadId,
}

impl ThreadDescription {
    /// Describe the calling thread.
    pub fn current() -> Self {
        let current = thread::current();
        Self {
            name: current.name().map(str::to_string),
            id: current.id(),
        }
    }
}

impl fmt::Display for ThreadDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:?})",
            self.name.as_deref().unwrap_or("<unnamed>"),
            self.id
        )
    }
}

/// Description of an uncaught or reported failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub message: String,
    /// `file:line:column` where the failure was raised, when known.
    pub location: Option<String>,
    pub backtrace: Option<String>,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            backtrace: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_backtrace(mut self, backtrace: impl Into<String>) -> Self {
        self.backtrace = Some(backtrace.into());
        self
    }

    /// Describe a panic from inside a panic hook.
    pub fn from_panic(info: &PanicHookInfo<'_>) -> Self {
        let payload = info.payload();
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Box<dyn Any>".to_string()
        };
        Self {
            message,
            location: info
                .location()
                .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column())),
            backtrace: captured_backtrace(),
        }
    }

    /// Describe a handled error, including its chain of sources.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str("\nCaused by: ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self {
            message,
            location: None,
            backtrace: captured_backtrace(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(location) = &self.location {
            write!(f, "\n    at {location}")?;
        }
        if let Some(backtrace) = &self.backtrace {
            write!(f, "\n{backtrace}")?;
        }
        Ok(())
    }
}

/// Backtrace of the calling thread.
///
/// Captured regardless of `RUST_BACKTRACE`; `None` only where the platform
/// cannot unwind the stack.
fn captured_backtrace() -> Option<String> {
    let backtrace = Backtrace::force_capture();
    match backtrace.status() {
        BacktraceStatus::Captured => Some(backtrace.to_string()),
        _ => None,
    }
}

/// Render a complete crash report.
///
/// ```
/// use waypost::crash::{Failure, ThreadDescription, render_report};
///
/// let thread = ThreadDescription::current();
/// let report = render_report(
///     "01.01.2024 00:00:00",
///     Some("1.0.0"),
///     &thread,
///     &Failure::new("boom"),
/// );
/// assert!(report.starts_with("01.01.2024 00:00:00\nVersion : 1.0.0\nThread : "));
/// assert!(report.ends_with("Exception :\n\nboom\n\n"));
/// ```
pub fn render_report(
    timestamp: &str,
    version: Option<&str>,
    thread: &ThreadDescription,
    failure: &Failure,
) -> String {
    let mut report = String::from(timestamp);
    if let Some(version) = version {
        report.push_str("\nVersion : ");
        report.push_str(version);
    }
    report.push_str(&format!("\nThread : {thread}\nException :\n\n{failure}\n\n"));
    report
}
