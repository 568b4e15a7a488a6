//! Time provider abstraction
//!
//! This module provides a [`Clock`] trait that abstracts over time sources,
//! so crash reports carry real wall-clock timestamps in production while
//! tests can pin the time and assert on the exact report header.
//!
//! # Example
//!
//! ```
//! use waypost::{Clock, SystemClock};
//!
//! let clock = SystemClock;
//! let millis = clock.now_millis();
//! let stamp = clock.report_timestamp();
//! assert!(millis > 0);
//! assert_eq!(stamp.len(), "01.01.2024 00:00:00".len());
//! ```

use std::fmt::Debug;
use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(any(test, feature = "testing"))]
use std::sync::Mutex;

use chrono::{DateTime, Utc};

/// Format used for the first line of a crash report.
pub const REPORT_TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// A time provider for getting current timestamps.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current time as milliseconds since Unix epoch.
    fn now_millis(&self) -> u64;

    /// Returns the current time formatted for a crash report header.
    ///
    /// Timestamps outside chrono's range fall back to the Unix epoch.
    fn report_timestamp(&self) -> String {
        format_report_timestamp(self.now_millis())
    }
}

/// Formats milliseconds since Unix epoch as `dd.MM.yyyy HH:mm:ss` (UTC).
pub fn format_report_timestamp(millis: u64) -> String {
    let millis = i64::try_from(millis).unwrap_or(i64::MAX);
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or_default()
        .format(REPORT_TIMESTAMP_FORMAT)
        .to_string()
}

/// Production clock using real system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Test clock that only moves when told to.
///
/// Crash reports are written from whichever thread failed, so the clock is
/// shared behind a mutex and never advances on its own.
///
/// ```
/// use waypost::{Clock, FixedClock};
///
/// let clock = FixedClock::new(1_704_067_200_000);
/// assert_eq!(clock.report_timestamp(), "01.01.2024 00:00:00");
/// clock.advance(61_000);
/// assert_eq!(clock.report_timestamp(), "01.01.2024 00:01:01");
/// ```
#[cfg(any(test, feature = "testing"))]
pub struct FixedClock {
    millis: Mutex<u64>,
}

#[cfg(any(test, feature = "testing"))]
impl FixedClock {
    /// Create a new fixed clock with the given initial time in milliseconds.
    pub fn new(millis: u64) -> Self {
        Self {
            millis: Mutex::new(millis),
        }
    }

    /// Advance the clock by the given number of milliseconds.
    pub fn advance(&self, ms: u64) {
        *self.lock() += ms;
    }

    /// Set the clock to a specific time in milliseconds.
    pub fn set(&self, ms: u64) {
        *self.lock() = ms;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, u64> {
        self.millis
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(any(test, feature = "testing"))]
impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        *self.lock()
    }
}

#[cfg(any(test, feature = "testing"))]
impl Default for FixedClock {
    fn default() -> Self {
        // 2024-01-01 00:00:00 UTC
        Self::new(1_704_067_200_000)
    }
}

#[cfg(any(test, feature = "testing"))]
impl Debug for FixedClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedClock")
            .field("millis", &*self.lock())
            .finish()
    }
}
