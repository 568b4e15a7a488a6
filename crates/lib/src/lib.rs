//!
//! Waypost: the process-wide store of transient map annotations.
//! This library provides the core components behind a map application's live objects.
//!
//! ## Core Concepts
//!
//! Waypost is built around several key concepts:
//!
//! * **Map objects (`object::MapObject`)**: Pins, track points and overlays shown on the map, optionally carrying a heavyweight bitmap.
//! * **Registry (`registry::MapObjectRegistry`)**: The keyed, thread-safe store of live map objects, assigning each a process-unique id on insertion.
//! * **UIDs (`uid::UidAllocator`)**: Strictly increasing identifiers persisted in a durable settings store (`settings::SettingsStore`), so they are never reused across restarts.
//! * **Events (`events::EventNotifier`)**: `Added`/`Removed` notifications delivered to each subscriber on its own thread, in the order the registry committed them.
//! * **Resources (`resources::ResourceManager`)**: The map database and the map index derived from it, each built once on first use and degraded rather than fatal when unavailable.
//! * **Crash capture (`crash::CrashCapture`)**: A panic hook that writes a diagnostic report to a single slot and chains to the previous hook; `crash::CrashLog` tells the next start whether a new report appeared.
//! * **Context (`context::AppContext`)**: Owns all of the above and runs the startup sequence.

pub mod clock;
pub mod constants;
pub mod context;
pub mod crash;
pub mod events;
pub mod object;
pub mod registry;
pub mod resources;
pub mod settings;
pub mod uid;

pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;
pub use context::{AppConfig, AppContext};
pub use events::{EventNotifier, MapObjectEvent, MapObjectObserver, Subscription};
pub use object::{Bitmap, MapObject};
pub use registry::MapObjectRegistry;
pub use uid::UidAllocator;

/// Result type used throughout the Waypost library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Waypost library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Structured settings errors from the settings module
    #[error(transparent)]
    Settings(settings::SettingsError),

    /// Structured resource errors from the resources module
    #[error(transparent)]
    Resource(resources::ResourceError),

    /// Structured crash capture errors from the crash module
    #[error(transparent)]
    Crash(crash::CrashError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Settings(_) => "settings",
            Error::Resource(_) => "resources",
            Error::Crash(_) => "crash",
            Error::Io(_) => "io",
        }
    }

    /// Check if this error indicates something was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Io(io_err) => io_err.kind() == std::io::ErrorKind::NotFound,
            Error::Resource(resource_err) => resource_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Settings(settings_err) => settings_err.is_io_error(),
            Error::Resource(resource_err) => resource_err.is_io_error(),
            Error::Crash(crash_err) => crash_err.is_io_error(),
        }
    }

    /// Check if this error is settings-related.
    pub fn is_settings_error(&self) -> bool {
        matches!(self, Error::Settings(_))
    }

    /// Check if this error is resource-related.
    pub fn is_resource_error(&self) -> bool {
        matches!(self, Error::Resource(_))
    }

    /// Check if this error means a resource is running degraded.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Error::Resource(resource_err) => resource_err.is_unavailable(),
            _ => false,
        }
    }

    /// Check if this error is crash capture related.
    pub fn is_crash_error(&self) -> bool {
        matches!(self, Error::Crash(_))
    }
}
