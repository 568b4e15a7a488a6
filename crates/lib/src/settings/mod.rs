//! Durable settings storage.
//!
//! The registry and the crash log keep a handful of named integer settings
//! (the last issued UID, the size of the last observed crash report) that have
//! to survive process restarts. [`SettingsStore`] is the narrow interface they
//! consume; [`FileSettings`] persists to a JSON document and
//! [`InMemorySettings`] backs tests and ephemeral contexts.

use std::fmt::Debug;

use crate::Result;

pub mod errors;
mod file;
mod memory;

pub use errors::SettingsError;
pub use file::FileSettings;
pub use memory::InMemorySettings;

/// Atomic access to named integer settings.
///
/// Every method is atomic per key with respect to other callers of the same
/// store, and writes are durable before the method returns.
pub trait SettingsStore: Send + Sync + Debug {
    /// Read a setting, returning `None` when it was never written.
    fn get_i64(&self, key: &str) -> Result<Option<i64>>;

    /// Overwrite a setting.
    fn set_i64(&self, key: &str, value: i64) -> Result<()>;

    /// Read-modify-write a setting as a single atomic step.
    ///
    /// `update` receives the current value (`None` if unset) and returns the
    /// value to store. The stored value is persisted before it is returned.
    fn update_i64(&self, key: &str, update: &mut dyn FnMut(Option<i64>) -> i64) -> Result<i64>;

    /// Remove a setting, returning whether it existed.
    fn remove(&self, key: &str) -> Result<bool>;
}
