//! Persistent map object identifier allocation.

use std::sync::Arc;

use crate::{
    Result,
    constants::UID_KEY,
    settings::{SettingsError, SettingsStore},
};

/// Issues strictly increasing map object identifiers.
///
/// The counter lives in a [`SettingsStore`], so identifiers keep increasing
/// across restarts for as long as that store survives. Each allocation is a
/// single `update_i64` call: the incremented value is persisted before it is
/// handed out, and concurrent callers are serialized by the store.
#[derive(Debug, Clone)]
pub struct UidAllocator {
    settings: Arc<dyn SettingsStore>,
}

impl UidAllocator {
    /// Create an allocator backed by the given settings store.
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self { settings }
    }

    /// Allocate the next identifier.
    ///
    /// A fresh store starts at 0, so the first identifier is 1. Fails if the
    /// new counter value could not be persisted, or with
    /// [`SettingsError::InvalidValue`] if the stored counter is negative or
    /// exhausted. Nothing is issued on failure and the stored counter is left
    /// as it was.
    pub fn next(&self) -> Result<i64> {
        let mut invalid = None;
        let uid = self.settings.update_i64(UID_KEY, &mut |current| {
            let current = current.unwrap_or(0);
            match current.checked_add(1) {
                Some(next) if current >= 0 => next,
                _ => {
                    invalid = Some(current);
                    current
                }
            }
        })?;
        if let Some(current) = invalid {
            return Err(SettingsError::InvalidValue {
                key: UID_KEY.to_string(),
                reason: format!("counter {current} cannot issue another identifier"),
            }
            .into());
        }
        tracing::trace!(uid, "Allocated map object UID");
        Ok(uid)
    }

    /// Last issued identifier, or 0 if none was ever issued.
    pub fn peek(&self) -> Result<i64> {
        Ok(self.settings.get_i64(UID_KEY)?.unwrap_or(0))
    }
}
