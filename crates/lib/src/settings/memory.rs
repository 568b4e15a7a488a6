//! In-memory settings store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::SettingsStore;
use crate::Result;

/// Settings held in a mutex-guarded map; nothing survives the process.
#[derive(Debug, Default)]
pub struct InMemorySettings {
    values: Mutex<HashMap<String, i64>>,
}

impl InMemorySettings {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given values.
    pub fn with_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<String>,
    {
        Self {
            values: Mutex::new(values.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }

    fn values(&self) -> MutexGuard<'_, HashMap<String, i64>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SettingsStore for InMemorySettings {
    fn get_i64(&self, key: &str) -> Result<Option<i64>> {
        Ok(self.values().get(key).copied())
    }

    fn set_i64(&self, key: &str, value: i64) -> Result<()> {
        self.values().insert(key.to_string(), value);
        Ok(())
    }

    fn update_i64(&self, key: &str, update: &mut dyn FnMut(Option<i64>) -> i64) -> Result<i64> {
        let mut values = self.values();
        let next = update(values.get(key).copied());
        values.insert(key.to_string(), next);
        Ok(next)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.values().remove(key).is_some())
    }
}
