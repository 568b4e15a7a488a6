//! JSON file backed settings store.
//!
//! The whole document is rewritten on every change: settings are tiny and
//! written rarely, and a full rewrite through a temp file plus rename keeps
//! the file valid even if the process dies mid-write.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Deserializer, Serialize};
use tempfile::NamedTempFile;

use super::{SettingsError, SettingsStore};
use crate::Result;

/// The current settings file format version.
/// v0 indicates this is an unstable format subject to breaking changes.
const SETTINGS_VERSION: u8 = 0;

/// Helper to check if version is default (0) for serde skip_serializing_if
fn is_v0(v: &u8) -> bool {
    *v == 0
}

/// Validates the settings version during deserialization.
fn validate_settings_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != SETTINGS_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported settings version {version}; only version {SETTINGS_VERSION} is supported"
        )));
    }
    Ok(version)
}

/// On-disk shape of the settings file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsDocument {
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_settings_version"
    )]
    version: u8,
    #[serde(default)]
    values: BTreeMap<String, i64>,
}

/// Settings persisted as a JSON document.
///
/// All access goes through one mutex, and a change only becomes visible once
/// the new document has been renamed into place.
#[derive(Debug)]
pub struct FileSettings {
    path: PathBuf,
    values: Mutex<BTreeMap<String, i64>>,
}

impl FileSettings {
    /// Open the settings file at `path`.
    ///
    /// A missing file opens as an empty store; it is created on first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(json) => {
                let document: SettingsDocument =
                    serde_json::from_str(&json).map_err(|source| {
                        SettingsError::DeserializationFailed {
                            path: path.clone(),
                            source,
                        }
                    })?;
                document.values
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => {
                return Err(SettingsError::FileIo {
                    path: path.clone(),
                    source,
                }
                .into());
            }
        };
        tracing::debug!(path = %path.display(), count = values.len(), "Opened settings");
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    /// Path of the backing settings file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn values(&self) -> MutexGuard<'_, BTreeMap<String, i64>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `change` to a copy of the values, persist it, then publish it.
    fn commit<T>(
        &self,
        change: impl FnOnce(&mut BTreeMap<String, i64>) -> T,
    ) -> Result<T> {
        let mut values = self.values();
        let mut staged = values.clone();
        let outcome = change(&mut staged);
        self.persist(staged.clone())?;
        *values = staged;
        Ok(outcome)
    }

    fn persist(&self, values: BTreeMap<String, i64>) -> Result<()> {
        let io_err = |source| SettingsError::FileIo {
            path: self.path.clone(),
            source,
        };
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        std::fs::create_dir_all(dir).map_err(io_err)?;

        let document = SettingsDocument {
            version: SETTINGS_VERSION,
            values,
        };
        let json = serde_json::to_vec_pretty(&document)
            .map_err(|source| SettingsError::SerializationFailed { source })?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(&json).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

impl SettingsStore for FileSettings {
    fn get_i64(&self, key: &str) -> Result<Option<i64>> {
        Ok(self.values().get(key).copied())
    }

    fn set_i64(&self, key: &str, value: i64) -> Result<()> {
        self.commit(|values| {
            values.insert(key.to_string(), value);
        })
    }

    fn update_i64(&self, key: &str, update: &mut dyn FnMut(Option<i64>) -> i64) -> Result<i64> {
        self.commit(|values| {
            let next = update(values.get(key).copied());
            values.insert(key.to_string(), next);
            next
        })
    }

    fn remove(&self, key: &str) -> Result<bool> {
        if !self.values().contains_key(key) {
            return Ok(false);
        }
        self.commit(|values| values.remove(key).is_some())
    }
}
