//! Handle to the detailed map database.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{Connection, OpenFlags};

use super::ResourceError;
use crate::Result;

/// SQLite connection to the detailed world map, or a detached placeholder.
///
/// A detached database is what callers get when the file could not be
/// opened: every query fails with [`ResourceError::Unavailable`] instead of
/// the application failing to start.
#[derive(Debug)]
pub struct MapDatabase {
    path: Option<PathBuf>,
    connection: Option<Mutex<Connection>>,
}

impl MapDatabase {
    /// Open (creating if needed) the database at `path` with WAL journaling.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let open_err = |source| ResourceError::DatabaseOpen {
            path: path.to_path_buf(),
            source,
        };
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let connection = Connection::open_with_flags(path, flags).map_err(open_err)?;
        let mode: String = connection
            .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
            .map_err(open_err)?;
        tracing::info!(path = %path.display(), journal_mode = %mode, "Opened map database");

        Ok(Self {
            path: Some(path.to_path_buf()),
            connection: Some(Mutex::new(connection)),
        })
    }

    /// A database with no backing connection.
    pub fn detached() -> Self {
        Self {
            path: None,
            connection: None,
        }
    }

    /// Whether this handle is a degraded placeholder.
    pub fn is_detached(&self) -> bool {
        self.connection.is_none()
    }

    /// Path of the database file, `None` when detached.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run `f` with exclusive access to the connection.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T> {
        let connection = self.connection()?;
        Ok(f(&connection).map_err(|source| ResourceError::Query { source })?)
    }

    /// Whether a table with the given name exists.
    pub fn has_table(&self, table: &str) -> Result<bool> {
        self.with_connection(|conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get::<_, i64>(0),
            )
        })
        .map(|count| count > 0)
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        let connection = self
            .connection
            .as_ref()
            .ok_or_else(|| ResourceError::Unavailable {
                resource: "map database".to_string(),
            })?;
        Ok(connection.lock().unwrap_or_else(PoisonError::into_inner))
    }
}
