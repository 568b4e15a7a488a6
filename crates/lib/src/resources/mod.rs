//! Lazily constructed map resources.
//!
//! The map database and the index derived from it are expensive to prepare
//! and not needed until the first map screen. [`ResourceManager`] builds each
//! of them at most once, on first request, and never fails: a database that
//! cannot be opened is replaced by a detached one and the index built over it
//! is empty.

use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod assets;
pub mod database;
pub mod errors;
pub mod index;
pub mod lazy;

pub use assets::{AssetSource, DirectoryAssets, materialize};
pub use database::MapDatabase;
pub use errors::ResourceError;
pub use index::{MapIndex, MapTile};
pub use lazy::{LazyResource, ResourceState};

use crate::constants::{BASEMAP_FILENAME, DATABASE_ASSET_DIR, WORLDMAP_FILENAME};

/// Owner of the lazily built map database and map index.
#[derive(Debug)]
pub struct ResourceManager {
    native_dir: PathBuf,
    assets: Arc<dyn AssetSource>,
    database: LazyResource<MapDatabase>,
    index: LazyResource<MapIndex>,
}

impl ResourceManager {
    /// Prepare a manager that keeps its files under `native_dir`.
    ///
    /// Nothing is touched on disk until a resource is first requested.
    pub fn new(native_dir: impl Into<PathBuf>, assets: Arc<dyn AssetSource>) -> Self {
        Self {
            native_dir: native_dir.into(),
            assets,
            database: LazyResource::new(),
            index: LazyResource::new(),
        }
    }

    pub fn native_dir(&self) -> &Path {
        &self.native_dir
    }

    /// Location of the world map database file.
    pub fn database_path(&self) -> PathBuf {
        self.native_dir.join(WORLDMAP_FILENAME)
    }

    /// The map database, opening it on first call.
    ///
    /// A missing database file is first copied from the bundled base map.
    pub fn database(&self) -> Arc<MapDatabase> {
        self.database.get_or_init(|| self.open_database())
    }

    /// The map index, built from [`database`](Self::database) on first call.
    pub fn map_index(&self) -> Arc<MapIndex> {
        self.index.get_or_init(|| MapIndex::open(self.database()))
    }

    pub fn database_state(&self) -> ResourceState {
        self.database.state()
    }

    pub fn index_state(&self) -> ResourceState {
        self.index.state()
    }

    fn open_database(&self) -> MapDatabase {
        let path = self.database_path();
        if !path.exists() {
            let asset = format!("{DATABASE_ASSET_DIR}/{BASEMAP_FILENAME}");
            if let Err(e) = materialize(self.assets.as_ref(), &asset, &path) {
                tracing::error!("Failed to prepare world map database: {e}");
            }
        }

        match MapDatabase::open(&path) {
            Ok(database) => database,
            Err(e) => {
                tracing::error!("Map database unavailable, continuing without it: {e}");
                MapDatabase::detached()
            }
        }
    }
}
