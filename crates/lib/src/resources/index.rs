//! Index of downloaded detailed maps, derived from the map database.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::MapDatabase;

/// Table listing the downloaded map tiles.
pub const MAPS_TABLE: &str = "maps";

/// One downloaded map tile, addressed by its grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapTile {
    pub x: i32,
    pub y: i32,
    pub version: i32,
    /// Download time, seconds since Unix epoch.
    pub date: i64,
}

/// Lookup of downloaded maps, read once from the map database.
///
/// An index over a detached database, or one without a `maps` table, is empty.
#[derive(Debug)]
pub struct MapIndex {
    database: Arc<MapDatabase>,
    maps: BTreeMap<(i32, i32), MapTile>,
}

impl MapIndex {
    /// Build the index from `database`.
    pub fn open(database: Arc<MapDatabase>) -> Self {
        let maps = match Self::load(&database) {
            Ok(maps) => maps,
            Err(e) => {
                tracing::warn!("Map index unavailable, starting empty: {e}");
                BTreeMap::new()
            }
        };
        tracing::info!(maps = maps.len(), "Map index ready");
        Self { database, maps }
    }

    fn load(database: &MapDatabase) -> crate::Result<BTreeMap<(i32, i32), MapTile>> {
        if !database.has_table(MAPS_TABLE)? {
            return Ok(BTreeMap::new());
        }
        database.with_connection(|conn| {
            let mut stmt = conn.prepare("SELECT x, y, version, date FROM maps")?;
            let rows = stmt.query_map([], |row| {
                Ok(MapTile {
                    x: row.get(0)?,
                    y: row.get(1)?,
                    version: row.get(2)?,
                    date: row.get(3)?,
                })
            })?;
            rows.map(|tile| tile.map(|tile| ((tile.x, tile.y), tile)))
                .collect()
        })
    }

    /// The database this index was built from.
    pub fn database(&self) -> &Arc<MapDatabase> {
        &self.database
    }

    /// Downloaded tiles ordered by `(x, y)`.
    pub fn maps(&self) -> impl Iterator<Item = &MapTile> {
        self.maps.values()
    }

    pub fn tile(&self, x: i32, y: i32) -> Option<&MapTile> {
        self.maps.get(&(x, y))
    }

    pub fn is_downloaded(&self, x: i32, y: i32) -> bool {
        self.maps.contains_key(&(x, y))
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}
