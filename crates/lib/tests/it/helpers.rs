use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use rusqlite::Connection;
use tempfile::TempDir;
use waypost::{
    AppConfig, AppContext, FixedClock, MapObjectEvent, MapObjectObserver, Result,
    constants::{BASEMAP_FILENAME, DATABASE_ASSET_DIR},
};

/// Timestamp used for crash reports in tests: 2024-03-05 14:07:09 UTC.
pub const TEST_MILLIS: u64 = 1_709_647_629_000;

/// How long to wait for asynchronously delivered events.
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// An [`AppContext`] living in its own temporary directory.
///
/// The directory is kept alive as long as the context and removed afterwards.
pub struct TestContext {
    pub dir: TempDir,
    pub config: AppConfig,
    pub context: AppContext,
}

impl TestContext {
    /// Create a context over empty data, cache and assets directories.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = test_config(dir.path());
        let context = open_context(&config);
        Self {
            dir,
            config,
            context,
        }
    }

    /// Create a context whose assets contain a base map with the given tiles.
    pub fn with_basemap(tiles: &[(i32, i32, i32, i64)]) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = test_config(dir.path());
        write_basemap(&config.assets_dir, tiles);
        let context = open_context(&config);
        Self {
            dir,
            config,
            context,
        }
    }

    /// Simulate a restart: open a fresh context over the same directories.
    pub fn reopen(&self) -> AppContext {
        open_context(&self.config)
    }
}

pub fn test_config(root: &Path) -> AppConfig {
    AppConfig::new(root.join("data"), root.join("cache"), root.join("assets"))
        .with_version(Some("42 1.0.0-test".to_string()))
}

pub fn open_context(config: &AppConfig) -> AppContext {
    AppContext::open_with_clock(config.clone(), Arc::new(FixedClock::new(TEST_MILLIS)))
        .expect("Failed to open context")
}

/// Write `databases/basemap.mtiles` under `assets_dir` with a `maps` table.
pub fn write_basemap(assets_dir: &Path, tiles: &[(i32, i32, i32, i64)]) {
    let dir = assets_dir.join(DATABASE_ASSET_DIR);
    std::fs::create_dir_all(&dir).expect("Failed to create asset dir");
    let conn = Connection::open(dir.join(BASEMAP_FILENAME)).expect("Failed to create basemap");
    conn.execute_batch(
        "CREATE TABLE maps (x INTEGER NOT NULL, y INTEGER NOT NULL, version INTEGER, date INTEGER)",
    )
    .expect("Failed to create maps table");
    for (x, y, version, date) in tiles {
        conn.execute(
            "INSERT INTO maps (x, y, version, date) VALUES (?1, ?2, ?3, ?4)",
            (x, y, version, date),
        )
        .expect("Failed to insert map");
    }
}

/// Observer forwarding every event it receives to a channel.
pub struct EventLog {
    events: Receiver<MapObjectEvent>,
}

struct Forward(std::sync::Mutex<Sender<MapObjectEvent>>);

impl MapObjectObserver for Forward {
    fn on_event(&self, event: &MapObjectEvent) -> Result<()> {
        let _ = self.0.lock().unwrap().send(event.clone());
        Ok(())
    }
}

impl EventLog {
    /// Create the log and the observer feeding it.
    pub fn new() -> (Self, Arc<dyn MapObjectObserver>) {
        let (tx, rx) = mpsc::channel();
        (
            Self { events: rx },
            Arc::new(Forward(std::sync::Mutex::new(tx))),
        )
    }

    /// Wait for the next `count` events.
    pub fn take(&self, count: usize) -> Vec<MapObjectEvent> {
        (0..count)
            .map(|_| {
                self.events
                    .recv_timeout(EVENT_TIMEOUT)
                    .expect("Timed out waiting for event")
            })
            .collect()
    }

    /// Assert that no further event arrives within a short grace period.
    pub fn assert_quiet(&self) {
        assert!(
            self.events
                .recv_timeout(Duration::from_millis(100))
                .is_err(),
            "Unexpected event"
        );
    }
}
