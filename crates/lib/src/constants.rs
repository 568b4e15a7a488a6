//! Constants used throughout the Waypost library.
//!
//! This module provides central definitions for settings keys, file names and
//! bundled asset names shared by the registry, resource manager and crash capture.

/// Settings key holding the last issued map object UID.
pub const UID_KEY: &str = "uid";

/// Settings key holding the byte length of the last observed crash report.
pub const EXCEPTION_SIZE_KEY: &str = "exception_size";

/// File name of the crash report inside the export directory.
pub const EXCEPTION_FILENAME: &str = "exception.txt";

/// Name of the export directory inside the cache directory.
pub const EXPORT_DIR: &str = "export";

/// Name of the native data directory holding map databases.
pub const NATIVE_DIR: &str = "native";

/// File name of the detailed world map database.
pub const WORLDMAP_FILENAME: &str = "world.mtiles";

/// File name of the bundled base map database template.
pub const BASEMAP_FILENAME: &str = "basemap.mtiles";

/// Asset directory that bundled databases are looked up in.
pub const DATABASE_ASSET_DIR: &str = "databases";

/// File name of the durable settings document.
pub const SETTINGS_FILENAME: &str = "settings.json";
