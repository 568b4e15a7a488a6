//! Application context owning every Waypost component.
//!
//! [`AppContext::open`] runs the startup sequence: it prepares the data and
//! export directories, opens the durable settings, builds the UID allocator,
//! notifier and registry, and sets up (without opening) the lazy map
//! resources and crash capture. Installing the panic hook is a separate,
//! explicit step.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use handle_trait::Handle;

use crate::{
    Clock, Result, SystemClock,
    constants::{EXCEPTION_FILENAME, EXPORT_DIR, NATIVE_DIR, SETTINGS_FILENAME},
    crash::{CrashCapture, CrashLog, install_panic_hook},
    events::EventNotifier,
    registry::MapObjectRegistry,
    resources::{DirectoryAssets, ResourceManager},
    settings::{FileSettings, SettingsStore},
    uid::UidAllocator,
};

/// Where the application keeps its files, and what version it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Durable application data: settings and map databases.
    pub data_dir: PathBuf,
    /// Disposable data; crash reports go to its export directory.
    pub cache_dir: PathBuf,
    /// Root of the bundled assets.
    pub assets_dir: PathBuf,
    /// Version written into crash reports; omitted when `None`.
    pub version: Option<String>,
}

impl AppConfig {
    /// Configuration with the library's own version.
    pub fn new(
        data_dir: impl Into<PathBuf>,
        cache_dir: impl Into<PathBuf>,
        assets_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            cache_dir: cache_dir.into(),
            assets_dir: assets_dir.into(),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
        }
    }

    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    pub fn native_dir(&self) -> PathBuf {
        self.data_dir.join(NATIVE_DIR)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.cache_dir.join(EXPORT_DIR)
    }

    pub fn crash_report_path(&self) -> PathBuf {
        self.export_dir().join(EXCEPTION_FILENAME)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILENAME)
    }
}

/// Internal state of an [`AppContext`].
struct AppContextInner {
    config: AppConfig,
    clock: Arc<dyn Clock>,
    settings: Arc<dyn SettingsStore>,
    uids: UidAllocator,
    registry: MapObjectRegistry,
    resources: ResourceManager,
    crash: Arc<CrashCapture>,
    crash_log: CrashLog,
    hook_installed: AtomicBool,
}

impl std::fmt::Debug for AppContextInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContextInner")
            .field("config", &self.config)
            .field("clock", &self.clock)
            .field("registry", &format!("<{} map objects>", self.registry.len()))
            .field("resources", &self.resources)
            .field("crash", &self.crash)
            .field("hook_installed", &self.hook_installed)
            .finish()
    }
}

/// The running application: settings, registry, resources and crash capture.
///
/// AppContext is a cheap-to-clone handle around `Arc<AppContextInner>`.
///
/// ## Example
///
/// ```
/// # use waypost::{AppConfig, AppContext, MapObject};
/// # fn main() -> waypost::Result<()> {
/// let dir = tempfile::tempdir()?;
/// let config = AppConfig::new(dir.path().join("data"), dir.path().join("cache"), dir.path());
/// let context = AppContext::open(config)?;
///
/// let id = context.registry().register(MapObject::new("Camp", 55.75, 37.62))?;
/// assert!(context.registry().lookup(id).is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Handle)]
pub struct AppContext {
    inner: Arc<AppContextInner>,
}

impl AppContext {
    /// Run the startup sequence for `config`.
    pub fn open(config: AppConfig) -> Result<Self> {
        Self::open_impl(config, Arc::new(SystemClock))
    }

    /// Same as [`AppContext::open`] with a custom clock for crash report
    /// timestamps.
    ///
    /// Only available with the `testing` feature or in test builds.
    #[cfg(any(test, feature = "testing"))]
    pub fn open_with_clock(config: AppConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        Self::open_impl(config, clock)
    }

    fn open_impl(config: AppConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let export_dir = config.export_dir();
        if let Err(e) = std::fs::create_dir_all(&export_dir) {
            // Crash reports are skipped while the directory is missing.
            tracing::warn!(dir = %export_dir.display(), "Failed to create export directory: {e}");
        }

        let settings: Arc<dyn SettingsStore> =
            Arc::new(FileSettings::open(config.settings_path())?);
        let uids = UidAllocator::new(Arc::clone(&settings));
        let registry = MapObjectRegistry::new(uids.clone(), EventNotifier::new());
        registry.clear();

        let resources = ResourceManager::new(
            config.native_dir(),
            Arc::new(DirectoryAssets::new(&config.assets_dir)),
        );

        let mut crash = CrashCapture::new(config.crash_report_path(), Arc::clone(&clock));
        if let Some(version) = config.version.clone() {
            crash = crash.with_version(Arc::new(move || Ok(version.clone())));
        }
        let crash_log = CrashLog::new(config.crash_report_path(), Arc::clone(&settings));

        tracing::info!(data_dir = %config.data_dir.display(), "Application context ready");
        Ok(Self {
            inner: Arc::new(AppContextInner {
                config,
                clock,
                settings,
                uids,
                registry,
                resources,
                crash: Arc::new(crash),
                crash_log,
                hook_installed: AtomicBool::new(false),
            }),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.inner.clock
    }

    pub fn settings(&self) -> &Arc<dyn SettingsStore> {
        &self.inner.settings
    }

    pub fn uids(&self) -> &UidAllocator {
        &self.inner.uids
    }

    pub fn registry(&self) -> &MapObjectRegistry {
        &self.inner.registry
    }

    pub fn notifier(&self) -> &EventNotifier {
        self.inner.registry.notifier()
    }

    pub fn resources(&self) -> &ResourceManager {
        &self.inner.resources
    }

    pub fn crash_capture(&self) -> &Arc<CrashCapture> {
        &self.inner.crash
    }

    pub fn crash_log(&self) -> &CrashLog {
        &self.inner.crash_log
    }

    pub fn data_dir(&self) -> &Path {
        &self.inner.config.data_dir
    }

    /// Install this context's crash capture as the process panic hook.
    ///
    /// Only the first call installs anything; returns whether it did.
    pub fn install_crash_handler(&self) -> bool {
        if self.inner.hook_installed.swap(true, Ordering::SeqCst) {
            return false;
        }
        install_panic_hook(Arc::clone(&self.inner.crash));
        true
    }
}
