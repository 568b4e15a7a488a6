//! Bundled assets and materializing them on disk.

use std::fmt::Debug;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::ResourceError;
use crate::Result;

/// Read-only lookup of bundled assets by name.
pub trait AssetSource: Send + Sync + Debug {
    /// Open the named asset for reading.
    fn open(&self, name: &str) -> io::Result<Box<dyn Read + Send>>;
}

/// Assets stored as plain files under a root directory.
///
/// Asset names use `/` separators and are resolved relative to the root.
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    root: PathBuf,
}

impl DirectoryAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for DirectoryAssets {
    fn open(&self, name: &str) -> io::Result<Box<dyn Read + Send>> {
        let path = name
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |path, part| path.join(part));
        Ok(Box::new(File::open(path)?))
    }
}

/// Copy the named asset to `dest`, returning the number of bytes written.
///
/// The bytes go to a temporary file next to `dest` which is renamed into
/// place only once the copy completed, so `dest` either does not exist or
/// holds the whole asset.
pub fn materialize(assets: &dyn AssetSource, asset: &str, dest: &Path) -> Result<u64> {
    let copy_err = |source| ResourceError::AssetCopy {
        asset: asset.to_string(),
        dest: dest.to_path_buf(),
        source,
    };
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir).map_err(copy_err)?;

    let mut reader = assets.open(asset).map_err(copy_err)?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(copy_err)?;
    let copied = io::copy(&mut reader, &mut tmp).map_err(copy_err)?;
    tmp.as_file().sync_all().map_err(copy_err)?;
    tmp.persist(dest).map_err(|e| copy_err(e.error))?;

    tracing::info!(asset, dest = %dest.display(), bytes = copied, "Materialized asset");
    Ok(copied)
}
