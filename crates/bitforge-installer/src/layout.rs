use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Reserved file name of the registry inside the packages root. Excluded
/// from orphan-file detection.
pub const REGISTRY_FILE_NAME: &str = "registry.toml";

/// Path builder for everything under the tool's home directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeLayout {
    home: PathBuf,
}

impl HomeLayout {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn packages_dir(&self) -> PathBuf {
        self.home.join("packages")
    }

    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.packages_dir().join(name)
    }

    pub fn registry_path(&self) -> PathBuf {
        self.packages_dir().join(REGISTRY_FILE_NAME)
    }

    pub fn manifest_cache_path(&self) -> PathBuf {
        self.home.join("remote-manifest.json")
    }

    /// Archives are downloaded directly under the packages root, never into
    /// the package's own directory, so a half-written file can never be
    /// observed inside a final install location.
    pub fn archive_download_path(&self, asset_name: &str) -> PathBuf {
        self.packages_dir().join(asset_name)
    }

    pub fn ensure_packages_dir(&self) -> Result<()> {
        let dir = self.packages_dir();
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create packages root: {}", dir.display()))
    }
}

/// Resolves the home directory: `BITFORGE_HOME` when set, otherwise the
/// per-user default.
pub fn default_user_home() -> Result<PathBuf> {
    if let Ok(home) = env::var("BITFORGE_HOME") {
        if !home.trim().is_empty() {
            return Ok(PathBuf::from(home));
        }
    }

    if cfg!(windows) {
        let app_data = env::var("LOCALAPPDATA")
            .context("LOCALAPPDATA is not set; cannot resolve Windows user home")?;
        return Ok(PathBuf::from(app_data).join("Bitforge"));
    }

    let home = env::var("HOME").context("HOME is not set; cannot resolve user home")?;
    Ok(PathBuf::from(home).join(".bitforge"))
}
