use std::cell::RefCell;
use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use bitforge_core::{Freshness, PackageError, RemoteManifest};
use bitforge_installer::{HomeLayout, RemoteConfigProvider};

pub const DEFAULT_MANIFEST_URL: &str =
    "https://raw.githubusercontent.com/bitforge-fpga/bitforge-packages/main/manifest.json";

/// Fetches the remote manifest over HTTPS and keeps a copy of the body at
/// `<home>/remote-manifest.json`. `CachedOk` serves the in-memory copy,
/// then the on-disk cache, and only then hits the network; `MustFetch`
/// always fetches and rewrites the cache.
pub struct HttpManifestProvider {
    manifest_url: String,
    cache_path: PathBuf,
    fetched: RefCell<Option<RemoteManifest>>,
}

impl HttpManifestProvider {
    pub fn new(layout: &HomeLayout) -> Self {
        let manifest_url = env::var("BITFORGE_MANIFEST_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MANIFEST_URL.to_string());
        Self::with_url(layout, manifest_url)
    }

    pub fn with_url(layout: &HomeLayout, manifest_url: impl Into<String>) -> Self {
        Self {
            manifest_url: manifest_url.into(),
            cache_path: layout.manifest_cache_path(),
            fetched: RefCell::new(None),
        }
    }

    fn fetch_and_cache(&self) -> Result<RemoteManifest> {
        let response = reqwest::blocking::get(&self.manifest_url)
            .map_err(|err| self.network_error(&err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(self.network_error(&format!("unexpected HTTP status {status}")));
        }
        let body = response
            .text()
            .map_err(|err| self.network_error(&err.to_string()))?;

        let manifest = RemoteManifest::from_json_str(&body)
            .with_context(|| format!("invalid package manifest from {}", self.manifest_url))?;

        if let Some(parent) = self.cache_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create cache directory: {}", parent.display())
            })?;
        }
        fs::write(&self.cache_path, &body).with_context(|| {
            format!("failed to cache package manifest: {}", self.cache_path.display())
        })?;

        Ok(manifest)
    }

    /// A stale or corrupt cache file is not an error; the caller falls
    /// through to the network.
    fn read_cache(&self) -> Option<RemoteManifest> {
        let body = fs::read_to_string(&self.cache_path).ok()?;
        RemoteManifest::from_json_str(&body).ok()
    }

    fn network_error(&self, detail: &str) -> anyhow::Error {
        anyhow::Error::new(PackageError::Network {
            url: self.manifest_url.clone(),
            detail: detail.to_string(),
        })
        .context("failed to fetch the package manifest")
    }
}

impl RemoteConfigProvider for HttpManifestProvider {
    fn manifest(&self, freshness: Freshness) -> Result<RemoteManifest> {
        if freshness == Freshness::CachedOk {
            if let Some(manifest) = self.fetched.borrow().clone() {
                return Ok(manifest);
            }
            if let Some(manifest) = self.read_cache() {
                *self.fetched.borrow_mut() = Some(manifest.clone());
                return Ok(manifest);
            }
        }

        let manifest = self.fetch_and_cache()?;
        *self.fetched.borrow_mut() = Some(manifest.clone());
        Ok(manifest)
    }
}
