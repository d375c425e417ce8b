use std::fs;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use bitforge_core::{Catalog, Freshness, PlatformId};

use crate::fix::{filesystem_error, remove_package_dir, scan_and_fix};
use crate::{
    read_packages_root, scan, unpack, DownloadSession, HomeLayout, PackageRecord, Registry,
    RemoteConfigProvider,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The registry already records the target version for this platform;
    /// nothing was touched and no network request was made.
    AlreadyInstalled,
    Installed,
}

/// Result of an implicit install-whatever-is-missing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnTheFlyReport {
    pub installed: Vec<String>,
    /// False when the final scan still found something wrong; callers emit
    /// a non-fatal warning pointing at the explicit install command.
    pub all_ok: bool,
}

/// The download -> verify -> unpack -> register pipeline, bundled with the
/// context every step needs. One instance serves one command invocation.
pub struct Installer<'a> {
    layout: &'a HomeLayout,
    provider: &'a dyn RemoteConfigProvider,
    platform: PlatformId,
    interrupt: &'a AtomicBool,
    releases_base: Option<String>,
}

impl<'a> Installer<'a> {
    pub fn new(
        layout: &'a HomeLayout,
        provider: &'a dyn RemoteConfigProvider,
        platform: PlatformId,
        interrupt: &'a AtomicBool,
    ) -> Self {
        Self {
            layout,
            provider,
            platform,
            interrupt,
            releases_base: None,
        }
    }

    /// Overrides the release download host, for mirrors.
    pub fn with_releases_base(mut self, base: impl Into<String>) -> Self {
        self.releases_base = Some(base.into());
        self
    }

    /// Installs one package. A download failure leaves any existing
    /// installation untouched; an unpack failure strikes after the old
    /// directory is gone, leaving the package uninstalled rather than
    /// reverted (no automatic retry).
    pub fn install(
        &self,
        registry: &mut Registry,
        name: &str,
        force: bool,
        freshness: Freshness,
        on_progress: &mut dyn FnMut(u64, u64),
    ) -> Result<InstallOutcome> {
        let config = self.provider.package_config(name, freshness)?;

        if !force {
            if let Some(record) = registry.get(name) {
                if record.version == config.version && record.platform == self.platform.as_str() {
                    return Ok(InstallOutcome::AlreadyInstalled);
                }
            }
        }

        let url = match &self.releases_base {
            Some(base) => config.release_url_with_base(base, self.platform)?,
            None => config.release_url(self.platform)?,
        };
        let asset_name = config.asset_name(self.platform)?;

        self.layout.ensure_packages_dir()?;
        let archive_path = self.layout.archive_download_path(&asset_name);

        let session = DownloadSession::open(&url)
            .with_context(|| format!("failed to download package '{name}'"))?;
        if let Err(err) = session.stream_to_file(&archive_path, self.interrupt, on_progress) {
            // partial files never survive a failed or interrupted download
            let _ = fs::remove_file(&archive_path);
            return Err(err.context(format!("failed to download package '{name}' from {url}")));
        }

        // stale content from a previous version goes away before unpacking
        remove_package_dir(self.layout, name)
            .with_context(|| format!("failed to clear previous install of '{name}'"))?;

        if let Err(err) = unpack(&archive_path, &self.layout.packages_dir()) {
            let _ = fs::remove_file(&archive_path);
            return Err(err.context(format!(
                "failed to unpack package '{name}'; the previous install was already removed, \
                 re-run `bitforge packages install {name}`"
            )));
        }

        fs::remove_file(&archive_path)
            .map_err(|err| filesystem_error(&archive_path, &err))
            .with_context(|| format!("failed to remove downloaded archive for '{name}'"))?;

        registry.upsert(PackageRecord {
            name: name.to_string(),
            version: config.version.clone(),
            platform: self.platform.as_str().to_string(),
            source_url: url,
        });
        registry.save(&self.layout.registry_path())?;

        Ok(InstallOutcome::Installed)
    }

    /// The implicit path unrelated commands run before touching packages:
    /// scan and fix with a cached-is-acceptable manifest, then install every
    /// catalog package still missing. The first failed install aborts the
    /// rest.
    pub fn install_missing_on_the_fly(
        &self,
        registry: &mut Registry,
        catalog: &Catalog,
        on_progress: &mut dyn FnMut(&str, u64, u64),
    ) -> Result<OnTheFlyReport> {
        let report = scan_and_fix(self.layout, catalog, self.platform, registry)?;

        let mut installed = Vec::new();
        for name in &report.uninstalled {
            self.install(registry, name, false, Freshness::CachedOk, &mut |done, total| {
                on_progress(name, done, total)
            })?;
            installed.push(name.clone());
        }

        let listing = read_packages_root(self.layout)?;
        let final_report = scan(catalog, self.platform, registry, &listing);
        Ok(OnTheFlyReport {
            installed,
            all_ok: final_report.all_installed_ok(),
        })
    }
}
