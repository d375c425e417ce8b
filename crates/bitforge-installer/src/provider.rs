use anyhow::{anyhow, Result};
use bitforge_core::{Freshness, PackageRemoteConfig, RemoteManifest};

/// Source of the remote manifest. The CLI implements this over HTTPS with
/// an on-disk cache; tests implement it in memory. Every call takes an
/// explicit freshness policy rather than deciding one implicitly.
pub trait RemoteConfigProvider {
    fn manifest(&self, freshness: Freshness) -> Result<RemoteManifest>;

    fn package_config(&self, name: &str, freshness: Freshness) -> Result<PackageRemoteConfig> {
        let manifest = self.manifest(freshness)?;
        manifest
            .package(name)
            .cloned()
            .ok_or_else(|| anyhow!("package '{name}' is not in the remote manifest"))
    }
}
