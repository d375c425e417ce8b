use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};
use bitforge_core::{Catalog, PackageError, PlatformId};

use crate::{read_packages_root, scan, HomeLayout, Registry, ScanReport};

/// Destructive corrective pass over a scan report. For inconsistent catalog
/// packages the directory goes first and the registry entry second, so an
/// interrupted pass never leaves a registry entry pointing at a removed
/// directory. Never installs anything; a deletion failure aborts the pass,
/// leaving the remaining inconsistencies for the next invocation.
pub fn fix(layout: &HomeLayout, registry: &mut Registry, report: &ScanReport) -> Result<()> {
    for name in report.bad_version.iter().chain(report.broken.iter()) {
        remove_package_dir(layout, name)
            .with_context(|| format!("failed to fix package '{name}'"))?;
        if registry.remove(name) {
            registry.save(&layout.registry_path())?;
        }
    }

    for name in &report.orphan_registry_entries {
        if registry.remove(name) {
            registry.save(&layout.registry_path())?;
        }
    }

    for name in &report.orphan_dirs {
        remove_package_dir(layout, name)
            .with_context(|| format!("failed to remove orphan directory '{name}'"))?;
    }

    for name in &report.orphan_files {
        let path = guard_under_packages_root(layout, name)?;
        if path.is_file() {
            fs::remove_file(&path)
                .map_err(|err| filesystem_error(&path, &err))
                .with_context(|| format!("failed to remove orphan file '{name}'"))?;
        }
    }

    Ok(())
}

/// Scan, fix if anything needs fixing, then scan again so callers observe
/// the post-fix state.
pub fn scan_and_fix(
    layout: &HomeLayout,
    catalog: &Catalog,
    platform: PlatformId,
    registry: &mut Registry,
) -> Result<ScanReport> {
    let listing = read_packages_root(layout)?;
    let report = scan(catalog, platform, registry, &listing);
    if report.num_errors_to_fix() == 0 {
        return Ok(report);
    }

    fix(layout, registry, &report)?;

    let listing = read_packages_root(layout)?;
    Ok(scan(catalog, platform, registry, &listing))
}

pub(crate) fn remove_package_dir(layout: &HomeLayout, name: &str) -> Result<()> {
    let path = guard_under_packages_root(layout, name)?;
    if path.is_dir() {
        fs::remove_dir_all(&path).map_err(|err| filesystem_error(&path, &err))?;
    }
    Ok(())
}

/// Every destructive deletion goes through this check: the resolved path
/// must be a single normal component directly under the packages root.
pub(crate) fn guard_under_packages_root(layout: &HomeLayout, name: &str) -> Result<PathBuf> {
    let root = layout.packages_dir();
    let single_component = {
        let mut components = Path::new(name).components();
        matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        )
    };
    let path = root.join(name);
    if name.is_empty() || !single_component || !path.starts_with(&root) {
        bail!("refusing to delete outside the packages root: {}", path.display());
    }
    Ok(path)
}

pub(crate) fn filesystem_error(path: &Path, err: &std::io::Error) -> anyhow::Error {
    anyhow::Error::new(PackageError::Filesystem {
        path: path.display().to_string(),
        detail: err.to_string(),
    })
}
