use std::collections::BTreeSet;
use std::fs;

use anyhow::{Context, Result};
use bitforge_core::{Catalog, PlatformId};

use crate::{HomeLayout, Registry, REGISTRY_FILE_NAME};

/// Classification of one catalog package. Exactly one state applies to
/// every catalog entry on every scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageState {
    /// Registered, directory present, version and platform match the target.
    InstalledOk,
    /// Registered and present, but the version or platform disagrees with
    /// the catalog target.
    BadVersion,
    /// Neither registered nor present on disk. Not an error.
    Uninstalled,
    /// Registry and directory presence disagree.
    Broken,
}

impl PackageState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InstalledOk => "installed",
            Self::BadVersion => "bad-version",
            Self::Uninstalled => "uninstalled",
            Self::Broken => "broken",
        }
    }
}

/// What a single `read_dir` of the packages root found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirListing {
    pub dirs: BTreeSet<String>,
    pub files: BTreeSet<String>,
}

/// Lists the packages root. A missing root is an empty listing.
pub fn read_packages_root(layout: &HomeLayout) -> Result<DirListing> {
    let root = layout.packages_dir();
    let mut listing = DirListing::default();
    if !root.exists() {
        return Ok(listing);
    }

    for entry in fs::read_dir(&root)
        .with_context(|| format!("failed to list packages root: {}", root.display()))?
    {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type()?.is_dir() {
            listing.dirs.insert(name);
        } else {
            listing.files.insert(name);
        }
    }
    Ok(listing)
}

/// Result of comparing catalog, registry and filesystem. Ephemeral:
/// recomputed fresh on every call, never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub installed_ok: Vec<String>,
    pub bad_version: Vec<String>,
    pub uninstalled: Vec<String>,
    pub broken: Vec<String>,
    /// Registry names absent from the catalog.
    pub orphan_registry_entries: Vec<String>,
    /// Directories under the packages root that match no catalog name.
    pub orphan_dirs: Vec<String>,
    /// Non-directory files under the packages root, excluding the registry
    /// file itself.
    pub orphan_files: Vec<String>,
}

impl ScanReport {
    /// Count of states a fix pass would act on. Merely-uninstalled packages
    /// are not errors.
    pub fn num_errors_to_fix(&self) -> usize {
        self.bad_version.len()
            + self.broken.len()
            + self.orphan_registry_entries.len()
            + self.orphan_dirs.len()
            + self.orphan_files.len()
    }

    pub fn all_installed_ok(&self) -> bool {
        self.num_errors_to_fix() == 0 && self.uninstalled.is_empty()
    }

    pub fn state_of(&self, name: &str) -> Option<PackageState> {
        let lists = [
            (PackageState::InstalledOk, &self.installed_ok),
            (PackageState::BadVersion, &self.bad_version),
            (PackageState::Uninstalled, &self.uninstalled),
            (PackageState::Broken, &self.broken),
        ];
        lists
            .into_iter()
            .find(|(_, list)| list.iter().any(|entry| entry == name))
            .map(|(state, _)| state)
    }
}

/// Pure comparison of catalog x registry x filesystem listing. Read-only
/// and deterministic; never raises.
pub fn scan(
    catalog: &Catalog,
    platform: PlatformId,
    registry: &Registry,
    listing: &DirListing,
) -> ScanReport {
    let mut report = ScanReport::default();

    for (name, target_version) in catalog.entries() {
        let record = registry.get(name);
        let dir_exists = listing.dirs.contains(name);
        let state = match (record, dir_exists) {
            (Some(record), true) => {
                if record.version == target_version && record.platform == platform.as_str() {
                    PackageState::InstalledOk
                } else {
                    PackageState::BadVersion
                }
            }
            (None, false) => PackageState::Uninstalled,
            _ => PackageState::Broken,
        };
        let list = match state {
            PackageState::InstalledOk => &mut report.installed_ok,
            PackageState::BadVersion => &mut report.bad_version,
            PackageState::Uninstalled => &mut report.uninstalled,
            PackageState::Broken => &mut report.broken,
        };
        list.push(name.to_string());
    }

    for record in registry.records() {
        if !catalog.contains(&record.name) {
            report.orphan_registry_entries.push(record.name.clone());
        }
    }

    for dir in &listing.dirs {
        if !catalog.contains(dir) {
            report.orphan_dirs.push(dir.clone());
        }
    }
    for file in &listing.files {
        if file != REGISTRY_FILE_NAME && !catalog.contains(file) {
            report.orphan_files.push(file.clone());
        }
    }

    report
}
