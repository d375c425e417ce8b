use anyhow::Result;

use crate::fix::remove_package_dir;
use crate::{HomeLayout, Registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UninstallStatus {
    /// Neither a directory nor a registry entry existed.
    NotInstalled,
    Uninstalled,
}

impl UninstallStatus {
    pub fn removed_anything(self) -> bool {
        matches!(self, Self::Uninstalled)
    }
}

/// Best-effort removal of one package: directory if present, registry
/// entry if present. Succeeds even when the package was never installed.
pub fn uninstall(layout: &HomeLayout, registry: &mut Registry, name: &str) -> Result<UninstallStatus> {
    let package_dir = layout.package_dir(name);
    let dir_existed = package_dir.is_dir();
    if dir_existed {
        remove_package_dir(layout, name)?;
    }

    let record_existed = registry.remove(name);
    if record_existed {
        registry.save(&layout.registry_path())?;
    }

    Ok(if dir_existed || record_existed {
        UninstallStatus::Uninstalled
    } else {
        UninstallStatus::NotInstalled
    })
}
