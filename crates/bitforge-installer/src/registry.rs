use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use bitforge_core::PackageError;
use serde::{Deserialize, Serialize};

/// One installed package as the registry remembers it. Born on a successful
/// install, overwritten by a version-changing reinstall, destroyed by
/// uninstall or fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub name: String,
    pub version: String,
    pub platform: String,
    pub source_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RegistryStateFile {
    #[serde(default = "state_file_version")]
    version: u32,
    #[serde(default)]
    packages: Vec<PackageRecord>,
}

fn state_file_version() -> u32 {
    1
}

/// The persisted record of packages this installation believes it has
/// already fetched. Loaded fresh by every reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    packages: Vec<PackageRecord>,
}

impl Registry {
    /// A missing file is an empty registry; an unparseable file is a fatal
    /// `CorruptRegistry` error, never silently ignored.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read package registry: {}", path.display()))?;
        let state: RegistryStateFile = toml::from_str(&content).map_err(|err| {
            anyhow::Error::new(PackageError::CorruptRegistry {
                path: path.display().to_string(),
                detail: err.to_string(),
            })
        })?;

        let mut packages = state.packages;
        packages.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Self { packages })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create registry directory: {}", parent.display())
            })?;
        }

        let mut packages = self.packages.clone();
        packages.sort_by(|a, b| a.name.cmp(&b.name));
        let state = RegistryStateFile {
            version: state_file_version(),
            packages,
        };
        let content = toml::to_string(&state)
            .with_context(|| format!("failed to serialize package registry: {}", path.display()))?;
        fs::write(path, content)
            .with_context(|| format!("failed to write package registry: {}", path.display()))
    }

    pub fn get(&self, name: &str) -> Option<&PackageRecord> {
        self.packages.iter().find(|record| record.name == name)
    }

    pub fn upsert(&mut self, record: PackageRecord) {
        match self.packages.iter_mut().find(|r| r.name == record.name) {
            Some(existing) => *existing = record,
            None => self.packages.push(record),
        }
        self.packages.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Removes the record for `name`; reports whether one existed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.packages.len();
        self.packages.retain(|record| record.name != name);
        self.packages.len() != before
    }

    pub fn records(&self) -> &[PackageRecord] {
        &self.packages
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
