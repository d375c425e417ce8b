use std::collections::BTreeMap;

use crate::{PlatformId, RemoteManifest};

/// The declarative set of packages required for one platform: package name
/// to target version. Package names double as directory names under the
/// packages root, so the namespace is flat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: BTreeMap<String, String>,
}

impl Catalog {
    /// Selects the packages published for `platform` out of the manifest.
    pub fn from_manifest(manifest: &RemoteManifest, platform: PlatformId) -> Self {
        let entries = manifest
            .packages
            .values()
            .filter(|config| config.available_on(platform))
            .map(|config| (config.name.clone(), config.version.clone()))
            .collect();
        Self { entries }
    }

    pub fn from_entries<I, N, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, version)| (name.into(), version.into()))
                .collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn target_version(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Name/target-version pairs in deterministic (sorted) order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, version)| (name.as_str(), version.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
