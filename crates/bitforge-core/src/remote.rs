use std::collections::BTreeMap;

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;

use crate::PlatformId;

const GITHUB_RELEASES_BASE: &str = "https://github.com";

const KNOWN_PLACEHOLDERS: &[&str] = &["PLATFORM", "VERSION", "YYYY-MM-DD", "YYYYMMDD"];

/// Whether a reconciliation entry point may serve manifest data from the
/// local cache or must hit the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    CachedOk,
    MustFetch,
}

/// Declared remote location and target version for one package, as loaded
/// from the remote manifest. Immutable for the duration of one
/// reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageRemoteConfig {
    #[serde(skip)]
    pub name: String,
    pub organization: String,
    pub repository: String,
    pub release_tag: String,
    pub asset_template: String,
    pub version: String,
    /// Platforms this package is published for; empty means all of them.
    #[serde(default)]
    pub platforms: Vec<String>,
}

/// The remote manifest: every package the tool knows about, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteManifest {
    pub packages: BTreeMap<String, PackageRemoteConfig>,
}

impl RemoteManifest {
    /// Parses and validates the manifest. Malformed entries fail here, at
    /// the boundary, instead of surfacing as surprises mid-install.
    pub fn from_json_str(input: &str) -> Result<Self> {
        let mut manifest: Self =
            serde_json::from_str(input).context("failed to parse package manifest")?;
        for (name, config) in &mut manifest.packages {
            if name.trim().is_empty() {
                bail!("package manifest contains an entry with an empty name");
            }
            config.name = name.clone();
            config
                .validate()
                .with_context(|| format!("invalid manifest entry for package '{name}'"))?;
        }
        Ok(manifest)
    }

    pub fn package(&self, name: &str) -> Option<&PackageRemoteConfig> {
        self.packages.get(name)
    }
}

impl PackageRemoteConfig {
    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("organization", &self.organization),
            ("repository", &self.repository),
            ("release_tag", &self.release_tag),
            ("asset_template", &self.asset_template),
            ("version", &self.version),
        ] {
            if value.trim().is_empty() {
                bail!("field '{field}' must not be empty");
            }
        }
        validate_placeholders(&self.release_tag)?;
        validate_placeholders(&self.asset_template)?;
        for platform in &self.platforms {
            if PlatformId::parse(platform).is_none() {
                bail!("unknown platform '{platform}'");
            }
        }
        Ok(())
    }

    pub fn available_on(&self, platform: PlatformId) -> bool {
        self.platforms.is_empty() || self.platforms.iter().any(|p| p == platform.as_str())
    }

    /// Expanded file name of the release asset for the given platform.
    pub fn asset_name(&self, platform: PlatformId) -> Result<String> {
        expand_template(&self.asset_template, platform, &self.version)
    }

    /// Full download URL for the given platform.
    pub fn release_url(&self, platform: PlatformId) -> Result<String> {
        self.release_url_with_base(GITHUB_RELEASES_BASE, platform)
    }

    pub fn release_url_with_base(&self, base: &str, platform: PlatformId) -> Result<String> {
        let tag = expand_template(&self.release_tag, platform, &self.version)?;
        let asset = self.asset_name(platform)?;
        Ok(format!(
            "{}/{}/{}/releases/download/{}/{}",
            base.trim_end_matches('/'),
            self.organization,
            self.repository,
            tag,
            asset
        ))
    }
}

fn validate_placeholders(template: &str) -> Result<()> {
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            bail!("unterminated placeholder in template '{template}'");
        };
        let token = &after[..end];
        if !KNOWN_PLACEHOLDERS.contains(&token) {
            bail!("unknown placeholder '${{{token}}}' in template '{template}'");
        }
        rest = &after[end + 1..];
    }
    Ok(())
}

fn expand_template(template: &str, platform: PlatformId, version: &str) -> Result<String> {
    let mut expanded = template
        .replace("${PLATFORM}", platform.as_str())
        .replace("${VERSION}", version);
    if expanded.contains("${YYYY-MM-DD}") || expanded.contains("${YYYYMMDD}") {
        let (dashed, compact) = date_stamps(version).with_context(|| {
            format!("template '{template}' uses a date placeholder")
        })?;
        expanded = expanded
            .replace("${YYYY-MM-DD}", &dashed)
            .replace("${YYYYMMDD}", &compact);
    }
    Ok(expanded)
}

/// Derives the `YYYY-MM-DD` and `YYYYMMDD` stamps from a date-shaped
/// version string (`YYYY.MM.DD`). The date placeholders come from the
/// declared version rather than the wall clock so a fixed manifest always
/// resolves to the same artifact.
fn date_stamps(version: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = version.split('.').collect();
    let date_shaped = parts.len() == 3
        && parts[0].len() == 4
        && parts[1].len() == 2
        && parts[2].len() == 2
        && parts
            .iter()
            .all(|part| part.chars().all(|ch| ch.is_ascii_digit()));
    if !date_shaped {
        return Err(anyhow!(
            "version '{version}' is not date-shaped (expected YYYY.MM.DD)"
        ));
    }
    Ok((parts.join("-"), parts.concat()))
}
