use std::fmt;

use anyhow::{anyhow, Result};

/// Platforms the toolchain bundles are published for. The canonical string
/// form is what appears in manifests, registry records and download URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PlatformId {
    LinuxX8664,
    LinuxAarch64,
    DarwinX8664,
    DarwinArm64,
    WindowsAmd64,
}

impl PlatformId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LinuxX8664 => "linux-x86-64",
            Self::LinuxAarch64 => "linux-aarch64",
            Self::DarwinX8664 => "darwin-x86-64",
            Self::DarwinArm64 => "darwin-arm64",
            Self::WindowsAmd64 => "windows-amd64",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "linux-x86-64" => Some(Self::LinuxX8664),
            "linux-aarch64" => Some(Self::LinuxAarch64),
            "darwin-x86-64" => Some(Self::DarwinX8664),
            "darwin-arm64" => Some(Self::DarwinArm64),
            "windows-amd64" => Some(Self::WindowsAmd64),
            _ => None,
        }
    }

    /// Detects the platform this process is running on.
    pub fn host() -> Result<Self> {
        match (std::env::consts::ARCH, std::env::consts::OS) {
            ("x86_64", "linux") => Ok(Self::LinuxX8664),
            ("aarch64", "linux") => Ok(Self::LinuxAarch64),
            ("x86_64", "macos") => Ok(Self::DarwinX8664),
            ("aarch64", "macos") => Ok(Self::DarwinArm64),
            ("x86_64", "windows") => Ok(Self::WindowsAmd64),
            (arch, os) => Err(anyhow!(
                "no toolchain packages are published for this platform: {arch}-{os}"
            )),
        }
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
