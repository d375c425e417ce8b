mod archive;
mod catalog;
mod errors;
mod platform;
mod remote;

pub use archive::ArchiveType;
pub use catalog::Catalog;
pub use errors::PackageError;
pub use platform::PlatformId;
pub use remote::{Freshness, PackageRemoteConfig, RemoteManifest};

#[cfg(test)]
mod tests;
