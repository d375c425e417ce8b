mod download;
mod fix;
mod install;
mod layout;
mod provider;
mod registry;
mod scan;
mod uninstall;
mod unpack;

pub use download::DownloadSession;
pub use fix::{fix, scan_and_fix};
pub use install::{Installer, InstallOutcome, OnTheFlyReport};
pub use layout::{default_user_home, HomeLayout, REGISTRY_FILE_NAME};
pub use provider::RemoteConfigProvider;
pub use registry::{PackageRecord, Registry};
pub use scan::{read_packages_root, scan, DirListing, PackageState, ScanReport};
pub use uninstall::{uninstall, UninstallStatus};
pub use unpack::unpack;
