use std::fmt;

/// Failure kinds that abort a single package operation. Attached as the
/// source of an `anyhow` chain and downcast exactly once, in the CLI, to
/// pick the process exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageError {
    Network { url: String, detail: String },
    UnsupportedArchiveFormat { path: String },
    Filesystem { path: String, detail: String },
    CorruptRegistry { path: String, detail: String },
    UserInterrupt,
}

impl PackageError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UserInterrupt => 130,
            _ => 1,
        }
    }
}

impl fmt::Display for PackageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network { url, detail } => {
                write!(f, "network error fetching {url}: {detail}")
            }
            Self::UnsupportedArchiveFormat { path } => {
                write!(f, "unsupported archive format: {path}")
            }
            Self::Filesystem { path, detail } => {
                write!(f, "filesystem error at {path}: {detail}")
            }
            Self::CorruptRegistry { path, detail } => {
                write!(f, "package registry at {path} is corrupt: {detail}")
            }
            Self::UserInterrupt => f.write_str("interrupted by user"),
        }
    }
}

impl std::error::Error for PackageError {}
