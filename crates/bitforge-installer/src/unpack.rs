use std::fs::{self, File};
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use bitforge_core::{ArchiveType, PackageError};
use filetime::FileTime;
use zip::ZipArchive;

/// Marker entries some upstream archives ship to keep empty directories in
/// version control; not part of the package payload.
const SKIPPED_ZIP_ENTRIES: &[&str] = &[".gitignore"];

/// Extracts `archive_path` into `dest_dir`, dispatching on the file
/// extension. An unsupported extension is a reported precondition
/// violation, not a generic parse failure.
pub fn unpack(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let Some(archive_type) = ArchiveType::infer_from_path(archive_path) else {
        return Err(anyhow::Error::new(PackageError::UnsupportedArchiveFormat {
            path: archive_path.display().to_string(),
        }));
    };

    match archive_type {
        ArchiveType::Zip => unpack_zip(archive_path, dest_dir),
        ArchiveType::TarGz => {
            let file = open_archive(archive_path)?;
            unpack_tar(flate2::read::GzDecoder::new(file), dest_dir)
        }
        ArchiveType::TarBz2 => {
            let file = open_archive(archive_path)?;
            unpack_tar(bzip2::read::BzDecoder::new(file), dest_dir)
        }
    }
    .with_context(|| format!("failed to unpack {}", archive_path.display()))
}

fn open_archive(archive_path: &Path) -> Result<File> {
    File::open(archive_path)
        .with_context(|| format!("failed to open archive: {}", archive_path.display()))
}

/// Zip entries lose their Unix permission bits and mtimes under naive
/// extraction; both are restored here from the entry metadata.
fn unpack_zip(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let file = open_archive(archive_path)?;
    let mut archive = ZipArchive::new(file).context("failed to read zip archive")?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .with_context(|| format!("failed to read zip entry {index}"))?;

        // enclosed_name rejects entries that would escape the destination
        let Some(rel_path) = entry.enclosed_name() else {
            continue;
        };
        if let Some(base) = rel_path.file_name().and_then(|v| v.to_str()) {
            if SKIPPED_ZIP_ENTRIES.contains(&base) {
                continue;
            }
        }

        let out_path = dest_dir.join(&rel_path);
        if entry.is_dir() {
            fs::create_dir_all(&out_path)
                .with_context(|| format!("failed to create {}", out_path.display()))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let mut out = File::create(&out_path)
            .with_context(|| format!("failed to create {}", out_path.display()))?;
        io::copy(&mut entry, &mut out)
            .with_context(|| format!("failed to extract {}", out_path.display()))?;
        drop(out);

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&out_path, fs::Permissions::from_mode(mode))
                .with_context(|| format!("failed to set permissions on {}", out_path.display()))?;
        }

        if let Some(modified) = entry.last_modified() {
            if let Ok(timestamp) = time::OffsetDateTime::try_from(modified) {
                let mtime = FileTime::from_unix_time(timestamp.unix_timestamp(), 0);
                let _ = filetime::set_file_mtime(&out_path, mtime);
            }
        }
    }

    Ok(())
}

/// Tar archives carry their own permission and mtime metadata, which the
/// tar crate applies during unpack.
fn unpack_tar<R: io::Read>(reader: R, dest_dir: &Path) -> Result<()> {
    let mut archive = tar::Archive::new(reader);
    archive.set_preserve_permissions(true);
    archive.set_preserve_mtime(true);
    archive.unpack(dest_dir).context("failed to extract tar archive")?;
    Ok(())
}

