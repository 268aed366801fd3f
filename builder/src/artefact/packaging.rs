//! Archive packaging for provider artefacts.
//!
//! Prebuilt `.zip` sources are published byte-for-byte. Raw binaries are
//! wrapped in a single-entry zip whose entry name, permission bits and
//! timestamp are fixed, so that rebuilding from a freshly touched source
//! yields an identical archive.

use super::layout::ArtefactLayout;
use super::naming::{ArtefactMetadata, SourceKind};
use crate::error::{BuildError, Result};
use crate::fs::Filesystem;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Permission bits recorded for the packaged binary.
pub const BINARY_MODE: u32 = 0o755;

/// Timestamp recorded for the packaged binary: 2049-01-01T00:00:00.
pub const FIXED_TIMESTAMP: (u16, u8, u8, u8, u8, u8) = (2049, 1, 1, 0, 0, 0);

/// An archive written to its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedArchive {
    /// Where the archive was written.
    pub path: Utf8PathBuf,
    /// Archive file name as referenced by the manifests.
    pub file_name: String,
    /// The archive bytes exactly as written.
    pub bytes: Vec<u8>,
}

/// Package `source` into the archive path derived from `layout`.
///
/// The destination directory must already exist.
///
/// # Errors
///
/// Returns [`BuildError::NotFound`] if `source` does not exist,
/// [`BuildError::Io`] on other read or write failures, and
/// [`BuildError::Archive`] if the zip cannot be assembled.
pub fn package_artefact(
    fs: &dyn Filesystem,
    source: &Utf8Path,
    meta: &ArtefactMetadata,
    layout: &ArtefactLayout,
) -> Result<PackagedArchive> {
    let source_bytes = fs.read(source).map_err(|e| BuildError::io(source, e))?;
    let path = layout.archive_path();

    let bytes = match meta.kind() {
        SourceKind::Archive => {
            debug!("copying prebuilt archive {source} to {path}");
            source_bytes
        }
        SourceKind::Binary => {
            debug!("archiving binary {source} as {}", meta.inner_binary_name());
            build_binary_archive(&meta.inner_binary_name(), &source_bytes).map_err(|reason| {
                BuildError::Archive {
                    path: path.clone(),
                    reason,
                }
            })?
        }
    };

    fs.write(&path, &bytes)
        .map_err(|e| BuildError::io(path.as_path(), e))?;

    Ok(PackagedArchive {
        file_name: layout.archive_file_name(),
        path,
        bytes,
    })
}

/// Build a deflated zip holding `contents` under `entry_name`.
///
/// The entry carries mode `0755` and the fixed 2049-01-01 timestamp.
///
/// # Errors
///
/// Returns a description of the failure if the zip writer rejects the
/// entry.
pub fn build_binary_archive(
    entry_name: &str,
    contents: &[u8],
) -> std::result::Result<Vec<u8>, String> {
    let (year, month, day, hour, minute, second) = FIXED_TIMESTAMP;
    let timestamp = DateTime::from_date_and_time(year, month, day, hour, minute, second)
        .map_err(|e| format!("invalid archive timestamp: {e}"))?;
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(BINARY_MODE)
        .last_modified_time(timestamp);

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(entry_name, options)
        .map_err(|e| e.to_string())?;
    writer.write_all(contents).map_err(|e| e.to_string())?;
    let cursor = writer.finish().map_err(|e| e.to_string())?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
#[path = "packaging_tests.rs"]
mod tests;
