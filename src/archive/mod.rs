//! In-memory archive construction.
//!
//! A build is serialized to a zip held entirely in memory. Entries are
//! written in sorted path order with fixed timestamps, so identical builds
//! produce identical bytes.

mod writer;

pub use writer::{ArchiveWriter, DiskWriter, DryRunWriter};

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::{PackError, Result};
use crate::pipeline::{BuildResult, MANIFEST_PATH};

/// License text copied into every archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct License {
    /// Entry name at the archive root.
    pub name: String,
    pub content: Vec<u8>,
}

impl License {
    /// Read a license file. Returns `Ok(None)` when it does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| PackError::Io {
                path: path.to_path_buf(),
                message: "license path has no file name".to_string(),
            })?
            .to_string();

        let content = std::fs::read(path).map_err(|e| PackError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read license: {}", e),
        })?;

        Ok(Some(Self { name, content }))
    }
}

/// Serialize a build into zip bytes.
///
/// The archive holds the manifest, the optional license and every file of
/// the build. A build file never replaces the manifest or license.
pub fn build_archive(build: &BuildResult, license: Option<&License>) -> Result<Vec<u8>> {
    let archive_name = PathBuf::from(build.describe());
    let write_error = |e: &dyn std::fmt::Display| PackError::Write {
        path: archive_name.clone(),
        message: e.to_string(),
    };

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644);

    let mut entries: Vec<(&str, &[u8])> = vec![(MANIFEST_PATH, build.manifest.as_bytes())];
    if let Some(license) = license {
        entries.push((license.name.as_str(), license.content.as_slice()));
    }
    for entry in build.files.iter() {
        if entries.iter().any(|(name, _)| *name == entry.path) {
            log::debug!("    Skipping {}: reserved archive entry", entry.path);
            continue;
        }
        entries.push((entry.path.as_str(), &entry.content[..]));
    }
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        zip.start_file(name, options).map_err(|e| write_error(&e))?;
        zip.write_all(content).map_err(|e| write_error(&e))?;
    }

    let cursor = zip.finish().map_err(|e| write_error(&e))?;
    Ok(cursor.into_inner())
}
