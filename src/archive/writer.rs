//! Archive output.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PackError, Result};

/// Destination for finished archives.
pub trait ArchiveWriter {
    /// Store `bytes` at `path`.
    fn write(&mut self, path: &Path, bytes: &[u8]) -> Result<()>;

    /// Whether archives actually reach storage.
    fn persists(&self) -> bool {
        true
    }
}

/// Writes archives to disk, creating parent directories as needed.
#[derive(Debug, Default)]
pub struct DiskWriter;

impl ArchiveWriter for DiskWriter {
    fn write(&mut self, path: &Path, bytes: &[u8]) -> Result<()> {
        let write_error = |e: std::io::Error| PackError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        fs::write(path, bytes).map_err(write_error)?;
        log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}

/// Records where archives would go without touching the filesystem.
#[derive(Debug, Default)]
pub struct DryRunWriter {
    pub paths: Vec<PathBuf>,
}

impl ArchiveWriter for DryRunWriter {
    fn write(&mut self, path: &Path, bytes: &[u8]) -> Result<()> {
        log::info!("Dry run: skipping {} ({} bytes)", path.display(), bytes.len());
        self.paths.push(path.to_path_buf());
        Ok(())
    }

    fn persists(&self) -> bool {
        false
    }
}
