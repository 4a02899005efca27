//! Source tree loading.
//!
//! Walks the configured source directory once and snapshots every file into
//! memory, keyed by forward-slash relative path. The resulting `SourceTree`
//! is shared read-only by every format and scale of a run.

mod fileset;

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{PackError, Result};
use crate::report::{codes, Report};

pub use fileset::{extension, is_under, normalize_path, ContentKind, FileSet, PathEntry};

/// Immutable in-memory snapshot of the source directory.
#[derive(Debug, Clone)]
pub struct SourceTree {
    root: PathBuf,
    files: FileSet,
}

impl SourceTree {
    /// Build a tree from an already materialized file set.
    pub fn from_files(root: impl Into<PathBuf>, files: FileSet) -> Self {
        Self {
            root: root.into(),
            files,
        }
    }

    /// Load every file under `root`.
    ///
    /// A missing or non-directory root is a configuration error. Individual
    /// files that cannot be read are skipped and recorded in `report`.
    pub fn load(root: &Path, report: &mut Report) -> Result<Self> {
        if !root.exists() {
            return Err(PackError::config(
                format!("Missing source directory: {}", root.display()),
                Some("Set source_dir in the configuration to an existing directory"),
            ));
        }
        if !root.is_dir() {
            return Err(PackError::config(
                format!("Source path is not a directory: {}", root.display()),
                None,
            ));
        }

        log::info!("Scanning source directory: {}", root.display());
        let mut files = FileSet::new();

        for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    report.warning(codes::SOURCE_READ, format!("Unreadable entry: {}", e));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative = match path.strip_prefix(root) {
                Ok(relative) => normalize_path(&relative.to_string_lossy()),
                Err(_) => continue,
            };

            match fs::read(path) {
                Ok(bytes) => {
                    if let Some(ext) = extension(&relative) {
                        *report.stats.file_extensions.entry(ext).or_insert(0) += 1;
                    }
                    log::debug!("  Loaded: {}", relative);
                    files.insert(PathEntry::new(relative, bytes));
                }
                Err(e) => {
                    let err = PackError::SourceRead {
                        path: relative,
                        message: e.to_string(),
                    };
                    report.warning(codes::SOURCE_READ, err.to_string());
                }
            }
        }

        report.stats.source_files_loaded = files.len();
        log::info!(
            "Total files found: {} ({} vector images)",
            files.len(),
            files.count_kind(ContentKind::VectorImage)
        );

        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    /// Directory the tree was loaded from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All files in the tree.
    pub fn files(&self) -> &FileSet {
        &self.files
    }

    /// Look up a file by relative path.
    pub fn get(&self, path: &str) -> Option<&PathEntry> {
        self.files.get(path)
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the tree holds no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_nested_files() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("assets/minecraft/textures")).unwrap();
        fs::create_dir_all(dir.path().join("63/assets")).unwrap();
        fs::write(dir.path().join("assets/minecraft/textures/a.png"), b"png").unwrap();
        fs::write(dir.path().join("assets/icon.svg"), "<svg/>").unwrap();
        fs::write(dir.path().join("63/assets/b.png"), b"png").unwrap();
        fs::write(dir.path().join("63.json"), "[]").unwrap();

        let mut report = Report::new();
        let tree = SourceTree::load(dir.path(), &mut report).unwrap();

        assert_eq!(tree.len(), 4);
        assert!(tree.get("assets/minecraft/textures/a.png").is_some());
        assert!(tree.get("63/assets/b.png").is_some());
        assert_eq!(
            tree.get("assets/icon.svg").unwrap().kind,
            ContentKind::VectorImage
        );
        assert_eq!(report.stats.source_files_loaded, 4);
        assert_eq!(report.stats.file_extensions["png"], 2);
        assert_eq!(report.stats.file_extensions["json"], 1);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_load_missing_directory_is_config_error() {
        let mut report = Report::new();
        let result = SourceTree::load(Path::new("/nonexistent/respack/src"), &mut report);
        assert!(matches!(result, Err(PackError::Config { .. })));
    }

    #[test]
    fn test_load_file_as_root_is_config_error() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        fs::write(&file, "x").unwrap();

        let mut report = Report::new();
        assert!(matches!(
            SourceTree::load(&file, &mut report),
            Err(PackError::Config { .. })
        ));
    }

    #[test]
    fn test_load_empty_directory() {
        let dir = tempdir().unwrap();
        let mut report = Report::new();
        let tree = SourceTree::load(dir.path(), &mut report).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.root(), dir.path());
    }
}
