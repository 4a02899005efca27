//! Inclusion: graft a format's overlay directory onto a file set.
//!
//! An overlay stored at `<root>/assets/...` lands at `assets/...`. Paths the
//! base already holds are never replaced.

use crate::source::{FileSet, SourceTree};

/// Result of a merge.
#[derive(Debug, Clone, Default)]
pub struct Merged {
    /// The merged set.
    pub files: FileSet,
    /// Number of overlay entries grafted in.
    pub added: usize,
    /// Destination paths skipped because the base already held them.
    pub collisions: Vec<String>,
}

/// Merge the subtree of `tree` under `overlay_root` into `base`.
///
/// With no overlay root, or a root that holds no files, `base` comes back
/// unchanged.
pub fn merge(base: FileSet, tree: &SourceTree, overlay_root: Option<&str>) -> Merged {
    let mut merged = Merged {
        files: base,
        ..Merged::default()
    };

    let Some(root) = overlay_root else {
        return merged;
    };

    let prefix = format!("{}/", root.trim_end_matches('/'));
    for entry in tree.files().under(root) {
        let Some(dest) = entry.path.strip_prefix(&prefix) else {
            continue;
        };

        if merged.files.insert_new(entry.relocated(dest)) {
            log::debug!("    Remapped file: {} -> {}", entry.path, dest);
            merged.added += 1;
        } else {
            log::debug!("    Kept existing file over overlay: {}", dest);
            merged.collisions.push(dest.to_string());
        }
    }

    merged
}
