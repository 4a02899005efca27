//! Per-format build rules.
//!
//! Each configured format may carry an exclusion list at `<id>.json` and an
//! overlay directory at `<id>/` in the source tree.

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::error::{PackError, Result};
use crate::source::{normalize_path, SourceTree};

/// Exclusion file contents: either a bare list or `{ "exclusions": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExclusionFile {
    List(Vec<String>),
    Object {
        #[serde(default)]
        exclusions: Vec<String>,
    },
}

/// Rules for building one format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    /// Numeric format identifier.
    pub id: u32,
    /// Version label used in archive names.
    pub label: String,
    /// Normalized paths to drop.
    pub exclusions: BTreeSet<String>,
    /// Source tree directory grafted in after exclusion.
    pub overlay_root: Option<String>,
}

impl FormatSpec {
    /// A format with no exclusions and no overlay.
    pub fn new(id: u32, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            exclusions: BTreeSet::new(),
            overlay_root: None,
        }
    }

    /// Read the format's exclusion list and overlay directory from the tree.
    ///
    /// A missing `<id>.json` means no exclusions; a malformed one is a
    /// configuration error. The overlay is set only when `<id>/` holds files.
    pub fn from_source(id: u32, label: &str, tree: &SourceTree) -> Result<Self> {
        let mut spec = Self::new(id, label);

        let list_path = format!("{}.json", id);
        if let Some(entry) = tree.get(&list_path) {
            log::debug!("  Found exclusion list: {}", list_path);
            let file: ExclusionFile =
                serde_json::from_slice(&entry.content).map_err(|e| PackError::Config {
                    message: format!("Invalid exclusion list {}: {}", list_path, e),
                    help: Some(
                        "Use a JSON array of paths or {\"exclusions\": [...]}".to_string(),
                    ),
                })?;
            let paths = match file {
                ExclusionFile::List(paths) => paths,
                ExclusionFile::Object { exclusions } => exclusions,
            };
            spec.exclusions = paths
                .iter()
                .map(|p| normalize_path(p))
                .filter(|p| !p.is_empty())
                .collect();
        } else {
            log::debug!("  {} not found, no exclusions", list_path);
        }

        let overlay = id.to_string();
        if tree.files().under(&overlay).next().is_some() {
            spec.overlay_root = Some(overlay);
        }

        Ok(spec)
    }
}
