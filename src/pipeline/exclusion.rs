//! Exclusion: drop a format's listed paths from a file set.

use std::collections::BTreeSet;

use crate::source::{is_under, FileSet};

/// Every entry of `base` whose path is neither listed in `removals` nor
/// beneath a listed directory.
///
/// Removals that match nothing are ignored, so lists can be shared loosely
/// across format revisions.
pub fn exclude(base: &FileSet, removals: &BTreeSet<String>) -> FileSet {
    if removals.is_empty() {
        return base.clone();
    }

    base.iter()
        .filter(|entry| {
            let excluded = removals.iter().any(|r| is_under(&entry.path, r));
            if excluded {
                log::debug!("    Excluding file: {}", entry.path);
            }
            !excluded
        })
        .cloned()
        .collect()
}

/// Removals that match no path in `base`.
pub fn unmatched<'a>(base: &FileSet, removals: &'a BTreeSet<String>) -> Vec<&'a str> {
    removals
        .iter()
        .filter(|r| !base.paths().any(|p| is_under(p, r)))
        .map(String::as_str)
        .collect()
}
