//! File set data model.
//!
//! A `FileSet` maps forward-slash relative paths to `PathEntry` values. Entry
//! contents are reference counted, so deriving one set from another copies
//! only the map, never the bytes.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// What kind of content a path holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Binary,
    Text,
    VectorImage,
}

/// Extensions treated as text content.
const TEXT_EXTENSIONS: &[&str] = &[
    "json", "mcmeta", "txt", "lang", "properties", "md", "fsh", "vsh", "glsl",
];

impl ContentKind {
    /// Detect the content kind from a path's extension.
    pub fn detect(path: &str) -> Self {
        match extension(path).as_deref() {
            Some("svg") => ContentKind::VectorImage,
            Some(ext) if TEXT_EXTENSIONS.contains(&ext) => ContentKind::Text,
            _ => ContentKind::Binary,
        }
    }
}

/// Lowercased extension of a relative path, without the dot.
pub fn extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Normalize a relative path: backslashes become `/`, and leading `./`,
/// leading `/` and trailing `/` are removed.
pub fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let mut path = path.as_str();
    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }
    path.trim_matches('/').to_string()
}

/// One file in a set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    /// Relative path, forward-slash normalized.
    pub path: String,
    /// Opaque file content.
    pub content: Arc<[u8]>,
    /// Content kind tag.
    pub kind: ContentKind,
}

impl PathEntry {
    /// Create an entry, detecting its kind from the path.
    pub fn new(path: impl Into<String>, content: impl Into<Arc<[u8]>>) -> Self {
        let path = normalize_path(&path.into());
        let kind = ContentKind::detect(&path);
        Self {
            path,
            content: content.into(),
            kind,
        }
    }

    /// Same content under a different path.
    pub fn relocated(&self, path: impl Into<String>) -> Self {
        Self::new(path, Arc::clone(&self.content))
    }

    /// Content as UTF-8, if valid.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }
}

/// Materialized contents of one pack build at one point in the pipeline.
///
/// Iteration is in sorted path order, which keeps archive output stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    entries: BTreeMap<String, PathEntry>,
}

impl FileSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing any entry at the same path.
    /// Returns the replaced entry.
    pub fn insert(&mut self, entry: PathEntry) -> Option<PathEntry> {
        self.entries.insert(entry.path.clone(), entry)
    }

    /// Insert an entry only if its path is free. Returns `false` when an
    /// entry already exists, leaving it untouched.
    pub fn insert_new(&mut self, entry: PathEntry) -> bool {
        match self.entries.entry(entry.path.clone()) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
        }
    }

    /// Remove the entry at `path`.
    pub fn remove(&mut self, path: &str) -> Option<PathEntry> {
        self.entries.remove(path)
    }

    /// Look up an entry by path.
    pub fn get(&self, path: &str) -> Option<&PathEntry> {
        self.entries.get(path)
    }

    /// Check whether a path is present.
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the set has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = &PathEntry> {
        self.entries.values()
    }

    /// Iterate paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries whose path lies under `dir` (directory prefix match).
    pub fn under<'a>(&'a self, dir: &'a str) -> impl Iterator<Item = &'a PathEntry> + 'a {
        let prefix = format!("{}/", dir.trim_end_matches('/'));
        self.entries
            .range(prefix.clone()..)
            .take_while(move |(path, _)| path.starts_with(&prefix))
            .map(|(_, entry)| entry)
    }

    /// Count entries of a given kind.
    pub fn count_kind(&self, kind: ContentKind) -> usize {
        self.iter().filter(|e| e.kind == kind).count()
    }
}

impl FromIterator<PathEntry> for FileSet {
    fn from_iter<I: IntoIterator<Item = PathEntry>>(iter: I) -> Self {
        let mut set = FileSet::new();
        for entry in iter {
            set.insert(entry);
        }
        set
    }
}

impl IntoIterator for FileSet {
    type Item = PathEntry;
    type IntoIter = std::collections::btree_map::IntoValues<String, PathEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}

/// Check whether `path` equals `prefix` or lies beneath it as a directory.
pub fn is_under(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return false;
    }
    path == prefix
        || (path.len() > prefix.len()
            && path.starts_with(prefix)
            && path.as_bytes()[prefix.len()] == b'/')
}
