//! Theme substitution for vector assets.
//!
//! A theme maps canonical colour names to replacement codes. Each canonical
//! name's default code (from the configuration) is swapped for the theme's
//! code wherever it appears as the value of a colour property: `fill="…"`,
//! `stroke:…` inside a `style` attribute or stylesheet, `stop-color`, and so
//! on. Other `#hex` text, like fragment references, is left alone.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::config::normalize_code;
use crate::error::{PackError, Result};
use crate::report::{codes, Report};
use crate::source::{ContentKind, FileSet, PathEntry};
use crate::types::Colour;

/// Properties whose value is a colour.
const COLOUR_PROPERTIES: &[&str] = &[
    "fill",
    "stroke",
    "color",
    "stop-color",
    "flood-color",
    "lighting-color",
    "solid-color",
];

#[derive(Debug, Deserialize)]
struct ThemeFile {
    #[serde(default)]
    colors: BTreeMap<String, String>,
}

/// A named colour theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: String,
    /// Canonical colour name to lowercase replacement code.
    pub colors: BTreeMap<String, String>,
}

impl Theme {
    /// Create a theme from name/code pairs, validating each code.
    pub fn new<I, K, V>(name: impl Into<String>, colors: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let name = name.into();
        let mut map = BTreeMap::new();
        for (key, code) in colors {
            let key = key.into();
            let code = code.as_ref();
            Colour::from_hex(code).map_err(|_| PackError::Config {
                message: format!("Theme '{}': colour '{}' has invalid code '{}'", name, key, code),
                help: None,
            })?;
            map.insert(key, normalize_code(code));
        }
        Ok(Self { name, colors: map })
    }

    /// Load `<dir>/<name>.json`.
    pub fn load(dir: &Path, name: &str) -> Result<Self> {
        if !dir.is_dir() {
            return Err(PackError::Config {
                message: format!("Theme directory '{}' is not valid", dir.display()),
                help: Some("Set theme_dir in the configuration".to_string()),
            });
        }

        let path = dir.join(format!("{}.json", name));
        let content = std::fs::read(&path).map_err(|e| PackError::Config {
            message: format!("Theme file not found: {} ({})", path.display(), e),
            help: None,
        })?;

        let file: ThemeFile = serde_json::from_slice(&content).map_err(|e| PackError::Config {
            message: format!("Invalid theme file {}: {}", path.display(), e),
            help: Some("Expected {\"colors\": {\"<name>\": \"#RRGGBB\"}}".to_string()),
        })?;

        Self::new(name, file.colors)
    }

    /// Pair this theme with the default colours into a substitution plan.
    ///
    /// Canonical names the theme does not cover keep their default code.
    pub fn plan(&self, default_colors: &BTreeMap<String, String>) -> Recolour {
        let mut swaps = Vec::new();
        for (name, from) in default_colors {
            match self.colors.get(name) {
                Some(to) if to != from => swaps.push(Swap {
                    name: name.clone(),
                    from: from.clone(),
                    to: to.clone(),
                }),
                Some(_) => {}
                None => log::trace!("      No theme colour for '{}', keeping {}", name, from),
            }
        }
        for name in self.colors.keys() {
            if !default_colors.contains_key(name) {
                log::debug!("  Theme '{}' colour '{}' has no default, ignored", self.name, name);
            }
        }
        Recolour { swaps }
    }
}

/// One default-to-theme code replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Swap {
    pub name: String,
    pub from: String,
    pub to: String,
}

impl Swap {
    /// Label used in statistics, e.g. `red (#ff0000 -> #bf616a)`.
    pub fn label(&self) -> String {
        format!("{} ({} -> {})", self.name, self.from, self.to)
    }
}

/// A theme resolved against the default colours.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recolour {
    swaps: Vec<Swap>,
}

/// Output of theming one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Themed {
    pub text: String,
    /// Replacement counts per swap label.
    pub edits: BTreeMap<String, usize>,
}

impl Themed {
    /// Total number of replacements.
    pub fn total(&self) -> usize {
        self.edits.values().sum()
    }
}

impl Recolour {
    /// Check if no colour would change.
    pub fn is_empty(&self) -> bool {
        self.swaps.is_empty()
    }

    fn swap_for(&self, token: &str) -> Option<&Swap> {
        self.swaps
            .iter()
            .find(|s| s.from.eq_ignore_ascii_case(token))
    }

    /// Replace default codes in colour contexts of `svg`.
    ///
    /// Replacement happens in a single pass, so a code introduced by the
    /// theme is never rewritten again.
    pub fn apply(&self, svg: &str) -> Themed {
        let mut text = String::with_capacity(svg.len());
        let mut edits = BTreeMap::new();
        let bytes = svg.as_bytes();
        let mut last = 0;
        let mut i = 0;

        while i < bytes.len() {
            if bytes[i] != b'#' {
                i += 1;
                continue;
            }

            let end = hex_run_end(bytes, i + 1);
            let digits = end - i - 1;
            let bounded = end == bytes.len() || !is_word_byte(bytes[end]);

            if matches!(digits, 3 | 4 | 6 | 8) && bounded && in_colour_context(&svg[..i]) {
                if let Some(swap) = self.swap_for(&svg[i..end]) {
                    text.push_str(&svg[last..i]);
                    text.push_str(&swap.to);
                    *edits.entry(swap.label()).or_insert(0) += 1;
                    last = end;
                }
            }
            i = end.max(i + 1);
        }

        text.push_str(&svg[last..]);
        Themed { text, edits }
    }

    /// Theme every vector asset in `files`.
    ///
    /// Assets that are not valid UTF-8 are left as they are and recorded.
    pub fn apply_to_set(&self, mut files: FileSet, report: &mut Report) -> FileSet {
        if self.is_empty() {
            return files;
        }

        let vectors: Vec<PathEntry> = files
            .iter()
            .filter(|e| e.kind == ContentKind::VectorImage)
            .cloned()
            .collect();

        for entry in vectors {
            let Some(svg) = entry.text() else {
                let err = PackError::AssetConversion {
                    path: entry.path.clone(),
                    message: "not valid UTF-8".to_string(),
                };
                report.warning(codes::THEME_ENCODING, err.to_string());
                continue;
            };

            let themed = self.apply(svg);
            if themed.total() == 0 {
                continue;
            }

            log::debug!("    Applied theme to SVG: {}", entry.path);
            report.stats.svg_files_themed.insert(entry.path.clone());
            for (label, n) in &themed.edits {
                *report.stats.theme_color_edits.entry(label.clone()).or_insert(0) += n;
            }
            files.insert(PathEntry::new(entry.path, themed.text.into_bytes()));
        }

        files
    }
}

fn hex_run_end(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_hexdigit() {
        i += 1;
    }
    i
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

/// Whether the text before a `#` ends in `<colour-property>=` (optionally
/// quoted) or `<colour-property>:`.
fn in_colour_context(before: &str) -> bool {
    let mut rest = before.trim_end();
    if let Some(stripped) = rest.strip_suffix(['"', '\'']) {
        rest = stripped.trim_end();
    }
    let Some(rest) = rest.strip_suffix(['=', ':']) else {
        return false;
    };
    let rest = rest.trim_end();

    let name_start = rest
        .char_indices()
        .rev()
        .find(|&(_, c)| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .map_or(0, |(pos, c)| pos + c.len_utf8());
    let name = &rest[name_start..];

    COLOUR_PROPERTIES
        .iter()
        .any(|p| p.eq_ignore_ascii_case(name))
}
