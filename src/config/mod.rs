//! Pack configuration (respack.yaml) loading and validation.
//!
//! The document is parsed once into an immutable `PackConfig` that every
//! pipeline stage borrows. Relative paths in the document resolve against
//! the directory holding the configuration file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::error::{PackError, Result};
use crate::source::normalize_path;
use crate::types::Colour;

/// The default configuration file name.
pub const CONFIG_FILENAME: &str = "respack.yaml";

/// Top-level directory every pack carries.
pub const ASSETS_DIR: &str = "assets";

/// Configuration document as written on disk.
#[derive(Debug, Clone, Deserialize)]
struct RawConfig {
    name: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default = "default_source_dir")]
    source_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    output_dir: PathBuf,
    #[serde(default)]
    license_file: Option<PathBuf>,
    #[serde(default)]
    allowed_paths: Vec<String>,
    #[serde(default)]
    max_format: u32,
    #[serde(default)]
    formats: Mapping,
    #[serde(default)]
    process_svg_images: bool,
    #[serde(default)]
    scales: Mapping,
    #[serde(default = "default_theme_dir")]
    theme_dir: PathBuf,
    #[serde(default)]
    default_colors: BTreeMap<String, String>,
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("src")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

fn default_theme_dir() -> PathBuf {
    PathBuf::from("themes")
}

/// Settings that exist only when vector processing is enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorSettings {
    /// Scale factor to target DPI.
    pub scales: BTreeMap<u32, u32>,
    /// Directory holding `<theme>.json` files.
    pub theme_dir: PathBuf,
    /// Canonical colour name to lowercase `#hex` code.
    pub default_colors: BTreeMap<String, String>,
}

impl VectorSettings {
    /// Scales in decreasing order.
    pub fn scales_desc(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.scales.iter().rev().map(|(&scale, &dpi)| (scale, dpi))
    }
}

/// Vector processing gate, selected once at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VectorMode {
    Disabled,
    Enabled(VectorSettings),
}

impl VectorMode {
    /// Settings when enabled.
    pub fn settings(&self) -> Option<&VectorSettings> {
        match self {
            VectorMode::Disabled => None,
            VectorMode::Enabled(settings) => Some(settings),
        }
    }
}

/// Validated, immutable pack configuration.
#[derive(Debug, Clone)]
pub struct PackConfig {
    /// Pack name, used in archive names and the manifest.
    pub name: String,
    /// Pack description for the manifest.
    pub description: String,
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub license_file: Option<PathBuf>,
    /// Top-level paths packed besides `assets/`.
    pub allowed_paths: Vec<String>,
    /// Headroom added to the newest format's supported range.
    pub max_format: u32,
    /// Format identifier to version label.
    pub formats: BTreeMap<u32, String>,
    pub vector: VectorMode,
}

impl PackConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PackError::Config {
            message: format!("Failed to read {}: {}", path.display(), e),
            help: Some(format!(
                "Run 'respack init' to create a {} or pass --config",
                CONFIG_FILENAME
            )),
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(&content, base)
    }

    /// Parse and validate a configuration from YAML, resolving relative
    /// paths against `base`.
    pub fn parse(content: &str, base: &Path) -> Result<Self> {
        let raw: RawConfig = serde_yaml::from_str(content).map_err(|e| PackError::Config {
            message: format!("Invalid configuration: {}", e),
            help: Some(format!("Check {} syntax", CONFIG_FILENAME)),
        })?;

        let name = raw
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| PackError::config("Missing required key 'name'", None))?;

        let formats = parse_numeric_map("formats", &raw.formats, value_to_label)?;
        if formats.is_empty() {
            return Err(PackError::config(
                "No formats configured",
                Some("Add at least one entry under 'formats', e.g. '34: \"1.21\"'"),
            ));
        }

        let vector = if raw.process_svg_images {
            let scales = parse_numeric_map("scales", &raw.scales, value_to_dpi)?;
            if scales.is_empty() {
                return Err(PackError::config(
                    "process_svg_images is enabled but no scales are configured",
                    Some("Add entries under 'scales', e.g. '1: 24'"),
                ));
            }

            let mut default_colors = BTreeMap::new();
            for (colour_name, code) in &raw.default_colors {
                if Colour::from_hex(code).is_err() {
                    return Err(PackError::config(
                        format!("default_colors.{} is not a hex colour: '{}'", colour_name, code),
                        None,
                    ));
                }
                default_colors.insert(colour_name.clone(), normalize_code(code));
            }

            VectorMode::Enabled(VectorSettings {
                scales,
                theme_dir: base.join(raw.theme_dir),
                default_colors,
            })
        } else {
            VectorMode::Disabled
        };

        let allowed_paths = raw
            .allowed_paths
            .iter()
            .map(|p| normalize_path(p))
            .filter(|p| !p.is_empty() && p != ASSETS_DIR)
            .collect();

        Ok(Self {
            name,
            description: raw.description,
            source_dir: base.join(raw.source_dir),
            output_dir: base.join(raw.output_dir),
            license_file: raw.license_file.map(|p| base.join(p)),
            allowed_paths,
            max_format: raw.max_format,
            formats,
            vector,
        })
    }

    /// Formats in strictly decreasing identifier order.
    pub fn formats_desc(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.formats.iter().rev().map(|(&id, label)| (id, label.as_str()))
    }

    /// The next lower configured format below `id`, if any.
    pub fn next_lower_format(&self, id: u32) -> Option<u32> {
        self.formats.range(..id).next_back().map(|(&lower, _)| lower)
    }

    /// The highest configured format.
    pub fn newest_format(&self) -> Option<u32> {
        self.formats.keys().next_back().copied()
    }
}

/// Lowercase a hex code and ensure the leading `#`. The digit count is kept
/// as written, since vector assets are matched textually.
pub fn normalize_code(code: &str) -> String {
    let code = code.trim().to_ascii_lowercase();
    if code.starts_with('#') {
        code
    } else {
        format!("#{}", code)
    }
}

fn parse_numeric_map<T>(
    key: &str,
    mapping: &Mapping,
    convert: impl Fn(&Value) -> Option<T>,
) -> Result<BTreeMap<u32, T>> {
    let mut out = BTreeMap::new();
    for (k, v) in mapping {
        let id = match k {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse::<u32>().ok(),
            _ => None,
        }
        .ok_or_else(|| {
            PackError::config(
                format!("{}: key {:?} is not a non-negative integer", key, k),
                None,
            )
        })?;

        let value = convert(v).ok_or_else(|| {
            PackError::config(format!("{}.{}: invalid value {:?}", key, id, v), None)
        })?;

        if out.insert(id, value).is_some() {
            return Err(PackError::config(
                format!("{}: duplicate key {}", key, id),
                None,
            ));
        }
    }
    Ok(out)
}

fn value_to_label(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_to_dpi(v: &Value) -> Option<u32> {
    v.as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .filter(|&dpi| dpi > 0)
}
