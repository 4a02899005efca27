//! Pack manifest (`pack.mcmeta`) generation.
//!
//! The manifest is synthesized from the configuration, or rendered from a
//! `pack.json` template at the source root when one exists.

use serde::Serialize;

use crate::config::PackConfig;
use crate::error::{PackError, Result};
use crate::source::SourceTree;

/// Archive path of the manifest.
pub const MANIFEST_PATH: &str = "pack.mcmeta";

/// Source path of the optional manifest template.
pub const TEMPLATE_PATH: &str = "pack.json";

/// Values describing one build's manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub name: String,
    pub description: String,
    /// Written format; format 0 is written as 1.
    pub pack_format: u32,
    pub min_format: u32,
    pub max_format: u32,
    pub label: String,
    pub packver: String,
    pub scale: Option<u32>,
}

#[derive(Serialize)]
struct McMeta<'a> {
    pack: PackSection<'a>,
    respack: BuildSection<'a>,
}

#[derive(Serialize)]
struct PackSection<'a> {
    pack_format: u32,
    supported_formats: [u32; 2],
    description: &'a str,
}

#[derive(Serialize)]
struct BuildSection<'a> {
    name: &'a str,
    version: &'a str,
    label: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    scale: Option<u32>,
}

impl Manifest {
    /// Derive the manifest values for `format` at an optional scale.
    ///
    /// The supported range starts just above the next lower configured
    /// format. The newest format extends its range by `max_format`.
    pub fn for_build(config: &PackConfig, format: u32, packver: &str, scale: Option<u32>) -> Self {
        let pack_format = format.max(1);
        let min_format = config
            .next_lower_format(format)
            .map_or(pack_format, |lower| (lower + 1).min(pack_format));
        let max_format = if config.newest_format() == Some(format) {
            pack_format.saturating_add(config.max_format)
        } else {
            pack_format
        };

        Self {
            name: config.name.clone(),
            description: config.description.clone(),
            pack_format,
            min_format,
            max_format,
            label: config.formats.get(&format).cloned().unwrap_or_default(),
            packver: packver.to_string(),
            scale,
        }
    }

    /// Description with the scale suffix, e.g. `My pack (Scale 2)`.
    pub fn full_description(&self) -> String {
        match self.scale {
            Some(scale) => format!("{} (Scale {})", self.description, scale),
            None => self.description.clone(),
        }
    }

    /// Synthesized `pack.mcmeta` JSON.
    pub fn to_json(&self) -> Result<String> {
        let description = self.full_description();
        let meta = McMeta {
            pack: PackSection {
                pack_format: self.pack_format,
                supported_formats: [self.min_format, self.max_format],
                description: &description,
            },
            respack: BuildSection {
                name: &self.name,
                version: &self.packver,
                label: &self.label,
                scale: self.scale,
            },
        };

        serde_json::to_string_pretty(&meta).map_err(|e| PackError::Parse {
            message: format!("Failed to serialize {}: {}", MANIFEST_PATH, e),
            help: None,
        })
    }

    /// Fill a template's placeholders and check the result is JSON.
    pub fn render_template(&self, template: &str) -> Result<String> {
        let scale = self.scale.map(|s| s.to_string()).unwrap_or_default();
        let placeholders = [
            ("{name}", self.name.clone()),
            ("{description}", self.full_description()),
            ("{format}", self.pack_format.to_string()),
            ("{min_format}", self.min_format.to_string()),
            ("{max_format}", self.max_format.to_string()),
            ("{versions}", self.label.clone()),
            ("{packver}", self.packver.clone()),
            ("{scale}", scale),
        ];

        let mut rendered = template.to_string();
        for (placeholder, value) in &placeholders {
            rendered = rendered.replace(placeholder, value);
        }

        let value: serde_json::Value =
            serde_json::from_str(&rendered).map_err(|e| PackError::Config {
                message: format!("{} does not render to valid JSON: {}", TEMPLATE_PATH, e),
                help: Some("Quote string placeholders like \"{description}\"".to_string()),
            })?;

        serde_json::to_string_pretty(&value).map_err(|e| PackError::Parse {
            message: format!("Failed to serialize {}: {}", MANIFEST_PATH, e),
            help: None,
        })
    }

    /// Manifest text for this build, preferring the tree's template.
    pub fn render(&self, tree: &SourceTree) -> Result<String> {
        match tree.get(TEMPLATE_PATH) {
            Some(template) => {
                let text = template.text().ok_or_else(|| PackError::Config {
                    message: format!("{} is not valid UTF-8", TEMPLATE_PATH),
                    help: None,
                })?;
                self.render_template(text)
            }
            None => self.to_json(),
        }
    }
}
