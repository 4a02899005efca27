//! Init command implementation.
//!
//! Generates a starter `respack.yaml`, seeding formats from the per-format
//! exclusion lists and overlay directories already in the source directory.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;

use crate::config::CONFIG_FILENAME;
use crate::error::{PackError, Result};
use crate::output::{display_path, plural, Printer};

/// Initialize a respack project by generating a respack.yaml
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Project directory (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Source directory, relative to the project
    #[arg(long, default_value = "src")]
    pub source: PathBuf,

    /// Pack name (default: the project directory's name)
    #[arg(long)]
    pub name: Option<String>,

    /// Overwrite existing respack.yaml
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, printer: &Printer) -> Result<()> {
    let config_path = args.path.join(CONFIG_FILENAME);

    if config_path.exists() && !args.force {
        return Err(PackError::Config {
            message: format!("{} already exists", CONFIG_FILENAME),
            help: Some("Use --force to overwrite".to_string()),
        });
    }

    let source_dir = args.path.join(&args.source);
    printer.status("Scanning", &display_path(&source_dir));
    let formats = discover_formats(&source_dir)?;

    let name = args.name.clone().unwrap_or_else(|| project_name(&args.path));
    let yaml = starter_config(&name, &args.source, &formats);

    fs::write(&config_path, &yaml).map_err(|e| PackError::Io {
        path: config_path.clone(),
        message: format!("Failed to write configuration: {}", e),
    })?;

    if !formats.is_empty() {
        let ids: Vec<String> = formats.iter().rev().map(u32::to_string).collect();
        printer.info("Discovered", &ids.join(", "));
    }

    printer.status(
        "Created",
        &format!(
            "{} ({} found)",
            CONFIG_FILENAME,
            plural(formats.len(), "format", "formats")
        ),
    );

    Ok(())
}

/// Numeric format identifiers named by `<id>.json` files or `<id>/`
/// directories directly under `source_dir`. A missing directory has none.
fn discover_formats(source_dir: &Path) -> Result<BTreeSet<u32>> {
    let mut formats = BTreeSet::new();
    if !source_dir.is_dir() {
        return Ok(formats);
    }

    let entries = fs::read_dir(source_dir).map_err(|e| PackError::Io {
        path: source_dir.to_path_buf(),
        message: format!("Failed to read directory: {}", e),
    })?;

    for entry in entries.flatten() {
        let path = entry.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        let id = if path.is_dir() {
            file_name
        } else {
            match file_name.strip_suffix(".json") {
                Some(stem) => stem,
                None => continue,
            }
        };

        if let Ok(id) = id.parse::<u32>() {
            formats.insert(id);
        }
    }

    Ok(formats)
}

fn project_name(path: &Path) -> String {
    fs::canonicalize(path)
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "pack".to_string())
}

/// YAML text of a starter configuration, built by hand for clean formatting.
fn starter_config(name: &str, source: &Path, formats: &BTreeSet<u32>) -> String {
    let mut yaml = String::new();
    yaml.push_str(&format!("name: {:?}\n", name));
    yaml.push_str(&format!("description: {:?}\n", format!("{} resource pack", name)));
    yaml.push_str(&format!("source_dir: {:?}\n", source.display().to_string()));
    yaml.push_str("output_dir: generated\n");
    yaml.push_str("max_format: 0\n");

    yaml.push_str("formats:\n");
    if formats.is_empty() {
        yaml.push_str("  34: \"1.21\"\n");
    } else {
        for id in formats.iter().rev() {
            yaml.push_str(&format!("  {0}: \"{0}\"\n", id));
        }
    }

    yaml.push_str("process_svg_images: false\n");
    yaml
}
