//! Info command implementation.
//!
//! Loads and validates the configuration and prints what a build would use.

use std::path::Path;

use clap::Args;

use crate::config::{PackConfig, VectorMode};
use crate::error::Result;
use crate::output::{display_path, Printer};

/// Show the validated configuration
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Also list canonical colours
    #[arg(long)]
    pub colors: bool,
}

pub fn run(args: InfoArgs, config_path: &Path, printer: &Printer) -> Result<()> {
    let config = PackConfig::load(config_path)?;

    for (label, value) in summary_lines(&config, args.colors) {
        printer.info(&label, &value);
    }

    Ok(())
}

/// Label/value pairs describing `config`.
fn summary_lines(config: &PackConfig, colors: bool) -> Vec<(String, String)> {
    let mut lines = vec![
        ("Name".to_string(), config.name.clone()),
        ("Source".to_string(), display_path(&config.source_dir)),
        ("Output".to_string(), display_path(&config.output_dir)),
    ];

    if !config.description.is_empty() {
        lines.push(("Description".to_string(), config.description.clone()));
    }
    if let Some(license) = &config.license_file {
        lines.push(("License".to_string(), display_path(license)));
    }
    if !config.allowed_paths.is_empty() {
        lines.push(("Allowed".to_string(), config.allowed_paths.join(", ")));
    }

    let formats: Vec<String> = config
        .formats_desc()
        .map(|(id, label)| format!("{} ({})", id, label))
        .collect();
    lines.push(("Formats".to_string(), formats.join(", ")));

    match &config.vector {
        VectorMode::Disabled => {
            lines.push(("Vectors".to_string(), "disabled".to_string()));
        }
        VectorMode::Enabled(settings) => {
            let scales: Vec<String> = settings
                .scales_desc()
                .map(|(scale, dpi)| format!("{} ({} DPI)", scale, dpi))
                .collect();
            lines.push(("Scales".to_string(), scales.join(", ")));
            lines.push(("Themes".to_string(), display_path(&settings.theme_dir)));

            if colors {
                for (name, code) in &settings.default_colors {
                    lines.push(("Colour".to_string(), format!("{} {}", name, code)));
                }
            }
        }
    }

    lines
}
