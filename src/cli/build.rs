//! Build command implementation.
//!
//! Loads the configuration and source tree, resolves every selected format
//! and scale, and writes one archive per build.

use std::path::Path;

use clap::Args;

use crate::archive::{build_archive, ArchiveWriter, DiskWriter, DryRunWriter, License};
use crate::config::PackConfig;
use crate::error::{PackError, Result};
use crate::output::{display_path, plural, Printer};
use crate::pipeline::{BuildOptions, BuildResult, PackAssembler, Theme};
use crate::report::{codes, print_summary, Report};
use crate::source::SourceTree;

/// Build pack archives for every configured format
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Resolve every build without writing archives
    #[arg(long)]
    pub dry_run: bool,

    /// Stop at the first write failure and exit non-zero on any error
    #[arg(long)]
    pub exit_error: bool,

    /// Theme applied to vector assets
    #[arg(long)]
    pub theme: Option<String>,

    /// Only build this scale (repeatable)
    #[arg(long)]
    pub scale: Vec<u32>,

    /// Only build this format identifier
    #[arg(long)]
    pub format: Option<u32>,

    /// Pack version used in archive names and the manifest
    #[arg(long, default_value = "dev")]
    pub packver: String,
}

pub fn run(args: BuildArgs, config_path: &Path, printer: &Printer, verbose_help: bool) -> Result<()> {
    printer.status("Loading", &display_path(config_path));
    let config = PackConfig::load(config_path)?;

    let mut report = Report::new();

    let theme = match (&args.theme, config.vector.settings()) {
        (Some(name), Some(settings)) => Some(Theme::load(&settings.theme_dir, name)?),
        (Some(name), None) => {
            report.warning(
                codes::FILTER_IGNORED,
                format!("--theme {} has no effect without process_svg_images", name),
            );
            None
        }
        (None, _) => None,
    };

    printer.status("Scanning", &display_path(&config.source_dir));
    let tree = SourceTree::load(&config.source_dir, &mut report)?;

    let license = match &config.license_file {
        Some(path) => {
            let license = License::load(path)?;
            if license.is_none() {
                report.warning(
                    codes::LICENSE_MISSING,
                    format!("License file not found: {}", display_path(path)),
                );
            }
            license
        }
        None => None,
    };

    let mut writer: Box<dyn ArchiveWriter> = if args.dry_run {
        Box::new(DryRunWriter::default())
    } else {
        Box::new(DiskWriter)
    };

    let options = BuildOptions {
        packver: args.packver.clone(),
        theme,
        format_filter: args.format,
        scale_filter: args.scale.clone(),
    };

    let outcome = PackAssembler::new(&config, &tree, &options).run(&mut report, |build, report| {
        let result = pack(&build, &config, license.as_ref(), writer.as_mut(), printer, report);
        match result {
            Err(e) if args.exit_error => Err(e),
            Err(e) => {
                printer.error("Failed", &e.to_string());
                report.error(codes::ARCHIVE_WRITE, e.to_string());
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    });

    print_summary(&report, printer, verbose_help);
    outcome?;

    if args.exit_error
        && (report.diagnostics.has_errors() || report.diagnostics.has_code(codes::BUILD_EMPTY))
    {
        return Err(PackError::Build {
            message: format!(
                "{}, {} recorded",
                plural(report.diagnostics.error_count(), "error", "errors"),
                plural(report.diagnostics.warning_count(), "warning", "warnings"),
            ),
            help: Some("Run without --exit-error to treat these as non-fatal".to_string()),
        });
    }

    Ok(())
}

/// Serialize one build and hand it to `writer`.
fn pack(
    build: &BuildResult,
    config: &PackConfig,
    license: Option<&License>,
    writer: &mut dyn ArchiveWriter,
    printer: &Printer,
    report: &mut Report,
) -> Result<()> {
    printer.status("Packing", &build.describe());

    let bytes = build_archive(build, license)?;
    report.stats.archives_built += 1;

    let path = config.output_dir.join(build.archive_path(&config.name));
    writer.write(&path, &bytes)?;

    if writer.persists() {
        report.stats.archives_written += 1;
        printer.status(
            "Writing",
            &format!("{} ({})", display_path(&path), plural(build.files.len(), "file", "files")),
        );
    } else {
        printer.info("Skipped", &format!("{} (dry run)", display_path(&path)));
    }

    Ok(())
}
