//! Run diagnostics and end-of-run statistics.
//!
//! Every recoverable problem in the pipeline lands here instead of aborting
//! the run. The build command prints the collected `Report` as a summary.

mod diagnostic;

pub use diagnostic::{Diagnostic, Diagnostics, Severity};

use std::collections::{BTreeMap, BTreeSet};

use crate::output::{plural, Printer};

/// Diagnostic codes recorded by the pipeline.
pub mod codes {
    pub const SOURCE_READ: &str = "respack::source::read";
    pub const EXCLUSION_UNMATCHED: &str = "respack::exclusion::unmatched";
    pub const INCLUSION_COLLISION: &str = "respack::inclusion::collision";
    pub const THEME_ENCODING: &str = "respack::theme::encoding";
    pub const RASTER_PARSE: &str = "respack::raster::parse";
    pub const RASTER_COLLISION: &str = "respack::raster::collision";
    pub const BUILD_EMPTY: &str = "respack::build::empty";
    pub const FILTER_IGNORED: &str = "respack::build::filter-ignored";
    pub const LICENSE_MISSING: &str = "respack::archive::license";
    pub const ARCHIVE_WRITE: &str = "respack::archive::write";
}

/// Counters collected over a run.
#[derive(Debug, Clone, Default)]
pub struct Stats {
    /// Files loaded from the source tree.
    pub source_files_loaded: usize,
    /// Loaded files per lowercase extension.
    pub file_extensions: BTreeMap<String, usize>,
    /// Formats that went through resolution.
    pub formats_processed: usize,
    /// Archives built in memory.
    pub archives_built: usize,
    /// Archives flushed to disk.
    pub archives_written: usize,
    /// Distinct vector paths in which the theme replaced at least one colour.
    /// A path themed for several builds is counted once.
    pub svg_files_themed: BTreeSet<String>,
    /// Distinct raster paths produced from vector assets, over all builds.
    pub png_files_generated: BTreeSet<String>,
    /// Replacement counts keyed by "name (default -> replacement)", summed
    /// over every build.
    pub theme_color_edits: BTreeMap<String, usize>,
}

/// Diagnostics plus statistics for one run.
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub diagnostics: Diagnostics,
    pub stats: Stats,
}

impl Report {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning.
    pub fn warning(&mut self, code: &str, message: impl Into<String>) {
        self.diagnostics.warning(code, message);
    }

    /// Record an error.
    pub fn error(&mut self, code: &str, message: impl Into<String>) {
        self.diagnostics.error(code, message);
    }

    /// Record a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

/// Print the end-of-run summary.
pub fn print_summary(report: &Report, printer: &Printer, verbose_help: bool) {
    if printer.is_quiet() {
        for d in report.diagnostics.iter().filter(|d| d.severity == Severity::Error) {
            eprintln!("{}[{}]: {}", d.severity, d.code, d.message);
        }
        return;
    }

    let stats = &report.stats;

    printer.info(
        "Loaded",
        &plural(stats.source_files_loaded, "source file", "source files"),
    );

    let mut extensions: Vec<(&String, &usize)> = stats.file_extensions.iter().collect();
    extensions.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    if !extensions.is_empty() {
        let listing: Vec<String> = extensions
            .iter()
            .map(|(ext, n)| format!("{} ({})", ext, n))
            .collect();
        printer.info("Filetypes", &listing.join(", "));
    }

    printer.info(
        "Processed",
        &plural(stats.formats_processed, "format", "formats"),
    );

    if !stats.png_files_generated.is_empty() {
        printer.info(
            "Rasterized",
            &format!(
                "{}, {} themed",
                plural(stats.png_files_generated.len(), "image", "images"),
                plural(stats.svg_files_themed.len(), "vector", "vectors"),
            ),
        );
    }

    let mut edits: Vec<(&String, &usize)> = stats.theme_color_edits.iter().collect();
    edits.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (edit, n) in edits {
        printer.info("Recoloured", &format!("{}: {}", edit, n));
    }

    for d in report.diagnostics.iter() {
        let label = printer.severity(&d.severity.to_string(), d.severity == Severity::Error);
        eprintln!("  {}[{}]: {}", label, d.code, d.message);
        if verbose_help {
            if let Some(help) = &d.help {
                eprintln!("    {}", printer.dim(&format!("help: {}", help)));
            }
        }
    }

    if let Some(errors) = grouped(report, Severity::Error) {
        printer.error("Errors", &errors);
    }
    if let Some(warnings) = grouped(report, Severity::Warning) {
        printer.warning("Warnings", &warnings);
    }

    let errors = report.diagnostics.error_count();
    let warnings = report.diagnostics.warning_count();
    let message = format!(
        "{} ({}, {})",
        plural(stats.archives_built, "archive", "archives"),
        plural(errors, "error", "errors"),
        plural(warnings, "warning", "warnings"),
    );
    if errors > 0 {
        printer.error("Finished", &message);
    } else if warnings > 0 {
        printer.warning("Finished", &message);
    } else {
        printer.status("Finished", &message);
    }
}

/// Diagnostic counts per code for one severity, e.g. `respack::raster::parse (2)`.
fn grouped(report: &Report, severity: Severity) -> Option<String> {
    let tally = report.diagnostics.tally(severity);
    if tally.is_empty() {
        return None;
    }
    let parts: Vec<String> = tally
        .iter()
        .map(|(code, n)| format!("{} ({})", code, n))
        .collect();
    Some(parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_records_diagnostics() {
        let mut report = Report::new();
        report.warning(codes::RASTER_PARSE, "bad svg");
        report.error(codes::ARCHIVE_WRITE, "disk full");

        assert!(report.diagnostics.has_code(codes::RASTER_PARSE));
        assert_eq!(report.diagnostics.warning_count(), 1);
        assert_eq!(report.diagnostics.error_count(), 1);
    }

    #[test]
    fn test_grouped_counts() {
        let mut report = Report::new();
        report.warning(codes::BUILD_EMPTY, "format 18 is empty");
        report.warning(codes::RASTER_PARSE, "a.svg");
        report.warning(codes::RASTER_PARSE, "b.svg");

        assert_eq!(
            grouped(&report, Severity::Warning),
            Some("respack::build::empty (1), respack::raster::parse (2)".to_string())
        );
        assert_eq!(grouped(&report, Severity::Error), None);
    }
}
