//! Build resolution.
//!
//! `PackAssembler` walks the configured formats from highest to lowest
//! identifier and, with vector processing enabled, each configured scale
//! from highest to lowest. Every combination gets a fresh `FileSet` derived
//! from the shared source tree, which is handed off as a `BuildResult`.

use std::path::PathBuf;

use crate::config::{PackConfig, VectorMode, ASSETS_DIR};
use crate::error::Result;
use crate::report::{codes, Diagnostic, Report};
use crate::source::{is_under, FileSet, SourceTree};

use super::exclusion::{exclude, unmatched};
use super::format::FormatSpec;
use super::inclusion::merge;
use super::manifest::{Manifest, MANIFEST_PATH};
use super::raster::rasterize_set;
use super::theme::{Recolour, Theme};

/// Archive path of the pack icon.
pub const ICON_PATH: &str = "pack.png";

/// Run-level build parameters, already validated by the caller.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Version string embedded in archive names and the manifest.
    pub packver: String,
    /// Theme applied to vector assets before rasterizing.
    pub theme: Option<Theme>,
    /// Restrict the run to one format identifier.
    pub format_filter: Option<u32>,
    /// Restrict the run to these scales. Empty means all.
    pub scale_filter: Vec<u32>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            packver: "dev".to_string(),
            theme: None,
            format_filter: None,
            scale_filter: Vec::new(),
        }
    }
}

/// One resolved (format, scale) combination.
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub format: u32,
    pub label: String,
    pub packver: String,
    pub scale: Option<u32>,
    pub dpi: Option<u32>,
    /// Packed files, excluding the manifest.
    pub files: FileSet,
    /// Rendered `pack.mcmeta`.
    pub manifest: String,
}

impl BuildResult {
    /// Archive path relative to the output directory.
    ///
    /// Scaled builds are grouped in a directory per format.
    pub fn archive_path(&self, pack_name: &str) -> PathBuf {
        match self.scale {
            Some(scale) => PathBuf::from(self.format.to_string()).join(format!(
                "{}-{}-{}-scale-{}.zip",
                pack_name, self.packver, self.label, scale
            )),
            None => PathBuf::from(format!("{}-{}-{}.zip", pack_name, self.packver, self.label)),
        }
    }

    /// A short name for progress output.
    pub fn describe(&self) -> String {
        match self.scale {
            Some(scale) => format!("format {} ({}) at scale {}", self.format, self.label, scale),
            None => format!("format {} ({})", self.format, self.label),
        }
    }
}

/// Orchestrates resolution for every selected format and scale.
pub struct PackAssembler<'a> {
    config: &'a PackConfig,
    tree: &'a SourceTree,
    options: &'a BuildOptions,
}

impl<'a> PackAssembler<'a> {
    pub fn new(config: &'a PackConfig, tree: &'a SourceTree, options: &'a BuildOptions) -> Self {
        Self {
            config,
            tree,
            options,
        }
    }

    /// Formats selected for this run, highest identifier first.
    pub fn selected_formats(&self) -> Vec<(u32, &'a str)> {
        self.config
            .formats_desc()
            .filter(|(id, _)| self.options.format_filter.map_or(true, |f| f == *id))
            .collect()
    }

    /// Scales selected for this run, highest first. `None` when vector
    /// processing is disabled.
    pub fn selected_scales(&self) -> Option<Vec<(u32, u32)>> {
        let settings = self.config.vector.settings()?;
        Some(
            settings
                .scales_desc()
                .filter(|(scale, _)| {
                    self.options.scale_filter.is_empty()
                        || self.options.scale_filter.contains(scale)
                })
                .collect(),
        )
    }

    /// Exclusion then merge for one format.
    pub fn resolve(&self, spec: &FormatSpec, report: &mut Report) -> FileSet {
        log::info!("Resolving format {} ({})", spec.id, spec.label);

        let missing = unmatched(self.tree.files(), &spec.exclusions);
        if !missing.is_empty() {
            report.warning(
                codes::EXCLUSION_UNMATCHED,
                format!(
                    "Format {}: {} exclusion(s) matched nothing: {}",
                    spec.id,
                    missing.len(),
                    missing.join(", ")
                ),
            );
        }
        let filtered = exclude(self.tree.files(), &spec.exclusions);

        let merged = merge(filtered, self.tree, spec.overlay_root.as_deref());
        if !merged.collisions.is_empty() {
            report.warning(
                codes::INCLUSION_COLLISION,
                format!(
                    "Format {}: kept {} existing file(s) over its overlay: {}",
                    spec.id,
                    merged.collisions.len(),
                    merged.collisions.join(", ")
                ),
            );
        }

        merged.files
    }

    /// Keep only `assets/` and the allowed top-level paths.
    fn packable(&self, files: FileSet) -> FileSet {
        files
            .into_iter()
            .filter(|entry| {
                is_under(&entry.path, ASSETS_DIR)
                    || self
                        .config
                        .allowed_paths
                        .iter()
                        .any(|allowed| is_under(&entry.path, allowed))
            })
            .collect()
    }

    /// Resolve every selected combination, handing each to `emit` in order.
    ///
    /// Returns the number of builds emitted. A malformed exclusion list or
    /// manifest template fails the run before anything is emitted. An error
    /// from `emit` stops the run and is returned as is.
    pub fn run<F>(&self, report: &mut Report, mut emit: F) -> Result<usize>
    where
        F: FnMut(BuildResult, &mut Report) -> Result<()>,
    {
        let formats = self.selected_formats();
        if let Some(filter) = self.options.format_filter {
            if formats.is_empty() {
                let configured: Vec<String> =
                    self.config.formats_desc().map(|(id, _)| id.to_string()).collect();
                report.push(
                    Diagnostic::warning(
                        codes::BUILD_EMPTY,
                        format!("No configured format matches --format {}", filter),
                    )
                    .with_help(format!("Configured formats: {}", configured.join(", "))),
                );
                return Ok(0);
            }
        }

        let scales = self.selected_scales();
        match (&scales, &self.config.vector) {
            (None, _) if !self.options.scale_filter.is_empty() => {
                report.push(
                    Diagnostic::warning(
                        codes::FILTER_IGNORED,
                        "--scale has no effect without process_svg_images",
                    )
                    .with_help("Set process_svg_images: true and configure scales"),
                );
            }
            (Some(_), VectorMode::Enabled(settings)) => {
                for scale in &self.options.scale_filter {
                    if !settings.scales.contains_key(scale) {
                        report.warning(
                            codes::BUILD_EMPTY,
                            format!("No configured scale matches --scale {}", scale),
                        );
                    }
                }
            }
            _ => {}
        }
        if scales.as_ref().is_some_and(|s| s.is_empty()) {
            return Ok(0);
        }

        let recolour = match (&self.options.theme, self.config.vector.settings()) {
            (Some(theme), Some(settings)) => Some(theme.plan(&settings.default_colors)),
            _ => None,
        };

        // Exclusion lists and manifests are all checked before the first
        // build leaves the assembler.
        let mut plans = Vec::with_capacity(formats.len());
        for (id, label) in formats {
            let spec = FormatSpec::from_source(id, label, self.tree)?;
            let builds = match &scales {
                None => vec![(None, self.manifest(id, None)?)],
                Some(scales) => scales
                    .iter()
                    .map(|&(scale, dpi)| Ok((Some((scale, dpi)), self.manifest(id, Some(scale))?)))
                    .collect::<Result<Vec<_>>>()?,
            };
            plans.push((spec, builds));
        }

        let mut count = 0;
        for (spec, builds) in plans {
            let resolved = self.packable(self.resolve(&spec, report));
            report.stats.formats_processed += 1;

            for (scale, manifest) in builds {
                let files = match scale {
                    Some((_, dpi)) => self.scaled(resolved.clone(), dpi, recolour.as_ref(), report),
                    None => resolved.clone(),
                };
                let build = self.finish(&spec, scale, files, manifest, report);
                emit(build, report)?;
                count += 1;
            }
        }

        Ok(count)
    }

    fn scaled(
        &self,
        files: FileSet,
        dpi: u32,
        recolour: Option<&Recolour>,
        report: &mut Report,
    ) -> FileSet {
        let files = match recolour {
            Some(recolour) => recolour.apply_to_set(files, report),
            None => files,
        };
        rasterize_set(files, dpi, report)
    }

    fn manifest(&self, format: u32, scale: Option<u32>) -> Result<String> {
        Manifest::for_build(self.config, format, &self.options.packver, scale).render(self.tree)
    }

    fn finish(
        &self,
        spec: &FormatSpec,
        scale: Option<(u32, u32)>,
        mut files: FileSet,
        manifest: String,
        report: &mut Report,
    ) -> BuildResult {
        if let Some((scale, _)) = scale {
            if let Some(icon) = self.tree.get(&format!("scale_{}.png", scale)) {
                files.insert(icon.relocated(ICON_PATH));
            }
        }

        let build = BuildResult {
            format: spec.id,
            label: spec.label.clone(),
            packver: self.options.packver.clone(),
            scale: scale.map(|(s, _)| s),
            dpi: scale.map(|(_, d)| d),
            files,
            manifest,
        };

        if build.files.is_empty() {
            report.warning(
                codes::BUILD_EMPTY,
                format!("{} has no files besides {}", build.describe(), MANIFEST_PATH),
            );
        }

        build
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::PathEntry;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    const ICON_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="96" height="96">
  <rect width="96" height="96" fill="#ff0000"/>
</svg>"##;

    fn tree(entries: &[(&str, &str)]) -> SourceTree {
        let files: FileSet = entries
            .iter()
            .map(|(p, c)| PathEntry::new(*p, c.as_bytes().to_vec()))
            .collect();
        SourceTree::from_files("src", files)
    }

    fn collect(
        config: &PackConfig,
        tree: &SourceTree,
        options: &BuildOptions,
    ) -> (Vec<BuildResult>, Report) {
        let mut report = Report::new();
        let mut builds = Vec::new();
        PackAssembler::new(config, tree, options)
            .run(&mut report, |build, _| {
                builds.push(build);
                Ok(())
            })
            .unwrap();
        (builds, report)
    }

    fn paths(set: &FileSet) -> Vec<&str> {
        set.paths().collect()
    }

    fn plain_config() -> PackConfig {
        PackConfig::parse(
            "name: Flat\ndescription: Flat pack\nformats: {63: '1.21.4', 34: '1.21', 18: '1.20.2'}",
            Path::new("."),
        )
        .unwrap()
    }

    fn vector_config() -> PackConfig {
        PackConfig::parse(
            "name: Flat\nformats: {34: '1.21'}\nprocess_svg_images: true\nscales: {1: 24, 2: 48}\ndefault_colors: {red: '#ff0000'}",
            Path::new("."),
        )
        .unwrap()
    }

    #[test]
    fn test_formats_in_descending_order() {
        let tree = tree(&[("assets/a.png", "a")]);
        let (builds, report) = collect(&plain_config(), &tree, &BuildOptions::default());

        let order: Vec<u32> = builds.iter().map(|b| b.format).collect();
        assert_eq!(order, vec![63, 34, 18]);
        assert_eq!(report.stats.formats_processed, 3);
    }

    #[test]
    fn test_exclusion_scenario() {
        let tree = tree(&[
            ("assets/a.png", "a"),
            ("assets/b.png", "b"),
            ("18.json", r#"["assets/b.png"]"#),
        ]);
        let (builds, _) = collect(&plain_config(), &tree, &BuildOptions::default());

        let format_18 = builds.iter().find(|b| b.format == 18).unwrap();
        assert_eq!(paths(&format_18.files), vec!["assets/a.png"]);

        // Exclusions never leak into other formats.
        let format_34 = builds.iter().find(|b| b.format == 34).unwrap();
        assert_eq!(paths(&format_34.files), vec!["assets/a.png", "assets/b.png"]);
    }

    #[test]
    fn test_overlay_scenario() {
        let tree = tree(&[
            ("assets/a.png", "original"),
            ("34/assets/a.png", "overlay"),
            ("34/assets/new.png", "new"),
        ]);
        let (builds, report) = collect(&plain_config(), &tree, &BuildOptions::default());

        let format_34 = builds.iter().find(|b| b.format == 34).unwrap();
        assert_eq!(&*format_34.files.get("assets/a.png").unwrap().content, b"original");
        assert_eq!(paths(&format_34.files), vec!["assets/a.png", "assets/new.png"]);
        assert!(report.diagnostics.has_code(codes::INCLUSION_COLLISION));

        let format_63 = builds.iter().find(|b| b.format == 63).unwrap();
        assert!(!format_63.files.contains("assets/new.png"));
    }

    #[test]
    fn test_control_files_are_not_packed() {
        let tree = tree(&[
            ("assets/a.png", "a"),
            ("18.json", "[]"),
            ("notes.txt", "private"),
            ("credits.txt", "thanks"),
        ]);
        let config = PackConfig::parse(
            "name: Flat\nformats: {18: '1.20.2'}\nallowed_paths: [credits.txt]",
            Path::new("."),
        )
        .unwrap();
        let (builds, _) = collect(&config, &tree, &BuildOptions::default());

        assert_eq!(paths(&builds[0].files), vec!["assets/a.png", "credits.txt"]);
    }

    #[test]
    fn test_scale_and_theme_scenario() {
        let tree = tree(&[
            ("assets/icon.svg", ICON_SVG),
            ("scale_1.png", "small"),
            ("scale_2.png", "large"),
        ]);
        let options = BuildOptions {
            theme: Some(Theme::new("nord", [("red", "#BF616A")]).unwrap()),
            scale_filter: vec![2],
            ..BuildOptions::default()
        };
        let (builds, report) = collect(&vector_config(), &tree, &options);

        assert_eq!(builds.len(), 1);
        let build = &builds[0];
        assert_eq!((build.scale, build.dpi), (Some(2), Some(48)));
        assert_eq!(paths(&build.files), vec!["assets/icon.png", "pack.png"]);
        assert_eq!(&*build.files.get(ICON_PATH).unwrap().content, b"large");

        let png = image::load_from_memory(&build.files.get("assets/icon.png").unwrap().content)
            .unwrap()
            .to_rgba8();
        assert_eq!((png.width(), png.height()), (48, 48));
        assert_eq!(png.get_pixel(24, 24).0, [0xbf, 0x61, 0x6a, 255]);

        assert_eq!(report.stats.svg_files_themed.len(), 1);
        assert_eq!(report.stats.png_files_generated.len(), 1);
    }

    #[test]
    fn test_scales_in_descending_order() {
        let tree = tree(&[("assets/icon.svg", ICON_SVG)]);
        let (builds, _) = collect(&vector_config(), &tree, &BuildOptions::default());

        let scales: Vec<Option<u32>> = builds.iter().map(|b| b.scale).collect();
        assert_eq!(scales, vec![Some(2), Some(1)]);
        // Each scale renders from its own copy of the resolved set.
        assert!(builds.iter().all(|b| b.files.contains("assets/icon.png")));
    }

    #[test]
    fn test_vector_stats_count_each_path_once() {
        let tree = tree(&[("assets/icon.svg", ICON_SVG)]);
        let options = BuildOptions {
            theme: Some(Theme::new("nord", [("red", "#BF616A")]).unwrap()),
            ..BuildOptions::default()
        };
        let (builds, report) = collect(&vector_config(), &tree, &options);

        assert_eq!(builds.len(), 2);
        assert_eq!(
            report.stats.png_files_generated.iter().collect::<Vec<_>>(),
            vec!["assets/icon.png"]
        );
        assert_eq!(report.stats.svg_files_themed.len(), 1);
        // Replacements are summed over both scales.
        assert_eq!(report.stats.theme_color_edits.values().sum::<usize>(), 2);
    }

    #[test]
    fn test_unmatched_exclusion_is_recorded() {
        let tree = tree(&[("assets/a.png", "a"), ("18.json", r#"["assets/gone.png"]"#)]);
        let (builds, report) = collect(&plain_config(), &tree, &BuildOptions::default());

        assert_eq!(builds.len(), 3);
        let recorded: Vec<&Diagnostic> = report
            .diagnostics
            .iter()
            .filter(|d| d.code == codes::EXCLUSION_UNMATCHED)
            .collect();
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0].message.contains("Format 18"));
        assert!(recorded[0].message.contains("assets/gone.png"));
        assert!(!report.diagnostics.has_errors());
    }

    #[test]
    fn test_malformed_exclusion_list_fails_before_any_build() {
        let tree = tree(&[("assets/a.png", "a"), ("18.json", "{not json")]);
        let config = plain_config();
        let options = BuildOptions::default();
        let mut report = Report::new();
        let mut emitted = Vec::new();

        let result = PackAssembler::new(&config, &tree, &options).run(&mut report, |build, _| {
            emitted.push(build.format);
            Ok(())
        });

        assert!(matches!(result, Err(crate::error::PackError::Config { .. })));
        assert!(emitted.is_empty());
        assert_eq!(report.stats.formats_processed, 0);
    }

    #[test]
    fn test_invalid_template_fails_before_any_build() {
        let tree = tree(&[
            ("assets/icon.svg", ICON_SVG),
            ("pack.json", r#"{"pack": {"description": {description}}}"#),
        ]);
        let config = vector_config();
        let options = BuildOptions::default();
        let mut report = Report::new();
        let mut emitted = 0;

        let result = PackAssembler::new(&config, &tree, &options).run(&mut report, |_, _| {
            emitted += 1;
            Ok(())
        });

        assert!(matches!(result, Err(crate::error::PackError::Config { .. })));
        assert_eq!(emitted, 0);
        assert!(report.stats.png_files_generated.is_empty());
    }

    #[test]
    fn test_unmatched_format_filter() {
        let tree = tree(&[("assets/a.png", "a")]);
        let options = BuildOptions {
            format_filter: Some(99),
            ..BuildOptions::default()
        };
        let (builds, report) = collect(&plain_config(), &tree, &options);

        assert!(builds.is_empty());
        assert!(report.diagnostics.has_code(codes::BUILD_EMPTY));
        assert!(!report.diagnostics.has_errors());
    }

    #[test]
    fn test_unmatched_scale_filter() {
        let tree = tree(&[("assets/icon.svg", ICON_SVG)]);
        let options = BuildOptions {
            scale_filter: vec![3],
            ..BuildOptions::default()
        };
        let (builds, report) = collect(&vector_config(), &tree, &options);

        assert!(builds.is_empty());
        assert!(report.diagnostics.has_code(codes::BUILD_EMPTY));
    }

    #[test]
    fn test_scale_filter_ignored_without_vectors() {
        let tree = tree(&[("assets/a.png", "a")]);
        let options = BuildOptions {
            scale_filter: vec![2],
            ..BuildOptions::default()
        };
        let (builds, report) = collect(&plain_config(), &tree, &options);

        assert_eq!(builds.len(), 3);
        assert!(report.diagnostics.has_code(codes::FILTER_IGNORED));
    }

    #[test]
    fn test_empty_build_is_warning() {
        let tree = tree(&[("assets/a.png", "a"), ("18.json", r#"["assets"]"#)]);
        let options = BuildOptions {
            format_filter: Some(18),
            ..BuildOptions::default()
        };
        let (builds, report) = collect(&plain_config(), &tree, &options);

        assert_eq!(builds.len(), 1);
        assert!(builds[0].files.is_empty());
        assert!(report.diagnostics.has_code(codes::BUILD_EMPTY));
    }

    #[test]
    fn test_manifest_per_build() {
        let tree = tree(&[("assets/a.png", "a")]);
        let (builds, _) = collect(&plain_config(), &tree, &BuildOptions::default());

        let manifest: serde_json::Value = serde_json::from_str(&builds[1].manifest).unwrap();
        assert_eq!(manifest["pack"]["pack_format"], 34);
        assert_eq!(manifest["pack"]["supported_formats"], serde_json::json!([19, 34]));
    }

    #[test]
    fn test_archive_path() {
        let mut build = BuildResult {
            format: 34,
            label: "1.21".to_string(),
            packver: "v1".to_string(),
            scale: None,
            dpi: None,
            files: FileSet::new(),
            manifest: String::new(),
        };
        assert_eq!(build.archive_path("Flat"), PathBuf::from("Flat-v1-1.21.zip"));

        build.scale = Some(2);
        assert_eq!(
            build.archive_path("Flat"),
            PathBuf::from("34").join("Flat-v1-1.21-scale-2.zip")
        );
    }

    #[test]
    fn test_emit_error_stops_run() {
        let tree = tree(&[("assets/a.png", "a")]);
        let config = plain_config();
        let options = BuildOptions::default();
        let mut report = Report::new();
        let mut seen = 0;

        let result = PackAssembler::new(&config, &tree, &options).run(&mut report, |_, _| {
            seen += 1;
            Err(crate::error::PackError::Write {
                path: PathBuf::from("out.zip"),
                message: "disk full".to_string(),
            })
        });

        assert!(result.is_err());
        assert_eq!(seen, 1);
    }
}
