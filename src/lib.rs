//! respack - Resourcepack builder
//!
//! A library for building resourcepack archives for many game-version
//! formats from one shared source tree, with per-format exclusions and
//! overlays, and optional theming and rasterizing of vector assets.

pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod source;
pub mod types;

pub use archive::{build_archive, ArchiveWriter, DiskWriter, DryRunWriter, License};
pub use config::{PackConfig, VectorMode, VectorSettings};
pub use error::{PackError, Result};
pub use pipeline::{
    exclude, merge, rasterize, BuildOptions, BuildResult, FormatSpec, Manifest, PackAssembler,
    Recolour, Theme,
};
pub use report::{Diagnostic, Diagnostics, Report, Severity, Stats};
pub use source::{ContentKind, FileSet, PathEntry, SourceTree};
pub use types::Colour;
