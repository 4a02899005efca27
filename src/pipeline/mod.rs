//! The build pipeline: per-format resolution, theming, rasterizing and
//! manifest generation.

pub mod assembler;
pub mod exclusion;
pub mod format;
pub mod inclusion;
pub mod manifest;
pub mod raster;
pub mod theme;

pub use assembler::{BuildOptions, BuildResult, PackAssembler, ICON_PATH};
pub use exclusion::exclude;
pub use format::FormatSpec;
pub use inclusion::{merge, Merged};
pub use manifest::{Manifest, MANIFEST_PATH};
pub use raster::{rasterize, rasterize_set};
pub use theme::{Recolour, Theme};
