//! Vector-to-raster conversion.
//!
//! Vector assets are parsed with usvg, rendered with resvg and encoded as
//! PNG with the `image` crate. Output depends only on the input bytes and
//! the target DPI.

use std::io::Cursor;

use image::{ImageBuffer, ImageFormat, Rgba, RgbaImage};
use resvg::{tiny_skia, usvg};

use crate::error::{PackError, Result};
use crate::report::{codes, Report};
use crate::source::{ContentKind, FileSet, PathEntry};

/// DPI at which a vector's intrinsic size is expressed.
pub const BASE_DPI: f32 = 96.0;

/// Largest edge, in pixels, a rasterized image may have.
const MAX_EDGE: u32 = 16_384;

/// Render an SVG document to PNG bytes at `dpi`.
///
/// The output size is the document's intrinsic size scaled by
/// `dpi / 96`, rounded down and at least one pixel per edge.
pub fn rasterize(path: &str, svg: &[u8], dpi: u32) -> Result<Vec<u8>> {
    let conversion_error = |message: String| PackError::AssetConversion {
        path: path.to_string(),
        message,
    };

    let options = usvg::Options::default();
    let tree = usvg::Tree::from_data(svg, &options)
        .map_err(|e| conversion_error(format!("invalid SVG: {}", e)))?;

    let size = tree.size();
    let factor = dpi as f32 / BASE_DPI;
    let width = ((size.width() * factor).floor() as u32).max(1);
    let height = ((size.height() * factor).floor() as u32).max(1);

    if width > MAX_EDGE || height > MAX_EDGE {
        return Err(conversion_error(format!(
            "target size {}x{} exceeds {}px",
            width, height, MAX_EDGE
        )));
    }

    log::trace!(
        "    {}: {}x{} -> {}x{}px at {} DPI",
        path,
        size.width(),
        size.height(),
        width,
        height,
        dpi
    );

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| conversion_error(format!("cannot allocate {}x{} pixmap", width, height)))?;
    let transform = tiny_skia::Transform::from_scale(
        width as f32 / size.width(),
        height as f32 / size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    encode_png(&pixmap).map_err(conversion_error)
}

/// Encode a premultiplied pixmap as a straight-alpha PNG.
fn encode_png(pixmap: &tiny_skia::Pixmap) -> std::result::Result<Vec<u8>, String> {
    let mut img: RgbaImage = ImageBuffer::new(pixmap.width(), pixmap.height());
    for (src, dst) in pixmap.pixels().iter().zip(img.pixels_mut()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }

    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| format!("failed to encode PNG: {}", e))?;
    Ok(bytes)
}

/// Path of the raster image produced from a vector asset.
pub fn raster_path(svg_path: &str) -> String {
    let stem = svg_path
        .len()
        .checked_sub(4)
        .filter(|&i| svg_path.is_char_boundary(i) && svg_path[i..].eq_ignore_ascii_case(".svg"))
        .map_or(svg_path, |i| &svg_path[..i]);
    format!("{}.png", stem)
}

/// Replace every vector asset in `files` with its rasterization at `dpi`.
///
/// A vector that fails to convert is dropped and recorded; the rest of the
/// set is unaffected. A raster path that already exists keeps its file.
pub fn rasterize_set(mut files: FileSet, dpi: u32, report: &mut Report) -> FileSet {
    let vectors: Vec<String> = files
        .iter()
        .filter(|e| e.kind == ContentKind::VectorImage)
        .map(|e| e.path.clone())
        .collect();

    for path in vectors {
        let Some(entry) = files.remove(&path) else {
            continue;
        };

        let png = match rasterize(&path, &entry.content, dpi) {
            Ok(png) => png,
            Err(e) => {
                report.warning(codes::RASTER_PARSE, e.to_string());
                continue;
            }
        };

        let target = raster_path(&path);
        if files.insert_new(PathEntry::new(target.clone(), png)) {
            log::trace!("    Created PNG ({} DPI): {}", dpi, target);
            report.stats.png_files_generated.insert(target);
        } else {
            report.warning(
                codes::RASTER_COLLISION,
                format!("{} already exists; keeping it over the render of {}", target, path),
            );
        }
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED_RECT: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="96" height="48">
  <rect width="96" height="48" fill="#ff0000"/>
</svg>"##;

    fn decode(png: &[u8]) -> RgbaImage {
        image::load_from_memory(png).unwrap().to_rgba8()
    }

    #[test]
    fn test_rasterize_scales_by_dpi() {
        let img = decode(&rasterize("a.svg", RED_RECT.as_bytes(), 48).unwrap());
        assert_eq!(img.width(), 48);
        assert_eq!(img.height(), 24);
        assert_eq!(img.get_pixel(10, 10).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_rasterize_base_dpi_is_intrinsic_size() {
        let img = decode(&rasterize("a.svg", RED_RECT.as_bytes(), 96).unwrap());
        assert_eq!((img.width(), img.height()), (96, 48));
    }

    #[test]
    fn test_rasterize_tiny_dpi_is_at_least_one_pixel() {
        let img = decode(&rasterize("a.svg", RED_RECT.as_bytes(), 1).unwrap());
        assert_eq!((img.width(), img.height()), (1, 1));
    }

    #[test]
    fn test_rasterize_is_deterministic() {
        let a = rasterize("a.svg", RED_RECT.as_bytes(), 24).unwrap();
        let b = rasterize("a.svg", RED_RECT.as_bytes(), 24).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rasterize_malformed() {
        let err = rasterize("bad.svg", b"<svg", 24).unwrap_err();
        assert!(matches!(err, PackError::AssetConversion { ref path, .. } if path == "bad.svg"));
    }

    #[test]
    fn test_raster_path() {
        assert_eq!(raster_path("assets/icon.svg"), "assets/icon.png");
        assert_eq!(raster_path("assets/ICON.SVG"), "assets/ICON.png");
    }

    #[test]
    fn test_rasterize_set_skips_bad_assets() {
        let mut files = FileSet::new();
        files.insert(PathEntry::new("assets/good.svg", RED_RECT.as_bytes().to_vec()));
        files.insert(PathEntry::new("assets/bad.svg", b"<svg".to_vec()));
        files.insert(PathEntry::new("assets/other.txt", b"keep".to_vec()));

        let mut report = Report::new();
        let out = rasterize_set(files, 24, &mut report);

        let paths: Vec<&str> = out.paths().collect();
        assert_eq!(paths, vec!["assets/good.png", "assets/other.txt"]);
        assert_eq!(report.stats.png_files_generated.len(), 1);
        assert!(report.diagnostics.has_code(codes::RASTER_PARSE));
    }

    #[test]
    fn test_rasterize_set_keeps_existing_png() {
        let mut files = FileSet::new();
        files.insert(PathEntry::new("assets/icon.svg", RED_RECT.as_bytes().to_vec()));
        files.insert(PathEntry::new("assets/icon.png", b"hand-drawn".to_vec()));

        let mut report = Report::new();
        let out = rasterize_set(files, 24, &mut report);

        assert_eq!(&*out.get("assets/icon.png").unwrap().content, b"hand-drawn");
        assert!(out.get("assets/icon.svg").is_none());
        assert!(report.diagnostics.has_code(codes::RASTER_COLLISION));
    }
}
