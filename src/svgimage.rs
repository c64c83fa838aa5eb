/*
 *  svgimage.rs
 *
 *  rascode - triple screen status panels
 *  (c) 2025-26 rascode contributors
 *
 *  SVG to RGBA raster for the main LCD
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

//! Rendering SVG documents to a `tiny_skia::Pixmap`.
//!
//! `usvg` (re-exported by `resvg`) parses, `resvg` rasterizes. The pixmap is
//! handed to `DisplayRegistry::show_main_image`, which scales and converts it
//! for the panel.

use std::fs;
use std::path::Path;

use log::debug;
use resvg::{
    render,
    usvg::{Options as ResvgUsvgOptions, Transform, Tree as ResvgTree},
};
use thiserror::Error;
use tiny_skia::{Color, Pixmap};

#[derive(Debug, Error)]
pub enum SvgImageError {
    #[error("SVG read error: {0}")]
    Io(#[from] std::io::Error),
    #[error("SVG parse error: {0}")]
    SvgParseError(String),
    #[error("Pixmap creation error: {0}")]
    PixmapCreationError(String),
}

/// Parsed SVG, rendered on demand at a target size.
#[derive(Debug)]
pub struct SvgImageRenderer {
    tree: ResvgTree,
}

impl SvgImageRenderer {
    pub fn new(svg_data: &str) -> Result<Self, SvgImageError> {
        let options = ResvgUsvgOptions::default();
        let tree = ResvgTree::from_str(svg_data, &options)
            .map_err(|e| SvgImageError::SvgParseError(format!("Failed to parse SVG: {:?}", e)))?;
        Ok(Self { tree })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SvgImageError> {
        let data = fs::read_to_string(path.as_ref())?;
        debug!("loaded {} ({} bytes)", path.as_ref().display(), data.len());
        Self::new(&data)
    }

    /// Intrinsic document size, rounded up.
    pub fn size(&self) -> (u32, u32) {
        let size = self.tree.size();
        (size.width().ceil() as u32, size.height().ceil() as u32)
    }

    /// Render stretched to `width` x `height` on a black background.
    pub fn render(&self, width: u32, height: u32) -> Result<Pixmap, SvgImageError> {
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            SvgImageError::PixmapCreationError(format!("invalid pixmap size {}x{}", width, height))
        })?;
        pixmap.fill(Color::BLACK);

        // viewBox origin offsets are already folded into the tree by usvg
        let svg_size = self.tree.size();
        let transform = Transform::from_scale(
            width as f32 / svg_size.width(),
            height as f32 / svg_size.height(),
        );
        render(&self.tree, transform, &mut pixmap.as_mut());
        Ok(pixmap)
    }
}

/// Load and render an SVG file in one step.
pub fn render_svg_file<P: AsRef<Path>>(path: P, width: u32, height: u32) -> Result<Pixmap, SvgImageError> {
    SvgImageRenderer::from_file(path)?.render(width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED_SQUARE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10">
        <rect x="0" y="0" width="10" height="10" fill="#ff0000"/>
    </svg>"##;

    #[test]
    fn test_render_scales_to_target() {
        let renderer = SvgImageRenderer::new(RED_SQUARE).unwrap();
        assert_eq!(renderer.size(), (10, 10));

        let pixmap = renderer.render(40, 20).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (40, 20));
        let center = pixmap.pixel(20, 10).unwrap();
        assert_eq!(center.red(), 255);
        assert_eq!(center.green(), 0);
    }

    #[test]
    fn test_invalid_svg() {
        assert!(matches!(
            SvgImageRenderer::new("<not-svg"),
            Err(SvgImageError::SvgParseError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            render_svg_file("/nonexistent/rascode.svg", 8, 8),
            Err(SvgImageError::Io(_))
        ));
    }

    #[test]
    fn test_zero_size_rejected() {
        let renderer = SvgImageRenderer::new(RED_SQUARE).unwrap();
        assert!(matches!(renderer.render(0, 10), Err(SvgImageError::PixmapCreationError(_))));
    }
}
