/*
 *  display/image.rs
 *
 *  rascode - triple screen status panels
 *  (c) 2025-26 rascode contributors
 *
 *  Pixmap scaling and colour conversion for panel pushes
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

use embedded_graphics::pixelcolor::{BinaryColor, Rgb565, Rgb888, RgbColor};
use tiny_skia::{Color, FilterQuality, Pixmap, PixmapPaint, Transform};

use crate::display::error::DisplayError;

/// Stretch `src` onto a `width` x `height` canvas composited over black.
pub fn fit_pixmap(src: &Pixmap, width: u32, height: u32) -> Result<Pixmap, DisplayError> {
    let mut dst = Pixmap::new(width, height)
        .ok_or_else(|| DisplayError::Image(format!("cannot allocate {}x{} pixmap", width, height)))?;
    dst.fill(Color::BLACK);

    let sx = width as f32 / src.width() as f32;
    let sy = height as f32 / src.height() as f32;
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..Default::default()
    };
    dst.draw_pixmap(0, 0, src.as_ref(), &paint, Transform::from_scale(sx, sy), None);
    Ok(dst)
}

// premultiplied over an opaque black canvas, so rgb can be taken as is
fn rgb888(pixmap: &Pixmap) -> impl Iterator<Item = Rgb888> + '_ {
    pixmap
        .pixels()
        .iter()
        .map(|p| Rgb888::new(p.red(), p.green(), p.blue()))
}

pub fn to_rgb565(pixmap: &Pixmap) -> impl Iterator<Item = Rgb565> + '_ {
    rgb888(pixmap).map(Rgb565::from)
}

/// Threshold on Rec.601 luma.
pub fn to_binary(pixmap: &Pixmap) -> impl Iterator<Item = BinaryColor> + '_ {
    rgb888(pixmap).map(|c| {
        let luma = (299 * c.r() as u32 + 587 * c.g() as u32 + 114 * c.b() as u32) / 1000;
        BinaryColor::from(luma >= 128)
    })
}
