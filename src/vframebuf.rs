/*
 *  vframebuf.rs
 *
 *  rascode - triple screen status panels
 *  (c) 2025-26 rascode contributors
 *
 *  Runtime-sized frame buffer shared by every display backend
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

use core::convert::Infallible;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::PixelColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// A runtime-sized framebuffer for embedded-graphics.
///
/// Panels of different geometry (240x320 RGB565, 128x64 mono) render text and
/// images here first; the owning driver then pushes the whole buffer in one go.
#[derive(Debug, Clone)]
pub struct VarFrameBuf<C: PixelColor> {
    buf: Vec<C>,
    w: usize,
    h: usize,
    background: C,
}

impl<C: PixelColor> VarFrameBuf<C> {
    pub fn new(width: u32, height: u32, background: C) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self { buf: vec![background; w * h], w, h, background }
    }

    pub fn width(&self) -> usize { self.w }
    pub fn height(&self) -> usize { self.h }

    /// Immutable raw access, row-major
    pub fn as_slice(&self) -> &[C] { &self.buf }

    pub fn as_mut_slice(&mut self) -> &mut [C] { &mut self.buf }

    /// Reset every pixel to the background colour.
    pub fn reset(&mut self) {
        self.buf.fill(self.background);
    }

    pub fn background(&self) -> C { self.background }

    pub fn get(&self, x: u32, y: u32) -> Option<C> {
        self.idx(Point::new(x as i32, y as i32)).map(|i| self.buf[i])
    }

    /// Pixels that differ from the background.
    pub fn count_lit(&self) -> usize {
        self.buf.iter().filter(|&&c| c != self.background).count()
    }

    /// Whole-screen area, for `fill_contiguous` pushes to the panel.
    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(Point::zero(), self.size())
    }

    /// Copied colours in scan order.
    pub fn pixels(&self) -> impl Iterator<Item = C> + '_ {
        self.buf.iter().copied()
    }

    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 {
            let (x, y) = (p.x as usize, p.y as usize);
            if x < self.w && y < self.h {
                return Some(y * self.w + x);
            }
        }
        None
    }
}

impl<C: PixelColor> OriginDimensions for VarFrameBuf<C> {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl<C: PixelColor> DrawTarget for VarFrameBuf<C> {
    type Color = C;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.buf.fill(color);
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        // colours arrive for the full area, clip each one individually
        let Size { width, height } = area.size;
        if width == 0 || height == 0 { return Ok(()); }

        let mut it = colors.into_iter();
        for row in 0..height as i32 {
            for col in 0..width as i32 {
                let Some(c) = it.next() else { return Ok(()) };
                let p = area.top_left + Point::new(col, row);
                if let Some(i) = self.idx(p) {
                    self.buf[i] = c;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::BinaryColor;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn test_out_of_bounds_pixels_are_ignored() {
        let mut fb = VarFrameBuf::new(4, 4, BinaryColor::Off);
        fb.draw_iter([
            Pixel(Point::new(-1, 0), BinaryColor::On),
            Pixel(Point::new(4, 0), BinaryColor::On),
            Pixel(Point::new(3, 3), BinaryColor::On),
        ]).unwrap();
        assert_eq!(fb.count_lit(), 1);
        assert_eq!(fb.get(3, 3), Some(BinaryColor::On));
        assert_eq!(fb.get(4, 4), None);
    }

    #[test]
    fn test_fill_contiguous_clips_at_edges() {
        let mut fb = VarFrameBuf::new(4, 4, BinaryColor::Off);
        // 3x3 block hanging off the bottom-right corner
        Rectangle::new(Point::new(2, 2), Size::new(3, 3))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut fb)
            .unwrap();
        assert_eq!(fb.count_lit(), 4);
        // nothing wrapped onto the next row
        assert_eq!(fb.get(0, 3), Some(BinaryColor::Off));
    }

    #[test]
    fn test_reset_restores_background() {
        let mut fb = VarFrameBuf::new(8, 2, BinaryColor::Off);
        fb.clear(BinaryColor::On).unwrap();
        assert_eq!(fb.count_lit(), 16);
        fb.reset();
        assert_eq!(fb.count_lit(), 0);
    }
}
