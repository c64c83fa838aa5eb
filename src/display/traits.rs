/*
 *  display/traits.rs
 *
 *  rascode - triple screen status panels
 *  (c) 2025-26 rascode contributors
 *
 *  Core trait definitions for display driver abstraction
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

use tiny_skia::Pixmap;

use crate::display::error::DisplayError;

/// Color depth capabilities of different display drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    /// Monochrome displays (1-bit per pixel)
    /// Used by: SSD1306, SSD1315
    Monochrome,

    /// 16-bit colour, 5-6-5
    /// Used by: ST7789
    Rgb565,
}

/// Display capabilities and metadata
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayCapabilities {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,

    /// Color depth (monochrome or RGB565)
    pub color_depth: ColorDepth,

    /// Characters that fit on one text line
    pub max_chars: usize,

    /// Whether `show_image` is accepted
    pub supports_image: bool,
}

/// Lifecycle of a driver instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdapterState {
    #[default]
    Uninitialized,
    Ready,
    ShutDown,
}

/// Minimal hardware abstraction - all display drivers must implement this trait
///
/// Construction only records configuration. All bus access happens in
/// [`DisplayDriver::init`], so a driver can be built on a machine without the
/// hardware and fail with a descriptive error later.
pub trait DisplayDriver: Send {
    /// Returns the capabilities of this display
    fn capabilities(&self) -> &DisplayCapabilities;

    /// Returns the display dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32) {
        let caps = self.capabilities();
        (caps.width, caps.height)
    }

    fn adapter_state(&self) -> AdapterState;

    fn is_ready(&self) -> bool {
        self.adapter_state() == AdapterState::Ready
    }

    /// Open the bus, construct the device handle, reset and clear.
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Fill with the background colour and flush.
    ///
    /// Does nothing before `init()`.
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Render text lines top to bottom, `line_height` pixels apart.
    ///
    /// Lines past the bottom edge are dropped and each line is cut to
    /// `max_chars` characters. Fails with `NotInitialized` before `init()`.
    fn show_lines(&mut self, lines: &[String], line_height: u32) -> Result<(), DisplayError>;

    /// Scale an RGBA raster to the panel and push it.
    fn show_image(&mut self, _image: &Pixmap) -> Result<(), DisplayError> {
        Err(DisplayError::UnsupportedOperation)
    }

    /// Clear the screen and stop accepting frames. The handle stays open.
    fn shutdown(&mut self) -> Result<(), DisplayError>;
}
