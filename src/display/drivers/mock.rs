/*
 *  display/drivers/mock.rs
 *
 *  rascode - triple screen status panels
 *  (c) 2025-26 rascode contributors
 *
 *  Mock display driver for running without hardware
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

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use tiny_skia::Pixmap;

use crate::config::{LcdConfig, OledConfig};
use crate::display::error::DisplayError;
use crate::display::image::{fit_pixmap, to_binary};
use crate::display::text::{draw_lines, font_for, truncate_chars};
use crate::display::traits::{AdapterState, ColorDepth, DisplayCapabilities, DisplayDriver};
use crate::vframebuf::VarFrameBuf;

use log::debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Mock display driver
///
/// Simulates a panel against an in-memory framebuffer. Used by the `mock`
/// backend (the default under `RASCODE_ENV=test`), by unit and integration
/// tests, and for development away from the Pi.
///
/// Every operation is recorded in a shared [`MockDriverState`] so the state
/// handle can be kept after the driver has been boxed and handed over.
#[derive(Debug, Clone)]
pub struct MockDriver {
    name: String,

    /// Framebuffer for drawing operations
    framebuffer: VarFrameBuf<BinaryColor>,

    capabilities: DisplayCapabilities,

    /// Shared state for inspection
    state: Arc<Mutex<MockDriverState>>,
}

/// Internal state for the mock driver (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockDriverState {
    /// Number of times init() succeeded
    pub init_count: usize,

    /// Number of frames pushed
    pub flush_count: usize,

    /// Number of effective clear() calls
    pub clear_count: usize,

    /// Number of images shown
    pub image_count: usize,

    pub lifecycle: AdapterState,

    /// Lines visible after the last show_lines (post drop/truncate)
    pub last_lines: Vec<String>,

    /// Simulate failures (for error testing)
    pub simulate_flush_failure: bool,
    pub simulate_init_failure: bool,
}

impl MockDriver {
    /// Create a mock panel with explicit geometry
    pub fn new(
        name: &str,
        width: u32,
        height: u32,
        color_depth: ColorDepth,
        max_chars: usize,
    ) -> Self {
        let capabilities = DisplayCapabilities {
            width,
            height,
            color_depth,
            max_chars,
            supports_image: color_depth == ColorDepth::Rgb565,
        };

        Self {
            name: name.to_string(),
            framebuffer: VarFrameBuf::new(width, height, BinaryColor::Off),
            capabilities,
            state: Arc::new(Mutex::new(MockDriverState::default())),
        }
    }

    /// Stand-in for the ST7789 main screen
    pub fn lcd(config: &LcdConfig) -> Self {
        let (w, h) = rotated(config.width, config.height, config.rotate_deg);
        Self::new("mock-lcd", w, h, ColorDepth::Rgb565, config.max_chars)
    }

    /// Stand-in for one SSD1306 OLED
    pub fn oled(name: &str, config: &OledConfig) -> Self {
        let (w, h) = rotated(config.width, config.height, config.rotate_deg);
        let max_chars = (w / 6) as usize;
        Self::new(name, w, h, ColorDepth::Monochrome, max_chars)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get reference to state for inspection
    pub fn state(&self) -> Arc<Mutex<MockDriverState>> {
        Arc::clone(&self.state)
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Option<BinaryColor> {
        self.framebuffer.get(x, y)
    }

    /// Count number of pixels set to On
    pub fn count_on_pixels(&self) -> usize {
        self.framebuffer.count_lit()
    }

    fn lock(&self) -> MutexGuard<'_, MockDriverState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        let mut state = self.lock();
        if state.simulate_flush_failure {
            return Err(DisplayError::Render(format!("{}: simulated flush failure", self.name)));
        }
        state.flush_count += 1;
        Ok(())
    }

    fn ensure_ready(&self) -> Result<(), DisplayError> {
        match self.lock().lifecycle {
            AdapterState::Ready => Ok(()),
            _ => Err(DisplayError::NotInitialized),
        }
    }
}

fn rotated(width: u32, height: u32, rotate_deg: u16) -> (u32, u32) {
    match rotate_deg {
        90 | 270 => (height, width),
        _ => (width, height),
    }
}

impl DisplayDriver for MockDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn adapter_state(&self) -> AdapterState {
        self.lock().lifecycle
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        {
            let mut state = self.lock();
            if state.simulate_init_failure {
                return Err(DisplayError::DeviceAccess(format!("{}: simulated init failure", self.name)));
            }
            state.init_count += 1;
            state.lifecycle = AdapterState::Ready;
        }
        debug!("{} initialized ({}x{})", self.name, self.capabilities.width, self.capabilities.height);
        self.clear()
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        {
            let mut state = self.lock();
            if state.lifecycle != AdapterState::Ready {
                return Ok(());
            }
            state.clear_count += 1;
            state.last_lines.clear();
        } // release lock before flush

        self.framebuffer.reset();
        self.flush()
    }

    fn show_lines(&mut self, lines: &[String], line_height: u32) -> Result<(), DisplayError> {
        self.ensure_ready()?;

        self.framebuffer.reset();
        let font = font_for(&self.capabilities);
        let max_chars = self.capabilities.max_chars;
        let drawn = draw_lines(&mut self.framebuffer, lines, line_height, max_chars, font, BinaryColor::On)
            .map_err(|e| DisplayError::Render(format!("{:?}", e)))?;

        self.lock().last_lines = lines[..drawn]
            .iter()
            .map(|l| truncate_chars(l, max_chars).to_string())
            .collect();
        self.flush()
    }

    fn show_image(&mut self, image: &Pixmap) -> Result<(), DisplayError> {
        if !self.capabilities.supports_image {
            return Err(DisplayError::UnsupportedOperation);
        }
        self.ensure_ready()?;

        let fitted = fit_pixmap(image, self.capabilities.width, self.capabilities.height)?;
        let area = self.framebuffer.bounds();
        self.framebuffer
            .fill_contiguous(&area, to_binary(&fitted))
            .map_err(|e| DisplayError::Render(format!("{:?}", e)))?;

        {
            let mut state = self.lock();
            state.image_count += 1;
            state.last_lines.clear();
        }
        self.flush()
    }

    fn shutdown(&mut self) -> Result<(), DisplayError> {
        let cleared = self.clear();
        self.lock().lifecycle = AdapterState::ShutDown;
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_mock_driver_creation() {
        let driver = MockDriver::oled("left", &OledConfig::default());
        assert_eq!(driver.dimensions(), (128, 64));
        assert_eq!(driver.capabilities().max_chars, 21);
        assert!(!driver.capabilities().supports_image);
        assert_eq!(driver.adapter_state(), AdapterState::Uninitialized);
        assert_eq!(driver.count_on_pixels(), 0);
    }

    #[test]
    fn test_mock_driver_init() {
        let mut driver = MockDriver::lcd(&LcdConfig::default());
        let state = driver.state();

        driver.init().unwrap();

        assert_eq!(state.lock().unwrap().init_count, 1);
        assert!(driver.is_ready());
    }

    #[test]
    fn test_show_lines_requires_init() {
        let mut driver = MockDriver::oled("left", &OledConfig::default());
        let err = driver.show_lines(&lines(&["x"]), 10).unwrap_err();
        assert!(matches!(err, DisplayError::NotInitialized));
    }

    #[test]
    fn test_clear_before_init_is_noop() {
        let mut driver = MockDriver::oled("left", &OledConfig::default());
        driver.clear().unwrap();
        assert_eq!(driver.state().lock().unwrap().clear_count, 0);
        assert_eq!(driver.state().lock().unwrap().flush_count, 0);
    }

    #[test]
    fn test_show_lines_draws_and_records() {
        let mut driver = MockDriver::oled("left", &OledConfig::default());
        driver.init().unwrap();
        driver
            .show_lines(&lines(&["CPU:  12.5%", "this line is definitely longer than the budget"]), 10)
            .unwrap();

        assert!(driver.count_on_pixels() > 0);
        let state = driver.state();
        let state = state.lock().unwrap();
        assert_eq!(state.last_lines[0], "CPU:  12.5%");
        assert_eq!(state.last_lines[1].chars().count(), 21);
    }

    #[test]
    fn test_shutdown_clears_and_stops() {
        let mut driver = MockDriver::oled("right", &OledConfig::default());
        driver.init().unwrap();
        driver.show_lines(&lines(&["hello"]), 10).unwrap();
        driver.shutdown().unwrap();

        assert_eq!(driver.count_on_pixels(), 0);
        assert_eq!(driver.adapter_state(), AdapterState::ShutDown);
        assert!(driver.show_lines(&lines(&["again"]), 10).is_err());
    }

    #[test]
    fn test_simulated_failures() {
        let mut driver = MockDriver::lcd(&LcdConfig::default());
        driver.state().lock().unwrap().simulate_init_failure = true;
        assert!(matches!(driver.init(), Err(DisplayError::DeviceAccess(_))));

        driver.state().lock().unwrap().simulate_init_failure = false;
        driver.init().unwrap();
        driver.state().lock().unwrap().simulate_flush_failure = true;
        assert!(matches!(driver.show_lines(&lines(&["x"]), 14), Err(DisplayError::Render(_))));
    }

    #[test]
    fn test_rotation_swaps_geometry() {
        let cfg = LcdConfig { rotate_deg: 90, ..Default::default() };
        let driver = MockDriver::lcd(&cfg);
        assert_eq!(driver.dimensions(), (320, 240));
    }
}
