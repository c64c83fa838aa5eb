/*
 *  display/drivers/ssd1306.rs
 *
 *  rascode - triple screen status panels
 *  (c) 2025-26 rascode contributors
 *
 *  SSD1306/SSD1315 OLED display driver implementation
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

use linux_embedded_hal::I2cdev;
use ssd1306::{
    mode::BufferedGraphicsMode,
    prelude::*,
    size::{DisplaySize128x32, DisplaySize128x64},
    I2CDisplayInterface,
    Ssd1306,
};

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

use crate::config::OledConfig;
use crate::display::error::DisplayError;
use crate::display::text::{draw_lines, font_for};
use crate::display::traits::{AdapterState, ColorDepth, DisplayCapabilities, DisplayDriver};
use crate::vframebuf::VarFrameBuf;

use log::{debug, info};
use std::path::Path;

type OledHandle<SIZE> = Ssd1306<I2CInterface<I2cdev>, SIZE, BufferedGraphicsMode<SIZE>>;

/// Enum to handle different SSD1306 display sizes
enum Ssd1306Variants {
    Size128x64(OledHandle<DisplaySize128x64>),
    Size128x32(OledHandle<DisplaySize128x32>),
}

/// SSD1306 display driver wrapper
///
/// One instance per I2C address. The bus is opened in `init()`.
pub struct Ssd1306Driver {
    bus_path: String,
    address: u8,
    rotation: DisplayRotation,

    /// The underlying ssd1306 driver, present once initialized
    display: Option<Ssd1306Variants>,

    /// Framebuffer for drawing operations
    framebuffer: VarFrameBuf<BinaryColor>,

    capabilities: DisplayCapabilities,
    state: AdapterState,
}

impl Ssd1306Driver {
    /// Record configuration for the panel at `address` on the configured bus.
    ///
    /// No I/O happens here.
    pub fn new_i2c(address: u8, config: &OledConfig) -> Result<Self, DisplayError> {
        match (config.width, config.height) {
            (128, 64) | (128, 32) => {}
            (w, h) => {
                return Err(DisplayError::InvalidConfiguration(
                    format!("Unsupported SSD1306 size: {}x{}", w, h)
                ));
            }
        }

        let rotation = match config.rotate_deg {
            0 => DisplayRotation::Rotate0,
            90 => DisplayRotation::Rotate90,
            180 => DisplayRotation::Rotate180,
            270 => DisplayRotation::Rotate270,
            other => {
                return Err(DisplayError::InvalidConfiguration(
                    format!("Invalid rotation angle: {} (must be 0, 90, 180, or 270)", other)
                ));
            }
        };

        // the controller swaps axes for quarter turns
        let (width, height) = match rotation {
            DisplayRotation::Rotate90 | DisplayRotation::Rotate270 => (config.height, config.width),
            _ => (config.width, config.height),
        };

        let capabilities = DisplayCapabilities {
            width,
            height,
            color_depth: ColorDepth::Monochrome,
            max_chars: (width / 6) as usize,
            supports_image: false,
        };

        Ok(Self {
            bus_path: config.i2c_bus.clone(),
            address,
            rotation,
            display: None,
            framebuffer: VarFrameBuf::new(width, height, BinaryColor::Off),
            capabilities,
            state: AdapterState::Uninitialized,
        })
    }

    fn open(&self) -> Result<Ssd1306Variants, DisplayError> {
        if !Path::new(&self.bus_path).exists() {
            return Err(DisplayError::MissingDependency(format!(
                "{} not found, is the i2c-dev module loaded?",
                self.bus_path
            )));
        }

        let i2c = I2cdev::new(&self.bus_path)
            .map_err(|e| DisplayError::DeviceAccess(format!("Failed to open {}: {}", self.bus_path, e)))?;
        let interface = I2CDisplayInterface::new_custom_address(i2c, self.address);

        let display = if self.capabilities.width.max(self.capabilities.height) == 128
            && self.capabilities.width.min(self.capabilities.height) == 32
        {
            let mut display = Ssd1306::new(interface, DisplaySize128x32, self.rotation)
                .into_buffered_graphics_mode();
            display.init()?;
            Ssd1306Variants::Size128x32(display)
        } else {
            let mut display = Ssd1306::new(interface, DisplaySize128x64, self.rotation)
                .into_buffered_graphics_mode();
            display.init()?;
            Ssd1306Variants::Size128x64(display)
        };
        Ok(display)
    }

    /// Push the framebuffer to the panel
    fn flush_framebuffer(&mut self) -> Result<(), DisplayError> {
        match self.display.as_mut() {
            Some(Ssd1306Variants::Size128x64(display)) => push(display, &self.framebuffer),
            Some(Ssd1306Variants::Size128x32(display)) => push(display, &self.framebuffer),
            None => Err(DisplayError::NotInitialized),
        }
    }
}

fn push<SIZE: DisplaySize>(
    display: &mut OledHandle<SIZE>,
    framebuffer: &VarFrameBuf<BinaryColor>,
) -> Result<(), DisplayError> {
    display.fill_contiguous(&framebuffer.bounds(), framebuffer.pixels())?;
    display.flush()?;
    Ok(())
}

impl DisplayDriver for Ssd1306Driver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn adapter_state(&self) -> AdapterState {
        self.state
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        info!("Initializing SSD1306 on {} at address 0x{:02X}", self.bus_path, self.address);

        self.display = Some(self.open()?);
        self.state = AdapterState::Ready;
        self.clear()?;

        info!("SSD1306 0x{:02X} ready ({}x{})", self.address, self.capabilities.width, self.capabilities.height);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        if self.state != AdapterState::Ready {
            return Ok(());
        }
        self.framebuffer.reset();
        self.flush_framebuffer()
    }

    fn show_lines(&mut self, lines: &[String], line_height: u32) -> Result<(), DisplayError> {
        if self.state != AdapterState::Ready {
            return Err(DisplayError::NotInitialized);
        }

        self.framebuffer.reset();
        let font = font_for(&self.capabilities);
        let drawn = draw_lines(
            &mut self.framebuffer,
            lines,
            line_height,
            self.capabilities.max_chars,
            font,
            BinaryColor::On,
        )
        .map_err(|e| DisplayError::Render(format!("{:?}", e)))?;
        debug!("SSD1306 0x{:02X}: {} of {} lines", self.address, drawn, lines.len());

        self.flush_framebuffer()
    }

    fn shutdown(&mut self) -> Result<(), DisplayError> {
        let cleared = self.clear();
        self.state = AdapterState::ShutDown;
        cleared
    }
}
