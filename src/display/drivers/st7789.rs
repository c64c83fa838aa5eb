/*
 *  display/drivers/st7789.rs
 *
 *  rascode - triple screen status panels
 *  (c) 2025-26 rascode contributors
 *
 *  ST7789 SPI LCD driver (main screen)
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

use display_interface_spi::SPIInterface;
use embedded_hal::delay::DelayNs;
use linux_embedded_hal::{
    gpio_cdev::{Chip, LineRequestFlags},
    spidev::{SpiModeFlags, SpidevOptions},
    CdevPin, Delay, SpidevDevice,
};
use mipidsi::{
    models::ST7789,
    options::{ColorInversion, Orientation, Rotation},
    Builder, Display,
};

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};
use embedded_graphics::prelude::*;
use tiny_skia::Pixmap;

use crate::config::LcdConfig;
use crate::display::error::DisplayError;
use crate::display::image::{fit_pixmap, to_rgb565};
use crate::display::text::{draw_lines, font_for};
use crate::display::traits::{AdapterState, ColorDepth, DisplayCapabilities, DisplayDriver};
use crate::vframebuf::VarFrameBuf;

use log::{debug, info};
use std::path::Path;

type LcdHandle = Display<SPIInterface<SpidevDevice, CdevPin>, ST7789, CdevPin>;

/// ST7789 240x320 panel on spidev with DC/RST on the GPIO character device
pub struct St7789Driver {
    config: LcdConfig,
    orientation: Orientation,

    /// mipidsi display, present once initialized
    display: Option<LcdHandle>,

    framebuffer: VarFrameBuf<Rgb565>,
    capabilities: DisplayCapabilities,
    state: AdapterState,
}

impl St7789Driver {
    pub fn new(config: &LcdConfig) -> Result<Self, DisplayError> {
        let rotation = match config.rotate_deg {
            0 => Rotation::Deg0,
            90 => Rotation::Deg90,
            180 => Rotation::Deg180,
            270 => Rotation::Deg270,
            other => {
                return Err(DisplayError::InvalidConfiguration(
                    format!("Invalid rotation angle: {} (must be 0, 90, 180, or 270)", other)
                ));
            }
        };
        let (width, height) = match config.rotate_deg {
            90 | 270 => (config.height, config.width),
            _ => (config.width, config.height),
        };

        Ok(Self {
            config: config.clone(),
            orientation: Orientation::new().rotate(rotation),
            display: None,
            framebuffer: VarFrameBuf::new(width, height, Rgb565::BLACK),
            capabilities: DisplayCapabilities {
                width,
                height,
                color_depth: ColorDepth::Rgb565,
                max_chars: config.max_chars,
                supports_image: true,
            },
            state: AdapterState::Uninitialized,
        })
    }

    fn open_spi(&self) -> Result<SpidevDevice, DisplayError> {
        let path = &self.config.spi_bus;
        if !Path::new(path).exists() {
            return Err(DisplayError::MissingDependency(format!(
                "{} not found, enable SPI so the spidev driver binds",
                path
            )));
        }

        let mut spi = SpidevDevice::open(path)
            .map_err(|e| DisplayError::DeviceAccess(format!("spidev {}: {:?}", path, e)))?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(self.config.spi_speed_hz)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        spi.0
            .configure(&options)
            .map_err(|e| DisplayError::DeviceAccess(format!("spidev {} configure: {}", path, e)))?;
        Ok(spi)
    }

    fn output_pin(chip: &mut Chip, path: &str, offset: u32, label: &str) -> Result<CdevPin, DisplayError> {
        let handle = chip
            .get_line(offset)
            .and_then(|line| line.request(LineRequestFlags::OUTPUT, 0, label))
            .map_err(|e| DisplayError::DeviceAccess(format!("{} line {}: {}", path, offset, e)))?;
        CdevPin::new(handle)
            .map_err(|e| DisplayError::DeviceAccess(format!("{} line {}: {:?}", path, offset, e)))
    }

    fn open(&self) -> Result<LcdHandle, DisplayError> {
        let spi = self.open_spi()?;

        let chip_path = &self.config.gpio_chip;
        let mut chip = Chip::new(chip_path)
            .map_err(|e| DisplayError::DeviceAccess(format!("{}: {}", chip_path, e)))?;
        let dc = Self::output_pin(&mut chip, chip_path, self.config.gpio_dc, "rascode-dc")?;
        let rst = Self::output_pin(&mut chip, chip_path, self.config.gpio_rst, "rascode-rst")?;

        let inversion = if self.config.invert_colors {
            ColorInversion::Inverted
        } else {
            ColorInversion::Normal
        };

        let di = SPIInterface::new(spi, dc);
        let mut delay = Delay;
        let display = Builder::new(ST7789, di)
            .display_size(self.config.width as u16, self.config.height as u16)
            .orientation(self.orientation)
            .invert_colors(inversion)
            .reset_pin(rst)
            .init(&mut delay)
            .map_err(|e| DisplayError::DeviceAccess(format!("ST7789 init: {:?}", e)))?;
        Ok(display)
    }

    fn flush_framebuffer(&mut self) -> Result<(), DisplayError> {
        let display = self.display.as_mut().ok_or(DisplayError::NotInitialized)?;
        display.fill_contiguous(&self.framebuffer.bounds(), self.framebuffer.pixels())?;
        Ok(())
    }
}

impl DisplayDriver for St7789Driver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn adapter_state(&self) -> AdapterState {
        self.state
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        info!(
            "Initializing ST7789 on {} @ {} Hz (DC={}, RST={})",
            self.config.spi_bus, self.config.spi_speed_hz, self.config.gpio_dc, self.config.gpio_rst
        );

        let mut display = self.open()?;
        // MADCTL again after reset, some panels ignore the one sent during init
        display.set_orientation(self.orientation)?;
        Delay.delay_ms(10);
        self.display = Some(display);
        self.state = AdapterState::Ready;

        // two passes to flush power-on noise
        self.clear()?;
        self.clear()?;

        info!("ST7789 ready ({}x{})", self.capabilities.width, self.capabilities.height);
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
            Rgb565::WHITE,
        )
        .map_err(|e| DisplayError::Render(format!("{:?}", e)))?;
        debug!("ST7789: {} of {} lines", drawn, lines.len());

        self.flush_framebuffer()
    }

    fn show_image(&mut self, image: &Pixmap) -> Result<(), DisplayError> {
        if self.state != AdapterState::Ready {
            return Err(DisplayError::NotInitialized);
        }

        let fitted = fit_pixmap(image, self.capabilities.width, self.capabilities.height)?;
        let area = self.framebuffer.bounds();
        self.framebuffer
            .fill_contiguous(&area, to_rgb565(&fitted))
            .map_err(|e| DisplayError::Render(format!("{:?}", e)))?;
        self.flush_framebuffer()
    }

    fn shutdown(&mut self) -> Result<(), DisplayError> {
        let cleared = self.clear();
        self.state = AdapterState::ShutDown;
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_records_geometry() {
        let driver = St7789Driver::new(&LcdConfig::default()).unwrap();
        assert_eq!(driver.dimensions(), (240, 320));
        assert_eq!(driver.capabilities().max_chars, 42);
        assert!(driver.capabilities().supports_image);
        assert!(!driver.is_ready());
    }

    #[test]
    fn test_show_before_init_fails() {
        let mut driver = St7789Driver::new(&LcdConfig::default()).unwrap();
        let err = driver.show_lines(&["x".to_string()], 14).unwrap_err();
        assert!(matches!(err, DisplayError::NotInitialized));
        // clear is a no-op until init
        driver.clear().unwrap();
    }

    #[test]
    fn test_missing_spidev() {
        let cfg = LcdConfig { spi_bus: "/dev/spidev9.9".into(), ..Default::default() };
        let mut driver = St7789Driver::new(&cfg).unwrap();
        match driver.init() {
            Err(DisplayError::MissingDependency(msg)) => assert!(msg.contains("spidev")),
            Err(other) => panic!("unexpected {other}"),
            Ok(()) => panic!("init should fail without the bus"),
        }
    }
}
