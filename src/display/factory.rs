/*
 *  display/factory.rs
 *
 *  rascode - triple screen status panels
 *  (c) 2025-26 rascode contributors
 *
 *  Factory for the main LCD and the OLED pair, hardware or mock
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

use crate::config::{AppEnvironment, DisplayBackend, DisplayConfig, LcdConfig, OledConfig};
use crate::constants::LCD_LINE_HEIGHT;
use crate::display::drivers::mock::MockDriver;
use crate::display::dual_oled::{DualOledDisplay, OledId};
use crate::display::error::DisplayFactoryError;
use crate::display::traits::DisplayDriver;
use log::{debug, info};

#[cfg(feature = "driver-ssd1306")]
use crate::display::drivers::ssd1306::Ssd1306Driver;

#[cfg(feature = "driver-st7789")]
use crate::display::drivers::st7789::St7789Driver;

/// Type alias for boxed display driver trait objects
pub type BoxedDriver = Box<dyn DisplayDriver>;

/// Where the registry gets its (uninitialized) drivers from.
///
/// The registry initializes what it is handed; sources only construct.
pub trait DriverSource: Send {
    fn main_display(&mut self) -> Result<BoxedDriver, DisplayFactoryError>;

    fn oled_pair(&mut self) -> Result<DualOledDisplay, DisplayFactoryError>;

    /// Pitch of a text line on the main LCD.
    fn lcd_line_height(&self) -> u32 {
        LCD_LINE_HEIGHT
    }
}

/// Factory for creating display drivers from configuration
pub struct DisplayDriverFactory {
    backend: DisplayBackend,
    lcd: LcdConfig,
    oled: OledConfig,
}

impl DisplayDriverFactory {
    pub fn new(config: &DisplayConfig, env: AppEnvironment) -> Self {
        let backend = config.effective_backend(env);
        info!("Display backend: {:?}", backend);
        Self {
            backend,
            lcd: config.lcd.clone(),
            oled: config.oled.clone(),
        }
    }

    pub fn backend(&self) -> DisplayBackend {
        self.backend
    }

    /// Create the ST7789 main screen driver (not yet initialized)
    pub fn create_main(&self) -> Result<BoxedDriver, DisplayFactoryError> {
        match self.backend {
            DisplayBackend::Mock => Ok(Box::new(MockDriver::lcd(&self.lcd))),
            DisplayBackend::Hardware => Self::create_st7789(&self.lcd),
        }
    }

    /// Create one OLED driver (not yet initialized)
    pub fn create_oled(&self, id: OledId) -> Result<BoxedDriver, DisplayFactoryError> {
        let address = match id {
            OledId::Left => self.oled.addr_left,
            OledId::Right => self.oled.addr_right,
        };
        debug!("Creating {} OLED driver at 0x{:02X}", id, address);

        match self.backend {
            DisplayBackend::Mock => Ok(Box::new(MockDriver::oled(&format!("mock-oled-{}", id), &self.oled))),
            DisplayBackend::Hardware => Self::create_ssd1306(address, &self.oled),
        }
    }

    #[cfg(feature = "driver-st7789")]
    fn create_st7789(config: &LcdConfig) -> Result<BoxedDriver, DisplayFactoryError> {
        Ok(Box::new(St7789Driver::new(config)?))
    }

    #[cfg(not(feature = "driver-st7789"))]
    fn create_st7789(_config: &LcdConfig) -> Result<BoxedDriver, DisplayFactoryError> {
        Err(DisplayFactoryError::DriverNotEnabled { driver: "ST7789", feature: "driver-st7789" })
    }

    #[cfg(feature = "driver-ssd1306")]
    fn create_ssd1306(address: u8, config: &OledConfig) -> Result<BoxedDriver, DisplayFactoryError> {
        Ok(Box::new(Ssd1306Driver::new_i2c(address, config)?))
    }

    #[cfg(not(feature = "driver-ssd1306"))]
    fn create_ssd1306(_address: u8, _config: &OledConfig) -> Result<BoxedDriver, DisplayFactoryError> {
        Err(DisplayFactoryError::DriverNotEnabled { driver: "SSD1306", feature: "driver-ssd1306" })
    }
}

impl DriverSource for DisplayDriverFactory {
    fn main_display(&mut self) -> Result<BoxedDriver, DisplayFactoryError> {
        self.create_main()
    }

    fn oled_pair(&mut self) -> Result<DualOledDisplay, DisplayFactoryError> {
        let left = self.create_oled(OledId::Left)?;
        let right = self.create_oled(OledId::Right)?;
        Ok(DualOledDisplay::new(left, right, self.oled.line_height))
    }

    fn lcd_line_height(&self) -> u32 {
        self.lcd.line_height
    }
}

/// Hands out clones of three mock panels and counts construction requests.
///
/// Clones share state with the handles kept here, so callers can inspect
/// what the registry did after the drivers were boxed.
#[derive(Debug, Clone)]
pub struct MockDriverSource {
    pub lcd: MockDriver,
    pub left: MockDriver,
    pub right: MockDriver,
    pub main_requests: usize,
    pub oled_requests: usize,
    lcd_line_height: u32,
    oled_line_height: u32,
}

impl MockDriverSource {
    pub fn new(config: &DisplayConfig) -> Self {
        Self {
            lcd: MockDriver::lcd(&config.lcd),
            left: MockDriver::oled("mock-oled-left", &config.oled),
            right: MockDriver::oled("mock-oled-right", &config.oled),
            main_requests: 0,
            oled_requests: 0,
            lcd_line_height: config.lcd.line_height,
            oled_line_height: config.oled.line_height,
        }
    }
}

impl Default for MockDriverSource {
    fn default() -> Self {
        Self::new(&DisplayConfig::default())
    }
}

impl DriverSource for MockDriverSource {
    fn main_display(&mut self) -> Result<BoxedDriver, DisplayFactoryError> {
        self.main_requests += 1;
        Ok(Box::new(self.lcd.clone()))
    }

    fn oled_pair(&mut self) -> Result<DualOledDisplay, DisplayFactoryError> {
        self.oled_requests += 1;
        Ok(DualOledDisplay::new(
            Box::new(self.left.clone()),
            Box::new(self.right.clone()),
            self.oled_line_height,
        ))
    }

    fn lcd_line_height(&self) -> u32 {
        self.lcd_line_height
    }
}
