/*
 *  display/error.rs
 *
 *  rascode - triple screen status panels
 *  (c) 2025-26 rascode contributors
 *
 *  Unified error types for the display subsystem
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

use thiserror::Error;

/// Unified error type for all display operations
#[derive(Debug, Error)]
pub enum DisplayError {
    /// Driver not compiled in, or the kernel bus module is absent
    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    /// Permission or bus-open failure (spidev, i2c-dev, gpiochip)
    #[error("Device access failed: {0}")]
    DeviceAccess(String),

    /// Rendering requested before `init()`
    #[error("Display not initialized")]
    NotInitialized,

    /// Transient failure while drawing or flushing a frame
    #[error("Render failed: {0}")]
    Render(String),

    /// Display interface error
    #[error("Display interface error: {0:?}")]
    InterfaceError(display_interface::DisplayError),

    /// Unsupported operation for this display
    #[error("Operation not supported by this display")]
    UnsupportedOperation,

    /// Screen selector that names no display
    #[error("Unknown screen selector: {0:?}")]
    UnknownSelector(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Raster could not be produced or converted
    #[error("Image error: {0}")]
    Image(String),
}

// display_interface::DisplayError doesn't implement std::error::Error,
// so it is carried by value rather than as a source
impl From<display_interface::DisplayError> for DisplayError {
    fn from(err: display_interface::DisplayError) -> Self {
        DisplayError::InterfaceError(err)
    }
}

impl From<linux_embedded_hal::I2CError> for DisplayError {
    fn from(err: linux_embedded_hal::I2CError) -> Self {
        DisplayError::DeviceAccess(format!("i2c: {:?}", err))
    }
}

impl From<std::io::Error> for DisplayError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => DisplayError::MissingDependency(err.to_string()),
            _ => DisplayError::DeviceAccess(err.to_string()),
        }
    }
}

/// Factory error types
#[derive(Debug, Error)]
pub enum DisplayFactoryError {
    /// Driver support was left out of this build
    #[error("{driver} driver not enabled. Enable with --features {feature}")]
    DriverNotEnabled { driver: &'static str, feature: &'static str },

    /// Display driver initialization failed
    #[error("Driver initialization failed: {0}")]
    DriverInitFailed(#[from] DisplayError),
}

impl From<DisplayFactoryError> for DisplayError {
    fn from(err: DisplayFactoryError) -> Self {
        match err {
            DisplayFactoryError::DriverInitFailed(e) => e,
            e @ DisplayFactoryError::DriverNotEnabled { .. } =>
                DisplayError::MissingDependency(e.to_string()),
        }
    }
}

/// Actionable advice for the well-known failure signatures.
///
/// Works on rendered text so it also applies to the diagnostics returned by
/// the registry, which keep the underlying error message.
pub fn remediation(message: &str) -> Option<&'static str> {
    if message.contains("/dev/gpiochip") || message.contains("/dev/mem") {
        Some("GPIO access denied: run as root or add the user to the 'gpio' group")
    } else if message.contains("spidev") {
        Some("SPI bus not available: enable SPI (raspi-config > Interface Options > SPI) and check /dev/spidev0.0")
    } else if message.contains("i2c") {
        Some("I2C bus not available: enable I2C (raspi-config > Interface Options > I2C) and load i2c-dev")
    } else if message.contains("not enabled") {
        Some("Rebuild with the matching driver feature, e.g. --features all-drivers")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remediation_markers() {
        assert!(remediation("open /dev/gpiochip0: permission denied").unwrap().contains("gpio"));
        assert!(remediation("spidev: No such file or directory").unwrap().contains("SPI"));
        assert!(remediation("i2c: Permission denied").unwrap().contains("I2C"));
        assert!(remediation("something else").is_none());
    }

    #[test]
    fn test_factory_error_flattens() {
        let e: DisplayError = DisplayFactoryError::DriverNotEnabled {
            driver: "ST7789",
            feature: "driver-st7789",
        }.into();
        match e {
            DisplayError::MissingDependency(msg) => assert!(msg.contains("--features driver-st7789")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_missing_device_file_is_a_dependency_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "/dev/spidev0.0");
        assert!(matches!(DisplayError::from(io), DisplayError::MissingDependency(_)));
    }
}
