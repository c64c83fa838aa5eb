/*
 *  display/mod.rs
 *
 *  rascode - triple screen status panels
 *  (c) 2025-26 rascode contributors
 *
 *  Display subsystem - drivers, the OLED pair and the shared registry
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

// Core trait definitions
pub mod traits;
pub mod error;

// Rendering helpers
pub mod text;
pub mod image;

// Display drivers (hardware drivers are feature gated inside)
pub mod drivers;

pub mod dual_oled;
pub mod factory;
pub mod registry;

// Re-exports for convenience
pub use traits::{AdapterState, ColorDepth, DisplayCapabilities, DisplayDriver};
pub use error::{remediation, DisplayError, DisplayFactoryError};
pub use dual_oled::{DualOledDisplay, OledId};
pub use factory::{BoxedDriver, DisplayDriverFactory, DriverSource, MockDriverSource};
pub use registry::{reply, DeviceSlot, DisplayRegistry, RegistryState, ScreenSelector, ToolError, ToolResult};
pub use drivers::mock::{MockDriver, MockDriverState};

#[cfg(feature = "driver-ssd1306")]
pub use drivers::ssd1306::Ssd1306Driver;

#[cfg(feature = "driver-st7789")]
pub use drivers::st7789::St7789Driver;
