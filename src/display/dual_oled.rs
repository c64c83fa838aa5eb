/*
 *  display/dual_oled.rs
 *
 *  rascode - triple screen status panels
 *  (c) 2025-26 rascode contributors
 *
 *  Left/right OLED pair sharing one I2C bus
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

use std::fmt;
use std::str::FromStr;

use crate::display::error::DisplayError;
use crate::display::factory::BoxedDriver;

/// Which of the two small displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OledId {
    Left,
    Right,
}

impl FromStr for OledId {
    type Err = DisplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "left" => Ok(OledId::Left),
            "right" => Ok(OledId::Right),
            _ => Err(DisplayError::UnknownSelector(s.to_string())),
        }
    }
}

impl fmt::Display for OledId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OledId::Left => write!(f, "left"),
            OledId::Right => write!(f, "right"),
        }
    }
}

/// Both OLEDs, initialized and torn down together.
pub struct DualOledDisplay {
    left: BoxedDriver,
    right: BoxedDriver,
    line_height: u32,
}

impl DualOledDisplay {
    pub fn new(left: BoxedDriver, right: BoxedDriver, line_height: u32) -> Self {
        Self { left, right, line_height }
    }

    /// Either panel failing fails the pair.
    pub fn init(&mut self) -> Result<(), DisplayError> {
        self.left.init()?;
        self.right.init()?;
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.left.is_ready() && self.right.is_ready()
    }

    pub fn show_lines(&mut self, id: OledId, lines: &[String]) -> Result<(), DisplayError> {
        let line_height = self.line_height;
        self.device(id).show_lines(lines, line_height)
    }

    pub fn clear_oled(&mut self, id: OledId) -> Result<(), DisplayError> {
        self.device(id).clear()
    }

    /// Clear both; the right panel is still attempted when the left fails.
    pub fn clear(&mut self) -> Result<(), DisplayError> {
        let left = self.left.clear();
        let right = self.right.clear();
        left.and(right)
    }

    pub fn shutdown(&mut self) -> Result<(), DisplayError> {
        let left = self.left.shutdown();
        let right = self.right.shutdown();
        left.and(right)
    }

    fn device(&mut self, id: OledId) -> &mut BoxedDriver {
        match id {
            OledId::Left => &mut self.left,
            OledId::Right => &mut self.right,
        }
    }
}
