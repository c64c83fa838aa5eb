/*
 *  display/registry.rs
 *
 *  rascode - triple screen status panels
 *  (c) 2025-26 rascode contributors
 *
 *  Single owner of the display hardware: lazy, once-only initialization
 *  with per-device availability
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

use log::{info, warn};
use thiserror::Error;
use tiny_skia::Pixmap;

use crate::constants::{ENV_DISABLE_LCD, LCD_MAX_LINES, OLED_MAX_LINES, TOOL_OK};
use crate::dashboard::DashboardFrame;
use crate::display::dual_oled::{DualOledDisplay, OledId};
use crate::display::error::DisplayError;
use crate::display::factory::{BoxedDriver, DriverSource};

const NOT_INITIALIZED: &str = "未初始化";

/// Failure at the display boundary, rendered as a user-facing diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("{screen}不可用：{reason}")]
    Unavailable { screen: &'static str, reason: String },

    #[error("{action}失败: {reason}")]
    Failed { action: &'static str, reason: String },
}

pub type ToolResult = Result<(), ToolError>;

/// `"ok"` on success, otherwise the diagnostic text.
pub fn reply(result: ToolResult) -> String {
    match result {
        Ok(()) => TOOL_OK.to_string(),
        Err(e) => e.to_string(),
    }
}

/// Screen argument of `clear_screen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenSelector {
    Main,
    Left,
    Right,
    All,
}

impl ScreenSelector {
    fn wants_main(self) -> bool {
        matches!(self, ScreenSelector::Main | ScreenSelector::All)
    }

    fn wants(self, id: OledId) -> bool {
        match (self, id) {
            (ScreenSelector::All, _) => true,
            (ScreenSelector::Left, OledId::Left) => true,
            (ScreenSelector::Right, OledId::Right) => true,
            _ => false,
        }
    }
}

impl FromStr for ScreenSelector {
    type Err = DisplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "main" => Ok(ScreenSelector::Main),
            "left" => Ok(ScreenSelector::Left),
            "right" => Ok(ScreenSelector::Right),
            "all" => Ok(ScreenSelector::All),
            _ => Err(DisplayError::UnknownSelector(s.to_string())),
        }
    }
}

impl fmt::Display for ScreenSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScreenSelector::Main => "main",
            ScreenSelector::Left => "left",
            ScreenSelector::Right => "right",
            ScreenSelector::All => "all",
        };
        f.write_str(name)
    }
}

/// Registry lifecycle. Moves forward exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryState {
    NotAttempted,
    Initializing,
    Settled,
}

/// Outcome for one device after the registry has settled.
pub enum DeviceSlot<T> {
    Pending,
    Ready(T),
    Unavailable(String),
    Disabled(String),
}

impl<T> DeviceSlot<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, DeviceSlot::Ready(_))
    }

    fn reason(&self) -> String {
        match self {
            DeviceSlot::Unavailable(reason) | DeviceSlot::Disabled(reason) => reason.clone(),
            DeviceSlot::Pending | DeviceSlot::Ready(_) => NOT_INITIALIZED.to_string(),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            DeviceSlot::Pending => "pending",
            DeviceSlot::Ready(_) => "ready",
            DeviceSlot::Unavailable(_) => "unavailable",
            DeviceSlot::Disabled(_) => "disabled",
        }
    }
}

impl<T> fmt::Debug for DeviceSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceSlot::Unavailable(reason) => write!(f, "Unavailable({:?})", reason),
            other => f.write_str(other.label()),
        }
    }
}

/// Owns the main LCD and the OLED pair for the life of the process.
///
/// The first operation from any caller builds and initializes every
/// configured device. A device that fails stays unavailable; later calls
/// report the recorded reason without touching the hardware again.
pub struct DisplayRegistry {
    source: Box<dyn DriverSource>,
    lcd_enabled: bool,
    oled_enabled: bool,
    lcd_line_height: u32,
    state: RegistryState,
    main: DeviceSlot<BoxedDriver>,
    oleds: DeviceSlot<DualOledDisplay>,
    init_error: Option<String>,
}

impl DisplayRegistry {
    pub fn new(source: Box<dyn DriverSource>, lcd_enabled: bool) -> Self {
        let lcd_line_height = source.lcd_line_height();
        Self {
            source,
            lcd_enabled,
            oled_enabled: true,
            lcd_line_height,
            state: RegistryState::NotAttempted,
            main: DeviceSlot::Pending,
            oleds: DeviceSlot::Pending,
            init_error: None,
        }
    }

    /// Leave the OLED pair alone: never built, never cleared on shutdown.
    pub fn without_oleds(mut self) -> Self {
        self.oled_enabled = false;
        self
    }

    pub fn state(&self) -> RegistryState {
        self.state
    }

    /// Last initialization error, if any device failed.
    pub fn init_error(&self) -> Option<&str> {
        self.init_error.as_deref()
    }

    pub fn main_slot(&self) -> &DeviceSlot<BoxedDriver> {
        &self.main
    }

    pub fn oled_slot(&self) -> &DeviceSlot<DualOledDisplay> {
        &self.oleds
    }

    /// Run the one-time initialization. Returns true when at least one
    /// device is usable.
    pub fn ensure_displays(&mut self) -> bool {
        if self.state == RegistryState::NotAttempted {
            self.state = RegistryState::Initializing;

            self.main = if self.lcd_enabled {
                match self.source.main_display().map_err(DisplayError::from).and_then(|mut d| {
                    d.init()?;
                    Ok(d)
                }) {
                    Ok(d) => DeviceSlot::Ready(d),
                    Err(e) => self.record_failure("main LCD", e),
                }
            } else {
                info!("Main LCD disabled by {}", ENV_DISABLE_LCD);
                DeviceSlot::Disabled(format!("已通过 {} 禁用", ENV_DISABLE_LCD))
            };

            self.oleds = if self.oled_enabled {
                match self.source.oled_pair().map_err(DisplayError::from).and_then(|mut p| {
                    p.init()?;
                    Ok(p)
                }) {
                    Ok(p) => DeviceSlot::Ready(p),
                    Err(e) => self.record_failure("OLED pair", e),
                }
            } else {
                DeviceSlot::Disabled("本模式仅使用主屏".to_string())
            };

            self.state = RegistryState::Settled;
            info!("Displays settled: main={}, oled={}", self.main.label(), self.oleds.label());
        }
        self.main.is_ready() || self.oleds.is_ready()
    }

    fn record_failure<T>(&mut self, what: &str, err: DisplayError) -> DeviceSlot<T> {
        let reason = err.to_string();
        warn!("{} unavailable: {}", what, reason);
        self.init_error = Some(reason.clone());
        DeviceSlot::Unavailable(reason)
    }

    fn main_device(&mut self) -> Result<&mut BoxedDriver, ToolError> {
        self.ensure_displays();
        match &mut self.main {
            DeviceSlot::Ready(d) => Ok(d),
            slot => Err(ToolError::Unavailable { screen: "主屏", reason: slot.reason() }),
        }
    }

    fn oled_device(&mut self, screen: &'static str) -> Result<&mut DualOledDisplay, ToolError> {
        self.ensure_displays();
        match &mut self.oleds {
            DeviceSlot::Ready(p) => Ok(p),
            slot => Err(ToolError::Unavailable { screen, reason: slot.reason() }),
        }
    }

    fn any_unavailable(&self) -> ToolError {
        let reason = self.init_error.clone().unwrap_or_else(|| {
            if matches!(self.main, DeviceSlot::Disabled(_)) {
                self.oleds.reason()
            } else {
                self.main.reason()
            }
        });
        ToolError::Unavailable { screen: "显示", reason }
    }

    /// Up to 22 lines on the main LCD.
    pub fn show_main_text(&mut self, lines: &[String]) -> ToolResult {
        let lines = &lines[..lines.len().min(LCD_MAX_LINES)];
        let line_height = self.lcd_line_height;
        self.main_device()?
            .show_lines(lines, line_height)
            .map_err(|e| ToolError::Failed { action: "主屏写入", reason: e.to_string() })
    }

    pub fn show_left_oled(&mut self, lines: &[String]) -> ToolResult {
        self.show_oled(OledId::Left, lines)
    }

    pub fn show_right_oled(&mut self, lines: &[String]) -> ToolResult {
        self.show_oled(OledId::Right, lines)
    }

    /// Up to 6 lines on one OLED.
    pub fn show_oled(&mut self, id: OledId, lines: &[String]) -> ToolResult {
        let (screen, action) = match id {
            OledId::Left => ("左侧 OLED", "左侧 OLED 写入"),
            OledId::Right => ("右侧 OLED", "右侧 OLED 写入"),
        };
        let lines = &lines[..lines.len().min(OLED_MAX_LINES)];
        self.oled_device(screen)?
            .show_lines(id, lines)
            .map_err(|e| ToolError::Failed { action, reason: e.to_string() })
    }

    /// Render a raster on the main LCD.
    pub fn show_main_image(&mut self, image: &Pixmap) -> ToolResult {
        self.main_device()?
            .show_image(image)
            .map_err(|e| ToolError::Failed { action: "主屏图像写入", reason: e.to_string() })
    }

    /// Blank the selected screens.
    ///
    /// With several targets, whatever is available gets cleared; the call is
    /// only reported unavailable when none of them is.
    pub fn clear_screen(&mut self, screen: ScreenSelector) -> ToolResult {
        self.ensure_displays();

        let main_wanted = screen.wants_main();
        let oled_wanted = screen.wants(OledId::Left) || screen.wants(OledId::Right);
        let main_ok = main_wanted && self.main.is_ready();
        let oled_ok = oled_wanted && self.oleds.is_ready();

        if !main_ok && !oled_ok {
            return Err(match screen {
                ScreenSelector::Main => ToolError::Unavailable { screen: "主屏", reason: self.main.reason() },
                ScreenSelector::Left => ToolError::Unavailable { screen: "左侧 OLED", reason: self.oleds.reason() },
                ScreenSelector::Right => ToolError::Unavailable { screen: "右侧 OLED", reason: self.oleds.reason() },
                ScreenSelector::All => self.any_unavailable(),
            });
        }

        let failed = |e: DisplayError| ToolError::Failed { action: "清屏", reason: e.to_string() };
        if main_ok {
            if let DeviceSlot::Ready(main) = &mut self.main {
                main.clear().map_err(failed)?;
            }
        }
        if oled_ok {
            if let DeviceSlot::Ready(pair) = &mut self.oleds {
                for id in [OledId::Left, OledId::Right] {
                    if screen.wants(id) {
                        pair.clear_oled(id).map_err(failed)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Redraw the steady-state dashboard on whatever is available.
    pub fn restore_dashboard(&mut self, frame: &DashboardFrame) -> ToolResult {
        if !self.ensure_displays() {
            return Err(self.any_unavailable());
        }

        let failed = |e: DisplayError| ToolError::Failed { action: "恢复仪表盘", reason: e.to_string() };
        if let DeviceSlot::Ready(main) = &mut self.main {
            main.show_lines(&frame.title, self.lcd_line_height).map_err(failed)?;
        }
        if let DeviceSlot::Ready(pair) = &mut self.oleds {
            pair.show_lines(OledId::Left, &frame.left).map_err(failed)?;
            pair.show_lines(OledId::Right, &frame.right).map_err(failed)?;
        }
        Ok(())
    }

    /// Clear every ready device and stop. Called once on exit.
    pub fn shutdown(&mut self) {
        if let DeviceSlot::Ready(main) = &mut self.main {
            if let Err(e) = main.shutdown() {
                warn!("Main LCD shutdown: {}", e);
            }
        }
        if let DeviceSlot::Ready(pair) = &mut self.oleds {
            if let Err(e) = pair.shutdown() {
                warn!("OLED shutdown: {}", e);
            }
        }
        info!("Displays shut down");
    }
}
