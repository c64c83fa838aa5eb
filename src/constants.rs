//! This module contains global constants used across the display and other modules.

/// Main LCD (ST7789) native geometry.
pub const LCD_WIDTH: u32 = 240;
pub const LCD_HEIGHT: u32 = 320;
/// Vertical pitch of a text line on the main LCD.
pub const LCD_LINE_HEIGHT: u32 = 14;
/// Character budget per LCD line (FONT_5X8 at 240 px leaves a little margin).
pub const LCD_MAX_CHARS: usize = 42;
/// Lines accepted by `show_main_text`, extra lines are discarded.
pub const LCD_MAX_LINES: usize = 22;

/// OLED (SSD1306/SSD1315) geometry.
pub const OLED_WIDTH: u32 = 128;
pub const OLED_HEIGHT: u32 = 64;
/// Vertical pitch of a text line on the OLEDs (FONT_6X10).
pub const OLED_LINE_HEIGHT: u32 = 10;
/// Lines accepted by the OLED tools.
pub const OLED_MAX_LINES: usize = 6;

pub const OLED_LEFT_ADDR: u8 = 0x3C;
pub const OLED_RIGHT_ADDR: u8 = 0x3D;

/// Title panel shown on the main LCD by the dashboard.
pub const DASHBOARD_TITLE: &str = "Rascode Dashboard";

/// Name announced by the tool server during `initialize`.
pub const TOOL_SERVER_NAME: &str = "rascode-triple-screen";
/// MCP protocol revision the stdio transport speaks.
pub const TOOL_PROTOCOL_VERSION: &str = "2024-11-05";

/// Tool call reply meaning success; anything else is a diagnostic.
pub const TOOL_OK: &str = "ok";

// environment keys
pub const ENV_LOG_LEVEL: &str = "RASCODE_LOG_LEVEL";
pub const ENV_ENVIRONMENT: &str = "RASCODE_ENV";
pub const ENV_DISABLE_LCD: &str = "RASCODE_DISABLE_LCD";
pub const ENV_LCD_SPI_HZ: &str = "RASCODE_LCD_SPI_HZ";
pub const ENV_DISPLAY_BACKEND: &str = "RASCODE_DISPLAY_BACKEND";
pub const ENV_CONFIG: &str = "RASCODE_CONFIG";

/// Default CPU thermal zone, value in millidegrees Celsius.
pub const THERMAL_ZONE_PATH: &str = "/sys/class/thermal/thermal_zone0/temp";
