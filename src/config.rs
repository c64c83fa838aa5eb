/*
 *  config.rs
 *
 *  rascode - triple screen status panels
 *  (c) 2025-26 rascode contributors
 *
 *  Application configuration: defaults, YAML file, environment, CLI
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

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::constants::{
    ENV_CONFIG, ENV_DISABLE_LCD, ENV_DISPLAY_BACKEND, ENV_ENVIRONMENT, ENV_LCD_SPI_HZ,
    ENV_LOG_LEVEL, LCD_HEIGHT, LCD_LINE_HEIGHT, LCD_MAX_CHARS, LCD_WIDTH, OLED_HEIGHT,
    OLED_LEFT_ADDR, OLED_LINE_HEIGHT, OLED_RIGHT_ADDR, OLED_WIDTH, THERMAL_ZONE_PATH,
};

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Deployment environment, selected with `RASCODE_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    #[default]
    Dev,
    Test,
    Prod,
}

impl AppEnvironment {
    /// Lenient parse: unknown names fall back to `Dev`.
    pub fn detect(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "dev" | "development" => AppEnvironment::Dev,
            "test" | "testing" => AppEnvironment::Test,
            "prod" | "production" => AppEnvironment::Prod,
            _ => AppEnvironment::Dev,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppEnvironment::Dev => "dev",
            AppEnvironment::Test => "test",
            AppEnvironment::Prod => "prod",
        }
    }
}

/// Which implementation backs the display contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DisplayBackend {
    /// Real SPI/I2C devices
    #[default]
    Hardware,
    /// In-memory frame buffers, no bus access
    Mock,
}

impl std::str::FromStr for DisplayBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hardware" | "hw" => Ok(DisplayBackend::Hardware),
            "mock" | "fake" | "emulated" => Ok(DisplayBackend::Mock),
            other => Err(format!("unknown display backend '{}'", other)),
        }
    }
}

/// Top-level app configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub env: AppEnvironment,
    pub log_level: String,
    pub display: DisplayConfig,
    pub monitor: MonitorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            env: AppEnvironment::Dev,
            log_level: "info".to_string(),
            display: DisplayConfig::default(),
            monitor: MonitorConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// `None` lets the environment decide (mock under `test`)
    pub backend: Option<DisplayBackend>,
    /// Process-wide opt-out for the SPI LCD; the OLED pair is unaffected
    pub lcd_enabled: bool,
    pub lcd: LcdConfig,
    pub oled: OledConfig,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            backend: None,
            lcd_enabled: true,
            lcd: LcdConfig::default(),
            oled: OledConfig::default(),
        }
    }
}

impl DisplayConfig {
    pub fn effective_backend(&self, env: AppEnvironment) -> DisplayBackend {
        match (self.backend, env) {
            (Some(backend), _) => backend,
            (None, AppEnvironment::Test) => DisplayBackend::Mock,
            (None, _) => DisplayBackend::Hardware,
        }
    }
}

/// ST7789 main screen wiring and geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LcdConfig {
    pub spi_bus: String,         // e.g. "/dev/spidev0.0"
    pub spi_speed_hz: u32,
    pub gpio_chip: String,       // e.g. "/dev/gpiochip0"
    pub gpio_dc: u32,            // BCM numbering
    pub gpio_rst: u32,
    pub width: u32,
    pub height: u32,
    pub rotate_deg: u16,
    pub invert_colors: bool,
    pub line_height: u32,
    pub max_chars: usize,
}

impl Default for LcdConfig {
    fn default() -> Self {
        Self {
            spi_bus: "/dev/spidev0.0".to_string(),
            spi_speed_hz: 40_000_000,
            gpio_chip: "/dev/gpiochip0".to_string(),
            gpio_dc: 22,
            gpio_rst: 27,
            width: LCD_WIDTH,
            height: LCD_HEIGHT,
            rotate_deg: 0,
            invert_colors: true,
            line_height: LCD_LINE_HEIGHT,
            max_chars: LCD_MAX_CHARS,
        }
    }
}

/// Dual SSD1306/SSD1315 wiring. Both panels share one bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OledConfig {
    pub i2c_bus: String,         // e.g. "/dev/i2c-1"
    pub addr_left: u8,
    pub addr_right: u8,
    pub width: u32,
    pub height: u32,
    pub rotate_deg: u16,
    pub line_height: u32,
}

impl Default for OledConfig {
    fn default() -> Self {
        Self {
            i2c_bus: "/dev/i2c-1".to_string(),
            addr_left: OLED_LEFT_ADDR,
            addr_right: OLED_RIGHT_ADDR,
            width: OLED_WIDTH,
            height: OLED_HEIGHT,
            rotate_deg: 0,
            line_height: OLED_LINE_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Mount point whose usage is reported as DSK
    pub disk_path: String,
    pub refresh_interval_ms: u64,
    /// Thermal pseudo-files, tried in order (millidegrees Celsius)
    pub thermal_paths: Vec<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            disk_path: "/".to_string(),
            refresh_interval_ms: 1000,
            thermal_paths: vec![PathBuf::from(THERMAL_ZONE_PATH)],
        }
    }
}

/// Command line. Flags layer over YAML and environment.
#[derive(Debug, Parser, Clone)]
#[command(name = "rascode", version, about = "Raspberry Pi triple-screen status panels")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, short = 'c', value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Enable debug log level
    #[arg(long, short = 'v', alias = "verbose", action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long)]
    pub log_level: Option<String>,
    /// Display backend (hardware or mock)
    #[arg(long, value_enum)]
    pub backend: Option<DisplayBackend>,
    /// Skip the SPI LCD entirely
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_lcd: bool,
    #[arg(long)]
    pub lcd_spi_hz: Option<u32>,
    #[arg(long)]
    pub disk_path: Option<String>,
    #[arg(long)]
    pub interval_ms: Option<u64>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
    #[command(subcommand)]
    pub mode: Option<Mode>,
}

#[derive(Debug, Subcommand, Clone, PartialEq)]
pub enum Mode {
    /// LCD title, left OLED system status, right OLED time and network
    Dashboard,
    /// Dual OLED only; the LCD is never touched
    OledDashboard,
    /// LCD only: title and clock, for checking the SPI wiring
    MainScreen,
    /// One-shot main screen test, prints the result and remediation hints
    Probe,
    /// Render an SVG file on the LCD
    Image {
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,
    },
    /// Serve the display tools as JSON-RPC over stdio
    Serve,
}

/// Public entry point: read YAML, environment, merge CLI, validate.
pub fn load(cli: &Cli) -> Result<AppConfig, ConfigError> {
    load_with(cli, |key| std::env::var(key).ok())
}

/// Same as [`load`] with an injectable environment lookup.
pub fn load_with<F>(cli: &Cli, lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // 1) defaults, then 2) YAML file (explicit path or search)
    let mut cfg = match cli.config.clone().or_else(|| lookup(ENV_CONFIG).map(PathBuf::from)) {
        Some(p) if p.exists() => read_yaml(&p)?,
        Some(p) => {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
        None => match find_config_file() {
            Some(p) => read_yaml(&p)?,
            None => AppConfig::default(),
        },
    };

    // 3) environment
    apply_env_overrides(&mut cfg, &lookup)?;

    // 4) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    validate(&cfg)?;
    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    if let Some(home) = home_dir() {
        let p = home.join(".config/rascode/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/rascode.yaml");
        if p.exists() { return Some(p) }
    }
    for candidate in &["rascode.yaml", "config/rascode.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

pub fn read_yaml(path: &Path) -> Result<AppConfig, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: AppConfig = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Accepts the usual truthy spellings; anything else is false.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "t" | "on"
    )
}

pub fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: &F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup(ENV_ENVIRONMENT) { cfg.env = AppEnvironment::detect(&v); }
    if let Some(v) = lookup(ENV_LOG_LEVEL) { cfg.log_level = v.trim().to_lowercase(); }
    if let Some(v) = lookup(ENV_DISABLE_LCD) {
        if is_truthy(&v) {
            cfg.display.lcd_enabled = false;
        }
    }
    if let Some(v) = lookup(ENV_LCD_SPI_HZ) {
        cfg.display.lcd.spi_speed_hz = v.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            var: ENV_LCD_SPI_HZ,
            value: v.clone(),
        })?;
    }
    if let Some(v) = lookup(ENV_DISPLAY_BACKEND) {
        let backend = v.parse().map_err(|_| ConfigError::InvalidEnv {
            var: ENV_DISPLAY_BACKEND,
            value: v.clone(),
        })?;
        cfg.display.backend = Some(backend);
    }
    Ok(())
}

fn apply_cli_overrides(cfg: &mut AppConfig, cli: &Cli) {
    if cli.debug                      { cfg.log_level = "debug".to_string(); }
    if let Some(l) = &cli.log_level   { cfg.log_level = l.to_lowercase(); }
    if cli.backend.is_some()          { cfg.display.backend = cli.backend; }
    if cli.no_lcd                     { cfg.display.lcd_enabled = false; }
    if let Some(hz) = cli.lcd_spi_hz  { cfg.display.lcd.spi_speed_hz = hz; }
    if let Some(p) = &cli.disk_path   { cfg.monitor.disk_path = p.clone(); }
    if let Some(ms) = cli.interval_ms { cfg.monitor.refresh_interval_ms = ms; }
}

/// Put any invariants here (required fields, ranges, etc.)
pub fn validate(cfg: &AppConfig) -> Result<(), ConfigError> {
    let lcd = &cfg.display.lcd;
    let oled = &cfg.display.oled;
    if lcd.width == 0 || lcd.height == 0 || oled.width == 0 || oled.height == 0 {
        return Err(ConfigError::Validation("display width/height must be > 0".into()));
    }
    for rot in [lcd.rotate_deg, oled.rotate_deg] {
        match rot {
            0 | 90 | 180 | 270 => {},
            _ => return Err(ConfigError::Validation("rotate_deg must be 0|90|180|270".into())),
        }
    }
    if lcd.line_height == 0 || oled.line_height == 0 {
        return Err(ConfigError::Validation("line_height must be > 0".into()));
    }
    if lcd.spi_speed_hz == 0 {
        return Err(ConfigError::Validation("LCD SPI speed must be > 0 Hz".into()));
    }
    if oled.addr_left == oled.addr_right {
        return Err(ConfigError::Validation(format!(
            "OLED addresses must differ (both 0x{:02X})",
            oled.addr_left
        )));
    }
    if cfg.monitor.refresh_interval_ms == 0 {
        return Err(ConfigError::Validation("refresh_interval_ms must be > 0".into()));
    }
    Ok(())
}
