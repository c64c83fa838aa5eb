/*
 *  tests/display_integration.rs
 *
 *  rascode - triple screen status panels
 *  (c) 2025-26 rascode contributors
 *
 *  Registry behaviour against mock and unreachable backends
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

use rascode::config::{AppEnvironment, DisplayBackend, DisplayConfig};
use rascode::dashboard::{title_lines, DashboardFrame};
use rascode::display::{
    remediation, AdapterState, BoxedDriver, DeviceSlot, DisplayDriver, DisplayDriverFactory,
    DisplayError, DisplayFactoryError, DisplayRegistry, DriverSource, DualOledDisplay,
    MockDriverSource, RegistryState, ScreenSelector,
};
use rascode::services::{NetworkInfo, SystemStats};

/// Source whose LCD bus is missing and whose OLEDs come from mocks.
struct NoSpiSource {
    mocks: MockDriverSource,
}

impl DriverSource for NoSpiSource {
    fn main_display(&mut self) -> Result<BoxedDriver, DisplayFactoryError> {
        Err(DisplayFactoryError::DriverInitFailed(DisplayError::MissingDependency(
            "/dev/spidev0.0 not found: load spidev".to_string(),
        )))
    }

    fn oled_pair(&mut self) -> Result<DualOledDisplay, DisplayFactoryError> {
        self.mocks.oled_pair()
    }
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn unreachable_hardware() -> DisplayConfig {
    let mut config = DisplayConfig { backend: Some(DisplayBackend::Hardware), ..Default::default() };
    config.lcd.spi_bus = "/nonexistent/spidev9.9".to_string();
    config.lcd.gpio_chip = "/nonexistent/gpiochip9".to_string();
    config.oled.i2c_bus = "/nonexistent/i2c-9".to_string();
    config
}

#[test]
fn test_failing_lcd_leaves_oleds_working() {
    let mocks = MockDriverSource::default();
    let mut registry = DisplayRegistry::new(Box::new(NoSpiSource { mocks: mocks.clone() }), true);

    let err = registry.show_main_text(&lines(&["hello"])).unwrap_err().to_string();
    assert!(err.starts_with("主屏不可用："));
    assert!(remediation(&err).unwrap().contains("SPI"));

    assert!(registry.show_left_oled(&lines(&["CPU"])).is_ok());
    assert!(registry.show_right_oled(&lines(&["TIME"])).is_ok());
    assert_eq!(mocks.right.state().lock().unwrap().last_lines, vec!["TIME"]);
    assert!(registry.init_error().unwrap().contains("spidev"));
}

#[test]
fn test_initialization_happens_once() {
    let source = MockDriverSource::default();
    source.left.state().lock().unwrap().simulate_init_failure = true;
    let mut registry = DisplayRegistry::new(Box::new(source.clone()), true);
    assert_eq!(registry.state(), RegistryState::NotAttempted);

    for _ in 0..3 {
        assert!(registry.show_left_oled(&lines(&["x"])).is_err());
        assert!(registry.show_main_text(&lines(&["y"])).is_ok());
    }
    assert_eq!(registry.state(), RegistryState::Settled);

    // recovery of the device is not picked up
    source.left.state().lock().unwrap().simulate_init_failure = false;
    assert!(registry.show_right_oled(&lines(&["z"])).is_err());
    assert_eq!(source.lcd.state().lock().unwrap().init_count, 1);
    assert_eq!(source.left.state().lock().unwrap().init_count, 0);
}

#[test]
fn test_lcd_toggle_skips_construction() {
    let source = MockDriverSource::default();
    let mut registry = DisplayRegistry::new(Box::new(source.clone()), false);

    let err = registry.show_main_text(&lines(&["x"])).unwrap_err().to_string();
    assert!(err.contains("RASCODE_DISABLE_LCD"));
    assert!(matches!(registry.main_slot(), DeviceSlot::Disabled(_)));
    assert_eq!(source.lcd.state().lock().unwrap().lifecycle, AdapterState::Uninitialized);

    assert!(registry.clear_screen(ScreenSelector::All).is_ok());
    assert!(registry.clear_screen(ScreenSelector::Main).is_err());
}

#[test]
fn test_line_limits() {
    let source = MockDriverSource::default();
    let mut registry = DisplayRegistry::new(Box::new(source.clone()), true);

    let many: Vec<String> = (0..30).map(|i| format!("line {:02} {}", i, "#".repeat(60))).collect();
    registry.show_main_text(&many).unwrap();
    let main = source.lcd.state().lock().unwrap().last_lines.clone();
    assert_eq!(main.len(), 22);
    assert!(main.iter().all(|l| l.chars().count() == 42));

    registry.show_left_oled(&many).unwrap();
    let left = source.left.state().lock().unwrap().last_lines.clone();
    assert_eq!(left.len(), 6);
    assert!(left.iter().all(|l| l.chars().count() <= 21));
}

#[test]
fn test_restore_dashboard_after_overwrite() {
    let source = MockDriverSource::default();
    let mut registry = DisplayRegistry::new(Box::new(source.clone()), true);
    registry.show_main_text(&lines(&["scratch"])).unwrap();

    let net = NetworkInfo::new(Some("192.168.1.1"), true, Some("eth0"));
    let stats = SystemStats { cpu_percent: 1.0, cpu_temp_c: None, mem_percent: 2.0, disk_percent: 3.0 };
    let frame = DashboardFrame::new(&stats, &net, None);
    registry.restore_dashboard(&frame).unwrap();

    assert_eq!(source.lcd.state().lock().unwrap().last_lines, title_lines());
    assert_eq!(source.left.state().lock().unwrap().last_lines[1], "T:   N/A");
    assert_eq!(source.right.state().lock().unwrap().last_lines[1], "IP   192.168.1.1");
}

#[test]
fn test_unreachable_hardware_reports_unavailable() {
    let factory = DisplayDriverFactory::new(&unreachable_hardware(), AppEnvironment::Prod);
    let mut registry = DisplayRegistry::new(Box::new(factory), true);

    assert!(!registry.ensure_displays());
    for err in [
        registry.show_main_text(&lines(&["a"])).unwrap_err(),
        registry.show_left_oled(&lines(&["b"])).unwrap_err(),
        registry.show_right_oled(&lines(&["c"])).unwrap_err(),
        registry.clear_screen(ScreenSelector::All).unwrap_err(),
    ] {
        assert!(err.to_string().contains("不可用"), "{}", err);
    }
}

#[test]
fn test_oled_rejects_images() {
    let mocks = MockDriverSource::default();
    let mut oled = mocks.left.clone();
    oled.init().unwrap();

    let image = tiny_skia::Pixmap::new(16, 16).unwrap();
    assert!(matches!(oled.show_image(&image), Err(DisplayError::UnsupportedOperation)));

    let mut lcd = mocks.lcd.clone();
    lcd.init().unwrap();
    assert!(lcd.show_image(&image).is_ok());
    assert_eq!(mocks.lcd.state().lock().unwrap().image_count, 1);
}

#[test]
fn test_render_before_init_is_an_error() {
    let mut lcd = MockDriverSource::default().lcd;
    assert!(lcd.clear().is_ok());
    assert!(matches!(lcd.show_lines(&lines(&["x"]), 14), Err(DisplayError::NotInitialized)));
}
