/*
 *  runner.rs
 *
 *  rascode - triple screen status panels
 *  (c) 2025-26 rascode contributors
 *
 *  Presentation loops and one-shot commands
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

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context};
use chrono::{Local, NaiveDateTime};
use log::{error, info, warn};
use tokio::signal::unix::{signal, SignalKind};

use crate::config::AppConfig;
use crate::constants::TOOL_OK;
use crate::dashboard::{title_lines, DashboardFrame};
use crate::display::error::remediation;
use crate::display::factory::DisplayDriverFactory;
use crate::display::registry::{reply, DisplayRegistry};
use crate::services::monitoring::SystemMonitor;
use crate::svgimage::render_svg_file;
use crate::tools::server::ToolServer;
use crate::tools::DisplayTools;

/// Asynchronously waits for a SIGINT, SIGTERM, or SIGHUP signal.
pub async fn signal_handler() -> Result<(), Box<dyn std::error::Error>> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

/// Drive `work` until it finishes or a termination signal arrives.
pub async fn until_signal<F: Future>(work: F) {
    tokio::select! {
        _ = async {
            if let Err(e) = signal_handler().await {
                warn!("signal handlers unavailable: {}", e);
                std::future::pending::<()>().await;
            }
        } => {}
        _ = work => {}
    }
}

/// Registry over the configured backend.
pub fn build_registry(config: &AppConfig, lcd_enabled: bool) -> DisplayRegistry {
    let factory = DisplayDriverFactory::new(&config.display, config.env);
    DisplayRegistry::new(Box::new(factory), lcd_enabled)
}

/// Registry for the modes that only draw on the main LCD.
pub fn build_lcd_registry(config: &AppConfig) -> DisplayRegistry {
    build_registry(config, config.display.lcd_enabled).without_oleds()
}

/// Logs a diagnostic once per screen until it changes or clears.
#[derive(Debug, Default)]
pub struct WarnOnce {
    last: HashMap<&'static str, String>,
}

impl WarnOnce {
    /// Record a tool reply; returns true when it was logged.
    pub fn note(&mut self, screen: &'static str, text: &str) -> bool {
        if text == TOOL_OK {
            self.last.remove(screen);
            return false;
        }
        if self.last.get(screen).is_some_and(|prev| prev == text) {
            return false;
        }
        warn!("{}: {}", screen, text);
        self.last.insert(screen, text.to_string());
        true
    }
}

fn nothing_available(registry: &DisplayRegistry) -> anyhow::Error {
    let reason = registry.init_error().unwrap_or("no display configured").to_string();
    match remediation(&reason) {
        Some(hint) => {
            error!("{}", hint);
            anyhow!("no display available: {} ({})", reason, hint)
        }
        None => anyhow!("no display available: {}", reason),
    }
}

/// Push one frame's OLED panels.
pub fn dashboard_tick(registry: &mut DisplayRegistry, frame: &DashboardFrame, warned: &mut WarnOnce) {
    warned.note("left", &reply(registry.show_left_oled(&frame.left)));
    warned.note("right", &reply(registry.show_right_oled(&frame.right)));
}

/// Title on the LCD (when enabled), stats and time/network on the OLEDs,
/// refreshed every `refresh_interval_ms` until a signal arrives.
pub async fn run_dashboard(config: &AppConfig, lcd_enabled: bool) -> anyhow::Result<()> {
    let mut registry = build_registry(config, lcd_enabled);
    let mut monitor = SystemMonitor::new(&config.monitor);
    let interval = Duration::from_millis(config.monitor.refresh_interval_ms);

    if !registry.ensure_displays() {
        return Err(nothing_available(&registry));
    }

    let mut warned = WarnOnce::default();
    if lcd_enabled {
        warned.note("main", &reply(registry.show_main_text(&title_lines())));
    }
    info!("dashboard running, refresh every {:?}", interval);

    until_signal(async {
        loop {
            let frame = DashboardFrame::collect(&mut monitor);
            dashboard_tick(&mut registry, &frame, &mut warned);
            tokio::time::sleep(interval).await;
        }
    })
    .await;

    registry.shutdown();
    Ok(())
}

/// Clock panel for the LCD check.
pub fn main_screen_lines(now: NaiveDateTime) -> Vec<String> {
    vec![
        "Rascode Main LCD".to_string(),
        "----------------".to_string(),
        String::new(),
        now.format("  %Y-%m-%d").to_string(),
        now.format("  %H:%M:%S").to_string(),
        String::new(),
        "Ctrl+C exit".to_string(),
    ]
}

/// LCD only: a clock, refreshed every second.
pub async fn run_main_screen(config: &AppConfig) -> anyhow::Result<()> {
    let mut registry = build_lcd_registry(config);
    registry.ensure_displays();
    if !registry.main_slot().is_ready() {
        return Err(nothing_available(&registry));
    }

    let mut warned = WarnOnce::default();
    until_signal(async {
        loop {
            let lines = main_screen_lines(Local::now().naive_local());
            warned.note("main", &reply(registry.show_main_text(&lines)));
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    })
    .await;

    registry.shutdown();
    Ok(())
}

/// Outcome of the one-shot LCD test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub result: String,
    pub hint: Option<&'static str>,
}

impl ProbeReport {
    pub fn ok(&self) -> bool {
        self.result == TOOL_OK
    }
}

/// Write a test pattern to the LCD and report what happened.
pub fn probe(registry: &mut DisplayRegistry) -> ProbeReport {
    let lines = vec!["Test".to_string(), "OK".to_string()];
    let result = reply(registry.show_main_text(&lines));
    let hint = if result == TOOL_OK { None } else { remediation(&result) };
    ProbeReport { result, hint }
}

pub fn run_probe(config: &AppConfig) -> anyhow::Result<()> {
    let mut registry = build_lcd_registry(config);
    let report = probe(&mut registry);

    println!("Result: {}", report.result);
    if let Some(hint) = report.hint {
        println!("Hint: {}", hint);
    }
    if report.ok() {
        Ok(())
    } else {
        Err(anyhow!("main screen probe failed"))
    }
}

/// Render an SVG file on the LCD, then leave it there.
pub fn run_image(config: &AppConfig, path: &Path) -> anyhow::Result<()> {
    let lcd = &config.display.lcd;
    let (width, height) = match lcd.rotate_deg {
        90 | 270 => (lcd.height, lcd.width),
        _ => (lcd.width, lcd.height),
    };
    let pixmap = render_svg_file(path, width, height)
        .with_context(|| format!("rendering {}", path.display()))?;

    let mut registry = build_lcd_registry(config);
    let result = reply(registry.show_main_image(&pixmap));
    println!("Result: {}", result);
    if result == TOOL_OK {
        Ok(())
    } else {
        if let Some(hint) = remediation(&result) {
            println!("Hint: {}", hint);
        }
        Err(anyhow!("image not shown"))
    }
}

/// JSON-RPC tool server on stdin/stdout.
pub async fn run_serve(config: &AppConfig) -> anyhow::Result<()> {
    let registry = build_registry(config, config.display.lcd_enabled);
    let tools = DisplayTools::new(registry, SystemMonitor::new(&config.monitor));
    let mut server = ToolServer::new(tools);
    info!("tool server ready on stdio");

    let mut io_result = Ok(());
    until_signal(async {
        let reader = tokio::io::BufReader::new(tokio::io::stdin());
        io_result = server.serve(reader, tokio::io::stdout()).await;
    })
    .await;

    server.tools_mut().shutdown();
    io_result.context("tool transport")
}
