/*
 *  main.rs
 *
 *  rascode - triple screen status panels
 *  (c) 2025-26 rascode contributors
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

use anyhow::Context;
use clap::Parser;
use log::info;

use rascode::config::{self, Cli, Mode};
use rascode::{logging, runner};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::load(&cli).context("loading configuration")?;

    if cli.dump_config {
        print!("{}", serde_yaml::to_string(&config).context("serializing configuration")?);
        return Ok(());
    }

    logging::init(&config.log_level);
    info!("v.{} built {} ({})", env!("CARGO_PKG_VERSION"), BUILD_DATE, BUILD_PROFILE);
    info!("environment {}, log level {}", config.env.as_str(), config.log_level);

    match cli.mode.clone().unwrap_or(Mode::Dashboard) {
        Mode::Dashboard => runner::run_dashboard(&config, config.display.lcd_enabled).await,
        Mode::OledDashboard => runner::run_dashboard(&config, false).await,
        Mode::MainScreen => runner::run_main_screen(&config).await,
        Mode::Probe => runner::run_probe(&config),
        Mode::Image { path } => runner::run_image(&config, &path),
        Mode::Serve => runner::run_serve(&config).await,
    }
}
