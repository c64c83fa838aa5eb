/*
 *  logging.rs
 *
 *  rascode - triple screen status panels
 *  (c) 2025-26 rascode contributors
 *
 *  Logger setup
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

use env_logger::{Env, Target};

const LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Known level name, or `info`.
pub fn normalize_level(level: &str) -> &'static str {
    let level = level.trim().to_ascii_lowercase();
    let level = if level == "warning" { "warn".to_string() } else { level };
    LEVELS.iter().copied().find(|l| *l == level).unwrap_or("info")
}

/// Initialize the global logger once. `RUST_LOG` wins over `level`.
///
/// Logs go to stderr; stdout belongs to the tool transport.
/// Returns false if a logger was already installed.
pub fn init(level: &str) -> bool {
    env_logger::Builder::from_env(Env::default().default_filter_or(normalize_level(level)))
        .format_timestamp_secs()
        .target(Target::Stderr)
        .try_init()
        .is_ok()
}
