/*
 *  services/monitoring.rs
 *
 *  rascode - triple screen status panels
 *  (c) 2025-26 rascode contributors
 *
 *  CPU, temperature, memory and disk snapshot for the left OLED
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

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use sysinfo::{CpuRefreshKind, Disks, MemoryRefreshKind, RefreshKind, System};

use crate::config::MonitorConfig;

/// One poll worth of system status. Percentages are within [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SystemStats {
    pub cpu_percent: f32,
    pub cpu_temp_c: Option<f32>,
    pub mem_percent: f32,
    pub disk_percent: f32,
}

/// Keeps the sysinfo handles between polls so CPU usage is measured
/// across the poll interval.
pub struct SystemMonitor {
    system: System,
    disks: Disks,
    disk_path: PathBuf,
    thermal_paths: Vec<PathBuf>,
}

impl SystemMonitor {
    pub fn new(config: &MonitorConfig) -> Self {
        let system = System::new_with_specifics(
            RefreshKind::new()
                .with_cpu(CpuRefreshKind::new().with_cpu_usage())
                .with_memory(MemoryRefreshKind::new().with_ram()),
        );

        Self {
            system,
            disks: Disks::new_with_refreshed_list(),
            disk_path: PathBuf::from(&config.disk_path),
            thermal_paths: config.thermal_paths.clone(),
        }
    }

    /// Take a snapshot. Never fails; missing sources read as 0 or `None`.
    pub fn collect(&mut self) -> SystemStats {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();
        self.disks.refresh();

        let stats = SystemStats {
            cpu_percent: clamp_percent(self.system.global_cpu_usage()),
            cpu_temp_c: read_cpu_temp(&self.thermal_paths),
            mem_percent: clamp_percent(percent_used(
                self.system.total_memory(),
                self.system.available_memory(),
            )),
            disk_percent: clamp_percent(self.disk_percent()),
        };
        debug!("{:?}", stats);
        stats
    }

    /// Usage of the filesystem holding `disk_path` (longest matching mount).
    fn disk_percent(&self) -> f32 {
        self.disks
            .iter()
            .filter(|d| self.disk_path.starts_with(d.mount_point()))
            .max_by_key(|d| d.mount_point().as_os_str().len())
            .map(|d| percent_used(d.total_space(), d.available_space()))
            .unwrap_or(0.0)
    }
}

fn percent_used(total: u64, available: u64) -> f32 {
    if total == 0 {
        return 0.0;
    }
    let used = total.saturating_sub(available);
    (used as f64 / total as f64 * 100.0) as f32
}

fn clamp_percent(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 100.0) }
}

/// First readable thermal zone, millidegrees to degrees Celsius.
pub fn read_cpu_temp<P: AsRef<Path>>(paths: &[P]) -> Option<f32> {
    paths.iter().find_map(|p| {
        let raw = fs::read_to_string(p).ok()?;
        let milli: f32 = raw.trim().parse().ok()?;
        Some(milli / 1000.0)
    })
}

/// Four lines for the 128x64 OLED: CPU, temperature, memory, disk.
pub fn format_stats_for_oled(stats: &SystemStats) -> Vec<String> {
    let temp = match stats.cpu_temp_c {
        Some(t) => format!("T:   {:5.1} C", t),
        None => "T:   N/A".to_string(),
    };
    vec![
        format!("CPU: {:5.1}%", stats.cpu_percent),
        temp,
        format!("MEM: {:5.1}%", stats.mem_percent),
        format!("DSK: {:5.1}%", stats.disk_percent),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_with_temperature() {
        let stats = SystemStats { cpu_percent: 12.34, cpu_temp_c: Some(48.26), mem_percent: 5.0, disk_percent: 100.0 };
        assert_eq!(
            format_stats_for_oled(&stats),
            vec!["CPU:  12.3%", "T:    48.3 C", "MEM:   5.0%", "DSK: 100.0%"]
        );
    }

    #[test]
    fn test_format_without_temperature() {
        let stats = SystemStats { cpu_temp_c: None, ..Default::default() };
        let lines = format_stats_for_oled(&stats);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "T:   N/A");
    }

    #[test]
    fn test_percent_helpers() {
        assert_eq!(percent_used(0, 0), 0.0);
        assert_eq!(percent_used(200, 50), 75.0);
        assert_eq!(percent_used(100, 500), 0.0);
        assert_eq!(clamp_percent(150.0), 100.0);
        assert_eq!(clamp_percent(f32::NAN), 0.0);
    }

    #[test]
    fn test_read_cpu_temp_from_file() {
        let dir = std::env::temp_dir().join(format!("rascode-thermal-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let good = dir.join("temp");
        fs::write(&good, "53125\n").unwrap();

        let missing = dir.join("nope");
        assert_eq!(read_cpu_temp(&[missing.clone(), good]), Some(53.125));
        assert_eq!(read_cpu_temp(&[missing]), None);

        fs::remove_dir_all(&dir).ok();
    }
}
