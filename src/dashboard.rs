/*
 *  dashboard.rs
 *
 *  rascode - triple screen status panels
 *  (c) 2025-26 rascode contributors
 *
 *  The steady-state frame: title on the LCD, status left, time/network right
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

use chrono::NaiveDateTime;

use crate::constants::DASHBOARD_TITLE;
use crate::services::monitoring::{format_stats_for_oled, SystemMonitor, SystemStats};
use crate::services::network_info::{collect_network_info, format_time_network_for_oled, NetworkInfo};

/// Title panel of the dashboard.
pub fn title_lines() -> Vec<String> {
    vec![DASHBOARD_TITLE.to_string(), String::new()]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardFrame {
    pub title: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
}

impl DashboardFrame {
    pub fn new(stats: &SystemStats, net: &NetworkInfo, now: Option<NaiveDateTime>) -> Self {
        Self {
            title: title_lines(),
            left: format_stats_for_oled(stats),
            right: format_time_network_for_oled(net, now),
        }
    }

    /// Poll both collectors and build the current frame.
    pub fn collect(monitor: &mut SystemMonitor) -> Self {
        let stats = monitor.collect();
        let net = collect_network_info();
        Self::new(&stats, &net, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_frame_panels() {
        let now = NaiveDate::from_ymd_opt(2025, 2, 16).unwrap().and_hms_opt(14, 30, 0).unwrap();
        let net = NetworkInfo::new(Some("192.168.1.1"), true, Some("eth0"));
        let frame = DashboardFrame::new(&SystemStats::default(), &net, Some(now));

        assert_eq!(frame.title, vec!["Rascode Dashboard", ""]);
        assert_eq!(frame.left.len(), 4);
        assert_eq!(frame.right[0], "TIME 14:30:00");
    }
}
