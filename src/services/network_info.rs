/*
 *  services/network_info.rs
 *
 *  rascode - triple screen status panels
 *  (c) 2025-26 rascode contributors
 *
 *  Time and network snapshot for the right OLED
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
use std::net::{IpAddr, Ipv4Addr};

use chrono::{Local, NaiveDateTime};
use local_ip_address::{list_afinet_netifas, local_ip};
use log::debug;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkInfo {
    pub ip_address: Option<String>,
    pub is_up: bool,
    pub active_interface: Option<String>,
}

impl NetworkInfo {
    pub fn new(ip_address: Option<&str>, is_up: bool, active_interface: Option<&str>) -> Self {
        Self {
            ip_address: ip_address.map(str::to_string),
            is_up,
            active_interface: active_interface.map(str::to_string),
        }
    }
}

/// IFF_UP from `/sys/class/net/<iface>/flags` (hex).
fn interface_is_up(iface: &str) -> bool {
    fs::read_to_string(format!("/sys/class/net/{}/flags", iface))
        .ok()
        .and_then(|s| i64::from_str_radix(s.trim().trim_start_matches("0x"), 16).ok())
        .map(|flags| flags & libc::IFF_UP as i64 != 0)
        .unwrap_or(false)
}

/// First interface that is up and carries a non-loopback IPv4 address,
/// in enumeration order.
pub fn select_interface<F>(entries: &[(String, IpAddr)], is_up: F) -> Option<(String, Ipv4Addr)>
where
    F: Fn(&str) -> bool,
{
    entries.iter().find_map(|(name, addr)| match addr {
        IpAddr::V4(v4) if !v4.is_loopback() && is_up(name) => Some((name.clone(), *v4)),
        _ => None,
    })
}

/// Scan interfaces, falling back to a single best-effort lookup.
///
/// Never fails: without connectivity every field is empty/false.
pub fn collect_network_info() -> NetworkInfo {
    let entries = list_afinet_netifas().unwrap_or_else(|e| {
        debug!("interface enumeration failed: {}", e);
        Vec::new()
    });

    if let Some((iface, ip)) = select_interface(&entries, interface_is_up) {
        return NetworkInfo {
            ip_address: Some(ip.to_string()),
            is_up: true,
            active_interface: Some(iface),
        };
    }

    match local_ip() {
        Ok(IpAddr::V4(ip)) if !ip.is_loopback() => NetworkInfo {
            ip_address: Some(ip.to_string()),
            is_up: true,
            active_interface: None,
        },
        _ => NetworkInfo::default(),
    }
}

/// Three lines for the 128x64 OLED: time, address, interface status.
///
/// Reads the local clock only when `now` is `None`.
pub fn format_time_network_for_oled(net: &NetworkInfo, now: Option<NaiveDateTime>) -> Vec<String> {
    let now = now.unwrap_or_else(|| Local::now().naive_local());

    let ip = match &net.ip_address {
        Some(ip) if !ip.is_empty() => format!("IP   {}", ip),
        _ => "IP   N/A".to_string(),
    };
    let iface = match &net.active_interface {
        Some(name) if !name.is_empty() => {
            format!("IF   {} {}", name, if net.is_up { "UP" } else { "DOWN" })
        }
        _ => "IF   NONE".to_string(),
    };

    vec![now.format("TIME %H:%M:%S").to_string(), ip, iface]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 2, 16).unwrap().and_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_format_connected() {
        let net = NetworkInfo::new(Some("192.168.1.1"), true, Some("eth0"));
        assert_eq!(
            format_time_network_for_oled(&net, Some(at(14, 30, 0))),
            vec!["TIME 14:30:00", "IP   192.168.1.1", "IF   eth0 UP"]
        );
    }

    #[test]
    fn test_format_offline() {
        let lines = format_time_network_for_oled(&NetworkInfo::default(), Some(at(0, 0, 5)));
        assert_eq!(lines, vec!["TIME 00:00:05", "IP   N/A", "IF   NONE"]);
    }

    #[test]
    fn test_format_down_interface() {
        let net = NetworkInfo::new(Some("10.0.0.2"), false, Some("wlan0"));
        let lines = format_time_network_for_oled(&net, Some(at(9, 5, 1)));
        assert_eq!(lines[2], "IF   wlan0 DOWN");
    }

    #[test]
    fn test_select_skips_loopback_and_down() {
        let entries = vec![
            ("lo".to_string(), IpAddr::V4(Ipv4Addr::LOCALHOST)),
            ("eth0".to_string(), IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20))),
            ("wlan0".to_string(), IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7))),
        ];
        let picked = select_interface(&entries, |name| name != "eth0");
        assert_eq!(picked, Some(("wlan0".to_string(), Ipv4Addr::new(10, 0, 0, 7))));
        assert_eq!(select_interface(&entries, |_| false), None);
    }

    #[test]
    fn test_collect_never_panics() {
        let net = collect_network_info();
        if net.ip_address.is_none() {
            assert!(!net.is_up);
        }
    }
}
