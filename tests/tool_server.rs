/*
 *  tests/tool_server.rs
 *
 *  rascode - triple screen status panels
 *  (c) 2025-26 rascode contributors
 *
 *  JSON-RPC tool transport over mock and unreachable displays
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

use rascode::config::{AppEnvironment, DisplayBackend, DisplayConfig, MonitorConfig};
use rascode::display::{DisplayDriverFactory, DisplayRegistry, MockDriverSource, RegistryState};
use rascode::services::SystemMonitor;
use rascode::tools::server::ToolServer;
use rascode::tools::{DisplayTools, TOOL_NAMES};
use serde_json::{json, Value};

fn mock_server() -> (ToolServer, MockDriverSource) {
    let source = MockDriverSource::default();
    let registry = DisplayRegistry::new(Box::new(source.clone()), true);
    let tools = DisplayTools::new(registry, SystemMonitor::new(&MonitorConfig::default()));
    (ToolServer::new(tools), source)
}

fn offline_tools() -> DisplayTools {
    let mut config = DisplayConfig { backend: Some(DisplayBackend::Hardware), ..Default::default() };
    config.lcd.spi_bus = "/nonexistent/spidev9.9".to_string();
    config.lcd.gpio_chip = "/nonexistent/gpiochip9".to_string();
    config.oled.i2c_bus = "/nonexistent/i2c-9".to_string();
    let factory = DisplayDriverFactory::new(&config, AppEnvironment::Prod);
    DisplayTools::new(
        DisplayRegistry::new(Box::new(factory), true),
        SystemMonitor::new(&MonitorConfig::default()),
    )
}

fn call(server: &mut ToolServer, id: u64, name: &str, args: Value) -> Value {
    let request = json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": name, "arguments": args },
    });
    let reply = server.handle_line(&request.to_string()).unwrap();
    serde_json::from_str(&reply).unwrap()
}

#[test]
fn test_lists_exactly_five_tools() {
    let (mut server, _) = mock_server();
    let reply = server.handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#).unwrap();
    let reply: Value = serde_json::from_str(&reply).unwrap();

    let tools = reply["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 5);
    let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names, TOOL_NAMES);
    assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));
}

#[test]
fn test_session_against_mock_displays() {
    let (mut server, source) = mock_server();
    let init = server
        .handle_line(r#"{"jsonrpc":"2.0","id":0,"method":"initialize","params":{"protocolVersion":"2024-11-05"}}"#)
        .unwrap();
    assert!(init.contains("rascode-triple-screen"));
    assert!(server.handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).is_none());

    let r = call(&mut server, 1, "show_main_text", json!({"lines": ["Build", "passed"]}));
    assert_eq!(r["result"]["content"][0]["text"], "ok");
    assert_eq!(r["result"]["isError"], false);
    assert_eq!(source.lcd.state().lock().unwrap().last_lines, vec!["Build", "passed"]);

    let r = call(&mut server, 2, "show_right_oled", json!({"lines": ["12:00"]}));
    assert_eq!(r["result"]["content"][0]["text"], "ok");

    let r = call(&mut server, 3, "clear_screen", json!({"screen": "right"}));
    assert_eq!(r["result"]["content"][0]["text"], "ok");
    assert!(source.right.state().lock().unwrap().last_lines.is_empty());

    let r = call(&mut server, 4, "restore_dashboard", json!({}));
    assert_eq!(r["result"]["content"][0]["text"], "ok");
    assert_eq!(source.right.state().lock().unwrap().last_lines.len(), 3);
    assert_eq!(source.left.state().lock().unwrap().last_lines.len(), 4);
}

#[test]
fn test_bad_arguments_are_invalid_params() {
    let (mut server, _) = mock_server();
    let r = call(&mut server, 9, "clear_screen", json!({"screen": "middle"}));
    assert_eq!(r["error"]["code"], -32602);
    let r = call(&mut server, 10, "show_left_oled", json!({}));
    assert_eq!(r["error"]["code"], -32602);
}

#[test]
fn test_every_tool_reports_missing_hardware() {
    let mut tools = offline_tools();
    let replies = [
        tools.call("show_main_text", &json!({"lines": ["a"]})).unwrap(),
        tools.call("show_left_oled", &json!({"lines": ["b"]})).unwrap(),
        tools.call("show_right_oled", &json!({"lines": ["c"]})).unwrap(),
        tools.call("clear_screen", &json!({"screen": "all"})).unwrap(),
        tools.call("restore_dashboard", &json!({})).unwrap(),
    ];
    for reply in replies {
        assert!(!reply.is_empty());
        assert!(reply.contains("不可用") || reply.contains("失败"), "{}", reply);
    }
    assert_eq!(tools.registry().state(), RegistryState::Settled);
    assert!(tools.registry().init_error().is_some());
}

#[test]
fn test_offline_call_is_flagged_as_error() {
    let mut server = ToolServer::new(offline_tools());
    let r = call(&mut server, 1, "show_main_text", json!({"lines": ["a"]}));
    assert_eq!(r["result"]["isError"], true);
    assert!(r["result"]["content"][0]["text"].as_str().unwrap().starts_with("主屏不可用："));
}
