/*
 *  tools/mod.rs
 *
 *  rascode - triple screen status panels
 *  (c) 2025-26 rascode contributors
 *
 *  Display operations exposed to out-of-process callers
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

pub mod server;

use log::debug;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::dashboard::DashboardFrame;
use crate::display::registry::{reply, DisplayRegistry, ScreenSelector};
use crate::services::monitoring::SystemMonitor;

/// Tool names, in the order `tools/list` reports them.
pub const TOOL_NAMES: [&str; 5] = [
    "show_main_text",
    "show_left_oled",
    "show_right_oled",
    "clear_screen",
    "restore_dashboard",
];

/// A call that never reached the displays.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolCallError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

fn lines_schema(max_items: usize) -> Value {
    json!({
        "type": "object",
        "properties": {
            "lines": {
                "type": "array",
                "items": { "type": "string" },
                "maxItems": max_items,
                "description": "Lines to show, top to bottom"
            }
        },
        "required": ["lines"]
    })
}

/// Descriptors for `tools/list`.
pub fn descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "show_main_text",
            description: "Show text on the main 2\" LCD (240x320). Up to 22 lines, 42 characters each.",
            input_schema: lines_schema(22),
        },
        ToolDescriptor {
            name: "show_left_oled",
            description: "Show text on the left 0.96\" OLED (128x64). Up to 6 lines, keep them near 16 characters.",
            input_schema: lines_schema(6),
        },
        ToolDescriptor {
            name: "show_right_oled",
            description: "Show text on the right 0.96\" OLED (128x64). Up to 6 lines, keep them near 16 characters.",
            input_schema: lines_schema(6),
        },
        ToolDescriptor {
            name: "clear_screen",
            description: "Blank a screen: main LCD, left OLED, right OLED or all three.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "screen": { "type": "string", "enum": ["main", "left", "right", "all"] }
                },
                "required": ["screen"]
            }),
        },
        ToolDescriptor {
            name: "restore_dashboard",
            description: "Restore the default dashboard: title on the LCD, CPU/temperature/memory/disk on the left OLED, time and network on the right OLED.",
            input_schema: json!({ "type": "object", "properties": {} }),
        },
    ]
}

/// The five display tools over one registry.
///
/// Every operation returns `"ok"` or a diagnostic; none of them fails.
pub struct DisplayTools {
    registry: DisplayRegistry,
    monitor: SystemMonitor,
}

impl DisplayTools {
    pub fn new(registry: DisplayRegistry, monitor: SystemMonitor) -> Self {
        Self { registry, monitor }
    }

    pub fn registry(&self) -> &DisplayRegistry {
        &self.registry
    }

    pub fn show_main_text(&mut self, lines: &[String]) -> String {
        reply(self.registry.show_main_text(lines))
    }

    pub fn show_left_oled(&mut self, lines: &[String]) -> String {
        reply(self.registry.show_left_oled(lines))
    }

    pub fn show_right_oled(&mut self, lines: &[String]) -> String {
        reply(self.registry.show_right_oled(lines))
    }

    pub fn clear_screen(&mut self, screen: ScreenSelector) -> String {
        reply(self.registry.clear_screen(screen))
    }

    pub fn restore_dashboard(&mut self) -> String {
        let frame = DashboardFrame::collect(&mut self.monitor);
        reply(self.registry.restore_dashboard(&frame))
    }

    /// Dispatch by name with JSON arguments.
    pub fn call(&mut self, name: &str, args: &Value) -> Result<String, ToolCallError> {
        debug!("tool call {} {}", name, args);
        match name {
            "show_main_text" => Ok(self.show_main_text(&lines_arg(name, args)?)),
            "show_left_oled" => Ok(self.show_left_oled(&lines_arg(name, args)?)),
            "show_right_oled" => Ok(self.show_right_oled(&lines_arg(name, args)?)),
            "clear_screen" => {
                let screen = args
                    .get("screen")
                    .and_then(Value::as_str)
                    .ok_or_else(|| invalid(name, "missing string field 'screen'"))?;
                let selector = screen
                    .parse::<ScreenSelector>()
                    .map_err(|e| invalid(name, &e.to_string()))?;
                Ok(self.clear_screen(selector))
            }
            "restore_dashboard" => Ok(self.restore_dashboard()),
            other => Err(ToolCallError::UnknownTool(other.to_string())),
        }
    }

    pub fn shutdown(&mut self) {
        self.registry.shutdown();
    }
}

fn invalid(tool: &str, reason: &str) -> ToolCallError {
    ToolCallError::InvalidArguments { tool: tool.to_string(), reason: reason.to_string() }
}

fn lines_arg(tool: &str, args: &Value) -> Result<Vec<String>, ToolCallError> {
    let lines = args
        .get("lines")
        .ok_or_else(|| invalid(tool, "missing field 'lines'"))?;
    serde_json::from_value(lines.clone())
        .map_err(|e| invalid(tool, &format!("'lines' must be an array of strings: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitorConfig;
    use crate::display::factory::MockDriverSource;

    fn tools() -> (DisplayTools, MockDriverSource) {
        let source = MockDriverSource::default();
        let registry = DisplayRegistry::new(Box::new(source.clone()), true);
        (DisplayTools::new(registry, SystemMonitor::new(&MonitorConfig::default())), source)
    }

    #[test]
    fn test_descriptors_match_names() {
        let names: Vec<_> = descriptors().iter().map(|d| d.name).collect();
        assert_eq!(names, TOOL_NAMES);
    }

    #[test]
    fn test_call_dispatch() {
        let (mut tools, source) = tools();
        let out = tools.call("show_left_oled", &json!({"lines": ["CPU", "MEM"]})).unwrap();
        assert_eq!(out, "ok");
        assert_eq!(source.left.state().lock().unwrap().last_lines, vec!["CPU", "MEM"]);

        assert_eq!(tools.call("clear_screen", &json!({"screen": "all"})).unwrap(), "ok");
        assert_eq!(tools.call("restore_dashboard", &json!({})).unwrap(), "ok");
        assert_eq!(source.lcd.state().lock().unwrap().last_lines, vec!["Rascode Dashboard", ""]);
    }

    #[test]
    fn test_bad_calls() {
        let (mut tools, _) = tools();
        assert!(matches!(tools.call("blink", &json!({})), Err(ToolCallError::UnknownTool(_))));
        assert!(matches!(
            tools.call("show_main_text", &json!({"lines": "not a list"})),
            Err(ToolCallError::InvalidArguments { .. })
        ));
        assert!(matches!(
            tools.call("clear_screen", &json!({"screen": "top"})),
            Err(ToolCallError::InvalidArguments { .. })
        ));
    }
}
