/*
 *  tools/server.rs
 *
 *  rascode - triple screen status panels
 *  (c) 2025-26 rascode contributors
 *
 *  Newline-delimited JSON-RPC 2.0 over stdio
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

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::constants::{TOOL_OK, TOOL_PROTOCOL_VERSION, TOOL_SERVER_NAME};
use crate::tools::{descriptors, DisplayTools, ToolCallError};

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RpcError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Method not found: {0}")]
    MethodNotFound(String),
    #[error("{0}")]
    InvalidParams(String),
}

impl RpcError {
    pub fn code(&self) -> i32 {
        match self {
            RpcError::Parse(_) => PARSE_ERROR,
            RpcError::InvalidRequest(_) => INVALID_REQUEST,
            RpcError::MethodNotFound(_) => METHOD_NOT_FOUND,
            RpcError::InvalidParams(_) => INVALID_PARAMS,
        }
    }
}

impl From<ToolCallError> for RpcError {
    fn from(err: ToolCallError) -> Self {
        RpcError::InvalidParams(err.to_string())
    }
}

/// Incoming request; a missing `id` key marks a notification.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct RpcErrorObject {
    pub code: i32,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorObject>,
}

impl RpcResponse {
    fn success(id: Value, result: Value) -> Self {
        Self { jsonrpc: "2.0", id, result: Some(result), error: None }
    }

    fn failure(id: Value, err: &RpcError) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcErrorObject { code: err.code(), message: err.to_string() }),
        }
    }
}

/// Tool server: one request per line in, one response per line out.
pub struct ToolServer {
    tools: DisplayTools,
}

impl ToolServer {
    pub fn new(tools: DisplayTools) -> Self {
        Self { tools }
    }

    pub fn tools_mut(&mut self) -> &mut DisplayTools {
        &mut self.tools
    }

    /// Handle one line of input, returning the serialized response if any.
    pub fn handle_line(&mut self, line: &str) -> Option<String> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let response = match serde_json::from_str::<Value>(line) {
            Err(e) => Some(RpcResponse::failure(Value::Null, &RpcError::Parse(e.to_string()))),
            Ok(value) => self.handle_value(value),
        };

        response.and_then(|r| encode(&r))
    }

    fn handle_value(&mut self, value: Value) -> Option<RpcResponse> {
        // an explicit `"id": null` is still a request
        let raw_id = value.get("id").cloned();
        let request: RpcRequest = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                let err = RpcError::InvalidRequest(e.to_string());
                return Some(RpcResponse::failure(raw_id.unwrap_or(Value::Null), &err));
            }
        };
        if request.jsonrpc.as_deref().is_some_and(|v| v != "2.0") {
            debug!("non 2.0 jsonrpc tag on {}", request.method);
        }

        let outcome = self.dispatch(&request.method, request.params.as_ref());
        let id = match raw_id {
            Some(id) => id,
            None => {
                if let Err(e) = outcome {
                    debug!("notification {} ignored: {}", request.method, e);
                }
                return None;
            }
        };

        Some(match outcome {
            Ok(result) => RpcResponse::success(id, result),
            Err(err) => {
                debug!("request {} failed: {}", request.method, err);
                RpcResponse::failure(id, &err)
            }
        })
    }

    fn dispatch(&mut self, method: &str, params: Option<&Value>) -> Result<Value, RpcError> {
        match method {
            "initialize" => {
                if let Some(client) = params.and_then(|p| p.get("clientInfo")) {
                    info!("tool client connected: {}", client);
                }
                Ok(json!({
                    "protocolVersion": TOOL_PROTOCOL_VERSION,
                    "capabilities": { "tools": { "listChanged": false } },
                    "serverInfo": {
                        "name": TOOL_SERVER_NAME,
                        "version": env!("CARGO_PKG_VERSION"),
                    }
                }))
            }
            "notifications/initialized" => Ok(Value::Null),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": descriptors() })),
            "tools/call" => {
                let params = params.ok_or_else(|| RpcError::InvalidParams("missing params".into()))?;
                let name = params
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| RpcError::InvalidParams("missing tool name".into()))?;
                let empty = json!({});
                let args = params.get("arguments").filter(|a| !a.is_null()).unwrap_or(&empty);

                let text = self.tools.call(name, args)?;
                let is_error = text != TOOL_OK;
                if is_error {
                    warn!("{}: {}", name, text);
                }
                Ok(json!({
                    "content": [{ "type": "text", "text": text }],
                    "isError": is_error,
                }))
            }
            other => Err(RpcError::MethodNotFound(other.to_string())),
        }
    }

    /// Serve until the reader reaches end of input.
    ///
    /// A line that is not UTF-8 gets a parse error reply; serving continues.
    pub async fn serve<R, W>(&mut self, mut reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            let response = match std::str::from_utf8(&buf) {
                Ok(line) => self.handle_line(line),
                Err(e) => {
                    warn!("dropping non UTF-8 request line: {}", e);
                    encode(&RpcResponse::failure(Value::Null, &RpcError::Parse(e.to_string())))
                }
            };
            if let Some(response) = response {
                writer.write_all(response.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }
        info!("tool client closed the stream");
        Ok(())
    }
}

fn encode(response: &RpcResponse) -> Option<String> {
    match serde_json::to_string(response) {
        Ok(s) => Some(s),
        Err(e) => {
            warn!("response serialization failed: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitorConfig;
    use crate::display::factory::MockDriverSource;
    use crate::display::registry::DisplayRegistry;
    use crate::services::monitoring::SystemMonitor;

    fn server() -> ToolServer {
        let registry = DisplayRegistry::new(Box::new(MockDriverSource::default()), true);
        ToolServer::new(DisplayTools::new(registry, SystemMonitor::new(&MonitorConfig::default())))
    }

    fn roundtrip(server: &mut ToolServer, line: &str) -> Value {
        serde_json::from_str(&server.handle_line(line).unwrap()).unwrap()
    }

    #[test]
    fn test_initialize() {
        let mut s = server();
        let r = roundtrip(&mut s, r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#);
        assert_eq!(r["id"], 1);
        assert_eq!(r["result"]["serverInfo"]["name"], "rascode-triple-screen");
        assert!(r["result"]["capabilities"]["tools"].is_object());
    }

    #[test]
    fn test_notification_has_no_reply() {
        let mut s = server();
        assert!(s.handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).is_none());
        assert!(s.handle_line("   ").is_none());
    }

    #[test]
    fn test_error_codes() {
        let mut s = server();
        assert_eq!(roundtrip(&mut s, "{not json")["error"]["code"], PARSE_ERROR);
        assert_eq!(
            roundtrip(&mut s, r#"{"jsonrpc":"2.0","id":2,"method":"resources/list"}"#)["error"]["code"],
            METHOD_NOT_FOUND
        );
        assert_eq!(
            roundtrip(&mut s, r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"nope"}}"#)["error"]["code"],
            INVALID_PARAMS
        );
        assert_eq!(roundtrip(&mut s, r#"{"jsonrpc":"2.0","id":4}"#)["error"]["code"], INVALID_REQUEST);
    }

    #[test]
    fn test_null_id_is_answered() {
        let mut s = server();
        let r = roundtrip(&mut s, r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#);
        assert!(r["id"].is_null());
        assert!(r["result"].is_object());
    }

    #[test]
    fn test_tools_call_ok() {
        let mut s = server();
        let r = roundtrip(
            &mut s,
            r#"{"jsonrpc":"2.0","id":"a","method":"tools/call","params":{"name":"show_main_text","arguments":{"lines":["hello"]}}}"#,
        );
        assert_eq!(r["id"], "a");
        assert_eq!(r["result"]["content"][0]["type"], "text");
        assert_eq!(r["result"]["content"][0]["text"], "ok");
        assert_eq!(r["result"]["isError"], false);
    }

    #[tokio::test]
    async fn test_serve_stream() {
        let mut s = server();
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#, "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#, "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#, "\n",
        );
        let mut out = Vec::new();
        s.serve(input.as_bytes(), &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        let replies: Vec<Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[1]["result"]["tools"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_serve_survives_invalid_utf8() {
        let mut s = server();
        let mut input: Vec<u8> = b"\xff\xfe garbage\n".to_vec();
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":7,"method":"ping"}"#);
        input.push(b'\n');

        let mut out = Vec::new();
        s.serve(input.as_slice(), &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        let replies: Vec<Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["error"]["code"], PARSE_ERROR);
        assert_eq!(replies[1]["id"], 7);
        assert!(replies[1]["result"].is_object());
    }
}
