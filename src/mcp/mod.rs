//! MCP (Model Context Protocol) server implementation.
//!
//! This module provides:
//! - `threads-mcp mcp serve` - Start the stdio MCP server
//! - `threads-mcp mcp manifest` - Output tool and resource definitions
//!
//! Messages are newline-delimited JSON-RPC 2.0. Stdout carries only protocol
//! traffic; diagnostics go through `tracing` to stderr.

pub mod resources;
pub mod tools;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::io::{BufRead, Write};
use tracing::{debug, info, warn};

use crate::Result;
use crate::storage::Store;
use tools::ToolError;

/// Protocol version reported when the client does not name one.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

pub const SERVER_NAME: &str = "threads-mcp";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

/// Incoming JSON-RPC request or notification.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[serde(default)]
    jsonrpc: String,
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

/// Outgoing JSON-RPC response.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    jsonrpc: &'static str,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

impl JsonRpcResponse {
    fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Result payload of `tools/call`.
#[derive(Debug, Serialize)]
struct ToolResult {
    content: Vec<Content>,
    #[serde(rename = "isError", skip_serializing_if = "std::ops::Not::not")]
    is_error: bool,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Content {
    Text { text: String },
}

impl ToolResult {
    fn text(text: String, is_error: bool) -> Self {
        Self {
            content: vec![Content::Text { text }],
            is_error,
        }
    }

    fn from_outcome(outcome: std::result::Result<Value, ToolError>) -> Self {
        match outcome {
            Ok(value) => Self::text(pretty(&value), false),
            Err(e) => Self::text(pretty(&json!({ "error": e.to_string() })), true),
        }
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Stdio MCP server over a single store.
pub struct McpServer {
    store: Store,
}

impl McpServer {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Serve requests line by line until `reader` reaches EOF.
    pub fn run<R: BufRead, W: Write>(&self, mut reader: R, mut writer: W) -> Result<()> {
        info!(data_file = %self.store.paths().data_file.display(), "MCP server running");

        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let response = match std::str::from_utf8(&buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.handle_line(line.trim()),
                Err(e) => {
                    warn!(error = %e, "non UTF-8 input line");
                    Some(JsonRpcResponse::error(
                        Value::Null,
                        PARSE_ERROR,
                        format!("Parse error: {}", e),
                    ))
                }
            };
            if let Some(response) = response {
                serde_json::to_writer(&mut writer, &response)?;
                writer.write_all(b"\n")?;
                writer.flush()?;
            }
        }

        info!("stdin closed, shutting down");
        Ok(())
    }

    /// Handle one raw message. Notifications produce no response.
    pub fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    PARSE_ERROR,
                    format!("Parse error: {}", e),
                ));
            }
        };

        if request.jsonrpc != "2.0" {
            return request.id.map(|id| {
                JsonRpcResponse::error(id, INVALID_REQUEST, "Invalid JSON-RPC version")
            });
        }

        let Some(id) = request.id.clone() else {
            debug!(method = %request.method, "notification");
            return None;
        };

        debug!(method = %request.method, "dispatching request");
        Some(self.handle_request(id, &request.method, &request.params))
    }

    fn handle_request(&self, id: Value, method: &str, params: &Value) -> JsonRpcResponse {
        match method {
            "initialize" => JsonRpcResponse::success(id, initialize_result(params)),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => {
                let tools: Vec<Value> = tools::get_tools().iter().map(|t| t.to_json()).collect();
                JsonRpcResponse::success(id, json!({ "tools": tools }))
            }
            "tools/call" => self.handle_tools_call(id, params),
            "resources/list" => match resources::list_resources(&self.store) {
                Ok(resources) => JsonRpcResponse::success(id, json!({ "resources": resources })),
                Err(e) => JsonRpcResponse::error(id, resources::INTERNAL_ERROR, e.to_string()),
            },
            "resources/read" => self.handle_resources_read(id, params),
            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", method),
            ),
        }
    }

    fn handle_tools_call(&self, id: Value, params: &Value) -> JsonRpcResponse {
        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing tool name in params");
        };
        let args = params.get("arguments").cloned().unwrap_or(Value::Null);

        let outcome = tools::call_tool(&self.store, name, args);
        if let Err(ref e) = outcome {
            warn!(tool = name, error = %e, "tool call failed");
        }

        match serde_json::to_value(ToolResult::from_outcome(outcome)) {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => JsonRpcResponse::error(id, resources::INTERNAL_ERROR, e.to_string()),
        }
    }

    fn handle_resources_read(&self, id: Value, params: &Value) -> JsonRpcResponse {
        let Some(uri) = params.get("uri").and_then(Value::as_str) else {
            return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing uri in params");
        };

        match resources::read_resource(&self.store, uri) {
            Ok(contents) => JsonRpcResponse::success(id, json!({ "contents": [contents] })),
            Err(e) => {
                warn!(uri, error = %e, "resource read failed");
                JsonRpcResponse::error(id, e.code(), e.to_string())
            }
        }
    }
}

fn initialize_result(params: &Value) -> Value {
    let version = params
        .get("protocolVersion")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PROTOCOL_VERSION);
    json!({
        "protocolVersion": version,
        "capabilities": {
            "tools": {},
            "resources": {},
        },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

/// Start the MCP stdio server.
pub fn serve(store: Store) -> Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    McpServer::new(store).run(stdin.lock(), stdout.lock())
}

/// Tool and resource definitions as one JSON document.
pub fn manifest() -> Value {
    let tools: Vec<Value> = tools::get_tools().iter().map(|t| t.to_json()).collect();
    json!({
        "name": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "tools": tools,
        "resources": resources::static_resources(),
    })
}
