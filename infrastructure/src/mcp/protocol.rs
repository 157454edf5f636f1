//! JSON-RPC protocol types for MCP tool server communication.
//!
//! # Protocol Overview
//!
//! - **Requests**: Client → server (`initialize`, `tools/list`, `tools/call`)
//! - **Responses**: Server → client (result or error)
//! - **Notifications**: Client → server (`notifications/initialized`), no response

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use toolrelay_domain::{ToolDescriptor, ToolResult, ToolResultContent, ToolStatus};

/// MCP protocol revision announced during `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Global request ID counter for JSON-RPC requests.
static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    REQUEST_ID.fetch_add(1, Ordering::SeqCst)
}

/// JSON-RPC request
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl JsonRpcRequest {
    /// Creates a new JSON-RPC request with an auto-generated ID.
    pub fn new(method: impl Into<String>, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id: next_id(),
            method: method.into(),
            params,
        }
    }

    pub fn initialize() -> Self {
        Self::new(
            "initialize",
            Some(serde_json::json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION"),
                },
            })),
        )
    }

    pub fn list_tools(cursor: Option<&str>) -> Self {
        Self::new(
            "tools/list",
            cursor.map(|c| serde_json::json!({ "cursor": c })),
        )
    }

    pub fn call_tool(name: &str, arguments: serde_json::Value) -> Self {
        Self::new(
            "tools/call",
            Some(serde_json::json!({ "name": name, "arguments": arguments })),
        )
    }
}

/// Outgoing JSON-RPC notification (no `id`, no response expected)
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: &'static str,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params: None,
        }
    }

    pub fn initialized() -> Self {
        Self::new("notifications/initialized")
    }
}

/// JSON-RPC response
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub jsonrpc: String,
    pub id: Option<u64>,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
}

/// JSON-RPC error object
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Result of `initialize`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    #[serde(default)]
    pub server_info: Option<ServerInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// Tool entry of a `tools/list` result
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpTool {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "empty_object_schema")]
    pub input_schema: serde_json::Value,
}

fn empty_object_schema() -> serde_json::Value {
    serde_json::json!({ "type": "object", "properties": {} })
}

impl From<McpTool> for ToolDescriptor {
    fn from(tool: McpTool) -> Self {
        ToolDescriptor::new(
            tool.name,
            tool.description.unwrap_or_default(),
            tool.input_schema,
        )
    }
}

/// Result of `tools/list`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListToolsResult {
    pub tools: Vec<McpTool>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Result of `tools/call`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    #[serde(default)]
    pub content: Vec<serde_json::Value>,
    #[serde(default)]
    pub is_error: bool,
}

impl CallToolResult {
    /// Convert to a domain result answering `tool_use_id`.
    ///
    /// `text` blocks become text content; every other block type (image,
    /// resource, ...) is forwarded as raw JSON.
    pub fn into_tool_result(self, tool_use_id: &str) -> ToolResult {
        let content = self
            .content
            .into_iter()
            .map(|block| {
                let text = (block.get("type").and_then(|t| t.as_str()) == Some("text"))
                    .then(|| block.get("text").and_then(|t| t.as_str()))
                    .flatten();
                match text {
                    Some(text) => ToolResultContent::Text(text.to_string()),
                    None => ToolResultContent::Json(block),
                }
            })
            .collect();
        let status = if self.is_error {
            ToolStatus::Error
        } else {
            ToolStatus::Success
        };
        ToolResult::new(tool_use_id, content, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_are_unique() {
        let a = JsonRpcRequest::new("a", None);
        let b = JsonRpcRequest::new("b", None);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn initialize_request_announces_protocol() {
        let json = serde_json::to_value(JsonRpcRequest::initialize()).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["method"], "initialize");
        assert_eq!(json["params"]["protocolVersion"], PROTOCOL_VERSION);
        assert!(json["params"]["clientInfo"]["name"].is_string());
    }

    #[test]
    fn list_tools_without_cursor_omits_params() {
        let json = serde_json::to_value(JsonRpcRequest::list_tools(None)).unwrap();
        assert!(json.get("params").is_none());

        let json = serde_json::to_value(JsonRpcRequest::list_tools(Some("page2"))).unwrap();
        assert_eq!(json["params"]["cursor"], "page2");
    }

    #[test]
    fn notification_has_no_id() {
        let json = serde_json::to_value(JsonRpcNotification::initialized()).unwrap();
        assert_eq!(json["method"], "notifications/initialized");
        assert!(json.get("id").is_none());
    }

    #[test]
    fn list_tools_result_to_descriptors() {
        let result: ListToolsResult = serde_json::from_value(serde_json::json!({
            "tools": [
                {
                    "name": "get_current_time",
                    "description": "Get current time in a timezone",
                    "inputSchema": {"type": "object", "properties": {"timezone": {"type": "string"}}}
                },
                {"name": "bare"}
            ]
        }))
        .unwrap();

        let tools: Vec<ToolDescriptor> = result.tools.into_iter().map(Into::into).collect();
        assert_eq!(tools[0].name, "get_current_time");
        assert_eq!(tools[0].input_schema["properties"]["timezone"]["type"], "string");
        assert_eq!(tools[1].description, "");
        assert_eq!(tools[1].input_schema["type"], "object");
        assert!(result.next_cursor.is_none());
    }

    #[test]
    fn call_tool_result_text_and_error_flag() {
        let result: CallToolResult = serde_json::from_value(serde_json::json!({
            "content": [{"type": "text", "text": "Invalid timezone: Mars/Base"}],
            "isError": true
        }))
        .unwrap();

        let tool_result = result.into_tool_result("tooluse_1");
        assert_eq!(tool_result.tool_use_id, "tooluse_1");
        assert_eq!(tool_result.status, ToolStatus::Error);
        assert_eq!(tool_result.text(), "Invalid timezone: Mars/Base");
    }

    #[test]
    fn call_tool_result_non_text_blocks_kept_as_json() {
        let result: CallToolResult = serde_json::from_value(serde_json::json!({
            "content": [{"type": "image", "data": "aGk=", "mimeType": "image/png"}]
        }))
        .unwrap();

        let tool_result = result.into_tool_result("t");
        assert!(tool_result.is_success());
        assert!(matches!(
            tool_result.content()[0],
            ToolResultContent::Json(ref v) if v["mimeType"] == "image/png"
        ));
    }

    #[test]
    fn call_tool_result_empty_content_gets_placeholder() {
        let result: CallToolResult = serde_json::from_value(serde_json::json!({})).unwrap();
        let tool_result = result.into_tool_result("t");
        assert_eq!(tool_result.content().len(), 1);
    }

    #[test]
    fn response_with_error_object() {
        let response: JsonRpcResponse = serde_json::from_value(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 7,
            "error": {"code": -32602, "message": "Unknown tool: nope"}
        }))
        .unwrap();
        assert_eq!(response.id, Some(7));
        assert_eq!(response.error.unwrap().code, -32602);
    }
}
