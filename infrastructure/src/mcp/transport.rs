//! Transport layer for MCP tool servers.
//!
//! - [`McpTransport`]: closed set of supported transports. Adding a variant
//!   means adding a match arm here, nowhere else.
//! - [`classify_message`]: pure function that inspects `id` / `method` of an
//!   incoming frame.

use super::lambda::LambdaTransport;
use super::protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};
use super::stdio::StdioTransport;
use toolrelay_domain::{ConnectionError, TransportConfig};

/// Classification of an incoming JSON-RPC message.
#[derive(Debug, PartialEq, Eq)]
pub enum MessageKind {
    /// A response to a request we sent (has `id`, no `method`). Our ids are
    /// numeric, so any other id type carries `None`.
    Response { id: Option<u64> },
    /// An error the server could not tie to a request (`"id": null`), e.g. a
    /// parse error for the line we just wrote.
    UnattributedError,
    /// A request from the server (has `id` + `method`), e.g. `ping`. The id
    /// is echoed back as-is, so string ids are kept.
    IncomingRequest { id: serde_json::Value },
    /// A notification (has `method`, no `id`), e.g. log messages.
    Notification,
}

/// Classify a JSON-RPC message by inspecting `id`, `method` and `error`.
pub fn classify_message(json: &serde_json::Value) -> MessageKind {
    let id = json.get("id").filter(|v| !v.is_null());
    let method = json.get("method").and_then(|v| v.as_str());

    match (id, method) {
        (Some(id), Some(_)) => MessageKind::IncomingRequest { id: id.clone() },
        (Some(id), None) => MessageKind::Response { id: id.as_u64() },
        (None, None) if json.get("error").is_some() => MessageKind::UnattributedError,
        _ => MessageKind::Notification,
    }
}

/// An established connection to one tool server.
pub enum McpTransport {
    Stdio(StdioTransport),
    Lambda(LambdaTransport),
}

impl McpTransport {
    /// Open the transport described by `config`.
    pub async fn connect(
        provider: &str,
        config: &TransportConfig,
    ) -> Result<Self, ConnectionError> {
        match config {
            TransportConfig::Stdio(stdio) => Ok(Self::Stdio(StdioTransport::spawn(provider, stdio)?)),
            TransportConfig::Lambda(lambda) => Ok(Self::Lambda(
                LambdaTransport::connect(provider, lambda).await?,
            )),
        }
    }

    pub async fn request(
        &mut self,
        request: &JsonRpcRequest,
    ) -> Result<JsonRpcResponse, ConnectionError> {
        match self {
            Self::Stdio(t) => t.request(request).await,
            Self::Lambda(t) => t.request(request).await,
        }
    }

    pub async fn notify(&mut self, notification: &JsonRpcNotification) -> Result<(), ConnectionError> {
        match self {
            Self::Stdio(t) => t.notify(notification).await,
            Self::Lambda(t) => t.notify(notification).await,
        }
    }

    pub async fn close(&mut self) -> Result<(), ConnectionError> {
        match self {
            Self::Stdio(t) => t.close().await,
            Self::Lambda(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_response() {
        let json = serde_json::json!({"jsonrpc": "2.0", "id": 1, "result": {}});
        assert_eq!(classify_message(&json), MessageKind::Response { id: Some(1) });
    }

    #[test]
    fn classify_response_with_foreign_id() {
        let json = serde_json::json!({"jsonrpc": "2.0", "id": "abc", "result": {}});
        assert_eq!(classify_message(&json), MessageKind::Response { id: None });
    }

    #[test]
    fn classify_null_id_error() {
        let json = serde_json::json!({
            "jsonrpc": "2.0",
            "id": null,
            "error": {"code": -32700, "message": "Parse error"}
        });
        assert_eq!(classify_message(&json), MessageKind::UnattributedError);
    }

    #[test]
    fn classify_incoming_request() {
        let json = serde_json::json!({"id": 3, "method": "ping"});
        assert_eq!(
            classify_message(&json),
            MessageKind::IncomingRequest { id: serde_json::json!(3) }
        );
    }

    #[test]
    fn classify_incoming_request_with_string_id() {
        let json = serde_json::json!({"id": "srv-1", "method": "ping"});
        assert_eq!(
            classify_message(&json),
            MessageKind::IncomingRequest { id: serde_json::json!("srv-1") }
        );
    }

    #[test]
    fn classify_notification() {
        let json = serde_json::json!({"method": "notifications/message", "params": {}});
        assert_eq!(classify_message(&json), MessageKind::Notification);
    }

    #[test]
    fn classify_no_id_no_method() {
        let json = serde_json::json!({"data": "something"});
        assert_eq!(classify_message(&json), MessageKind::Notification);
    }
}
