//! MCP tool provider
//!
//! [`McpToolProvider`] implements the domain [`ToolProvider`] port on top of
//! an [`McpTransport`]. The transport sits behind an async mutex, so each
//! provider has at most one request in flight.
//!
//! Handshake: `initialize` request → `notifications/initialized`.
//! Catalog: `tools/list` (all pages). Invocation: `tools/call`.

use super::protocol::{
    CallToolResult, InitializeResult, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    ListToolsResult,
};
use super::transport::McpTransport;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Mutex as StdMutex;
use tokio::sync::Mutex;
use toolrelay_domain::{
    ConnectionError, ConnectionState, ServerConfig, ToolDescriptor, ToolProvider, ToolResult,
};
use tracing::{debug, info, warn};

pub struct McpToolProvider {
    config: ServerConfig,
    state: StdMutex<ConnectionState>,
    transport: Mutex<Option<McpTransport>>,
}

impl McpToolProvider {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            state: StdMutex::new(ConnectionState::Uninitialized),
            transport: Mutex::new(None),
        }
    }

    /// Build one provider per server entry, preserving order.
    pub fn from_configs(configs: &[ServerConfig]) -> Vec<Box<dyn ToolProvider>> {
        configs
            .iter()
            .map(|c| Box::new(Self::new(c.clone())) as Box<dyn ToolProvider>)
            .collect()
    }

    fn set_state(&self, state: ConnectionState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }

    fn require_ready(&self) -> Result<(), ConnectionError> {
        let state = self.state();
        if state != ConnectionState::Ready {
            return Err(ConnectionError::invalid_state(
                &self.config.name,
                ConnectionState::Ready,
                state,
            ));
        }
        Ok(())
    }

    async fn handshake(&self, transport: &mut McpTransport) -> Result<(), ConnectionError> {
        let response = transport.request(&JsonRpcRequest::initialize()).await?;
        let result: InitializeResult =
            self.parse_result(response)
                .map_err(|e| ConnectionError::Handshake {
                    provider: self.config.name.clone(),
                    message: e.to_string(),
                })?;

        info!(
            provider = %self.config.name,
            protocol = %result.protocol_version,
            server = %result.server_info.as_ref().map(|s| s.name.as_str()).unwrap_or("unknown"),
            "MCP handshake complete"
        );

        transport.notify(&JsonRpcNotification::initialized()).await
    }

    /// Unwrap the `result` of a response, turning an error object into
    /// [`ConnectionError::Rpc`].
    fn parse_result<T: DeserializeOwned>(
        &self,
        response: JsonRpcResponse,
    ) -> Result<T, ConnectionError> {
        if let Some(error) = response.error {
            return Err(ConnectionError::Rpc {
                provider: self.config.name.clone(),
                code: error.code,
                message: error.message,
            });
        }
        let result = response.result.unwrap_or(serde_json::Value::Null);
        serde_json::from_value(result).map_err(|e| ConnectionError::Protocol {
            provider: self.config.name.clone(),
            message: format!("Unexpected result shape: {}", e),
        })
    }

    /// Validate the config, open the transport and run the handshake.
    async fn connect(&self) -> Result<McpTransport, ConnectionError> {
        self.config
            .validate()
            .map_err(|reason| ConnectionError::InvalidConfig {
                provider: self.config.name.clone(),
                reason,
            })?;

        debug!(
            provider = %self.config.name,
            transport = %self.config.transport.kind(),
            "Connecting"
        );
        let mut transport = McpTransport::connect(&self.config.name, &self.config.transport).await?;

        if let Err(e) = self.handshake(&mut transport).await {
            if let Err(close_err) = transport.close().await {
                warn!(provider = %self.config.name, error = %close_err, "Cleanup after failed handshake failed");
            }
            return Err(e);
        }
        Ok(transport)
    }

    fn closed(&self) -> ConnectionError {
        ConnectionError::Closed {
            provider: self.config.name.clone(),
        }
    }
}

#[async_trait]
impl ToolProvider for McpToolProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn state(&self) -> ConnectionState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn initialize(&self) -> Result<(), ConnectionError> {
        let mut guard = self.transport.lock().await;

        let state = self.state();
        if state != ConnectionState::Uninitialized {
            return Err(ConnectionError::invalid_state(
                &self.config.name,
                ConnectionState::Uninitialized,
                state,
            ));
        }

        // Every failure path leaves the instance Closed; it is never retried
        let transport = match self.connect().await {
            Ok(transport) => transport,
            Err(e) => {
                self.set_state(ConnectionState::Closed);
                return Err(e);
            }
        };

        *guard = Some(transport);
        self.set_state(ConnectionState::Ready);
        Ok(())
    }

    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ConnectionError> {
        self.require_ready()?;
        let mut guard = self.transport.lock().await;
        let transport = guard.as_mut().ok_or_else(|| self.closed())?;

        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let response = transport
                .request(&JsonRpcRequest::list_tools(cursor.as_deref()))
                .await?;
            let page: ListToolsResult = self.parse_result(response)?;
            tools.extend(page.tools.into_iter().map(ToolDescriptor::from));
            match page.next_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        debug!(provider = %self.config.name, count = tools.len(), "tools/list");
        Ok(tools)
    }

    async fn invoke_tool(
        &self,
        tool_name: &str,
        invocation_id: &str,
        arguments: serde_json::Value,
    ) -> Result<ToolResult, ConnectionError> {
        self.require_ready()?;
        let mut guard = self.transport.lock().await;
        let transport = guard.as_mut().ok_or_else(|| self.closed())?;

        let response = transport
            .request(&JsonRpcRequest::call_tool(tool_name, arguments))
            .await?;

        // An error object answering tools/call is the tool failing, not the
        // connection
        if let Some(error) = response.error {
            warn!(
                provider = %self.config.name,
                tool = %tool_name,
                code = error.code,
                "Tool call rejected: {}",
                error.message
            );
            return Ok(ToolResult::error(invocation_id, error.message));
        }

        let result: CallToolResult = serde_json::from_value(
            response.result.unwrap_or(serde_json::Value::Null),
        )
        .map_err(|e| ConnectionError::Protocol {
            provider: self.config.name.clone(),
            message: format!("Invalid tools/call result: {}", e),
        })?;

        Ok(result.into_tool_result(invocation_id))
    }

    async fn shutdown(&self) -> Result<(), ConnectionError> {
        let mut guard = self.transport.lock().await;
        let transport = guard.take();
        self.set_state(ConnectionState::Closed);

        match transport {
            Some(mut transport) => {
                let result = transport.close().await;
                debug!(provider = %self.config.name, ok = result.is_ok(), "Transport closed");
                result
            }
            None => Ok(()),
        }
    }
}
