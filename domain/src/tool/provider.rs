//! Tool provider abstraction
//!
//! This module defines the [`ToolProvider`] trait: one connection to one
//! tool server, whatever transport sits underneath it.
//!
//! # Lifecycle
//!
//! ```text
//!  Uninitialized ──initialize()──▶ Ready ──shutdown()──▶ Closed
//!        │                                                 ▲
//!        └──────────────────shutdown()─────────────────────┘
//! ```
//!
//! - `initialize()` may succeed at most once per instance. Calling it again
//!   fails fast with [`ConnectionError::InvalidState`].
//! - `list_tools()` and `invoke_tool()` require `Ready`.
//! - `shutdown()` always lands in `Closed`, even when the transport reports
//!   an error while being torn down.
//!
//! # Errors
//!
//! Only transport and protocol failures surface as [`ConnectionError`]. A tool
//! that runs and reports failure is a normal [`ToolResult`] with
//! [`ToolStatus::Error`](super::result::ToolStatus::Error).
//!
//! # Example
//!
//! ```ignore
//! use toolrelay_domain::tool::ToolProvider;
//!
//! provider.initialize().await?;
//! let tools = provider.list_tools().await?;
//! let result = provider
//!     .invoke_tool("get_current_time", "tooluse_1", serde_json::json!({"timezone": "America/Los_Angeles"}))
//!     .await?;
//! provider.shutdown().await?;
//! ```

use async_trait::async_trait;
use thiserror::Error;

use super::descriptor::ToolDescriptor;
use super::result::ToolResult;

/// Connection state of a tool provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Uninitialized,
    Ready,
    Closed,
}

impl ConnectionState {
    pub fn as_str(&self) -> &str {
        match self {
            ConnectionState::Uninitialized => "uninitialized",
            ConnectionState::Ready => "ready",
            ConnectionState::Closed => "closed",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transport or handshake failure of a single provider connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Required transport configuration is missing or empty
    #[error("Invalid configuration for provider '{provider}': {reason}")]
    InvalidConfig { provider: String, reason: String },

    /// Operation not allowed in the current lifecycle state
    #[error("Provider '{provider}' is {actual}, expected {expected}")]
    InvalidState {
        provider: String,
        expected: ConnectionState,
        actual: ConnectionState,
    },

    /// Failed to start the local server process
    #[error("Failed to spawn provider '{provider}': {source}")]
    Spawn {
        provider: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O failure on an established connection
    #[error("I/O error on provider '{provider}': {source}")]
    Io {
        provider: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed or unexpected message from the server
    #[error("Protocol error on provider '{provider}': {message}")]
    Protocol { provider: String, message: String },

    /// The server answered a protocol-level request with an error object
    #[error("Provider '{provider}' returned RPC error (code {code}): {message}")]
    Rpc {
        provider: String,
        code: i64,
        message: String,
    },

    /// The remote invocation itself failed (e.g., function error)
    #[error("Remote invocation failed for provider '{provider}': {message}")]
    Remote { provider: String, message: String },

    /// The server closed the connection
    #[error("Connection to provider '{provider}' closed")]
    Closed { provider: String },

    /// The initialize handshake did not complete
    #[error("Handshake with provider '{provider}' failed: {message}")]
    Handshake { provider: String, message: String },
}

impl ConnectionError {
    /// Name of the provider the error belongs to
    pub fn provider(&self) -> &str {
        match self {
            ConnectionError::InvalidConfig { provider, .. }
            | ConnectionError::InvalidState { provider, .. }
            | ConnectionError::Spawn { provider, .. }
            | ConnectionError::Io { provider, .. }
            | ConnectionError::Protocol { provider, .. }
            | ConnectionError::Rpc { provider, .. }
            | ConnectionError::Remote { provider, .. }
            | ConnectionError::Closed { provider }
            | ConnectionError::Handshake { provider, .. } => provider,
        }
    }

    pub fn invalid_state(
        provider: impl Into<String>,
        expected: ConnectionState,
        actual: ConnectionState,
    ) -> Self {
        ConnectionError::InvalidState {
            provider: provider.into(),
            expected,
            actual,
        }
    }
}

/// A tool provider: one connection to one tool server.
///
/// Implementations serialize their own calls; the group may call different
/// providers concurrently but never relies on a single provider handling more
/// than one in-flight call.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Configured name of this provider (e.g., "time", "weather-alerts")
    fn name(&self) -> &str;

    /// Current lifecycle state
    fn state(&self) -> ConnectionState;

    /// Establish the transport connection and perform the handshake.
    async fn initialize(&self) -> Result<(), ConnectionError>;

    /// Query the provider's current catalog. Not cached.
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ConnectionError>;

    /// Execute the named tool, forwarding `arguments` verbatim.
    async fn invoke_tool(
        &self,
        tool_name: &str,
        invocation_id: &str,
        arguments: serde_json::Value,
    ) -> Result<ToolResult, ConnectionError>;

    /// Release the transport connection.
    ///
    /// The provider is `Closed` afterwards whatever the outcome; the error is
    /// returned so callers can record it.
    async fn shutdown(&self) -> Result<(), ConnectionError>;

    /// Check if this provider currently advertises a tool
    async fn has_tool(&self, tool_name: &str) -> Result<bool, ConnectionError> {
        Ok(self.list_tools().await?.iter().any(|t| t.name == tool_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// A mock provider for testing the default methods
    struct MockProvider {
        tools: Vec<ToolDescriptor>,
        state: Mutex<ConnectionState>,
    }

    impl MockProvider {
        fn new() -> Self {
            Self {
                tools: Vec::new(),
                state: Mutex::new(ConnectionState::Uninitialized),
            }
        }

        fn with_tool(mut self, name: &str) -> Self {
            self.tools.push(ToolDescriptor::new(
                name,
                format!("Mock tool: {}", name),
                serde_json::json!({"type": "object"}),
            ));
            self
        }
    }

    #[async_trait]
    impl ToolProvider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        fn state(&self) -> ConnectionState {
            *self.state.lock().unwrap()
        }

        async fn initialize(&self) -> Result<(), ConnectionError> {
            let mut state = self.state.lock().unwrap();
            if *state != ConnectionState::Uninitialized {
                return Err(ConnectionError::invalid_state(
                    "mock",
                    ConnectionState::Uninitialized,
                    *state,
                ));
            }
            *state = ConnectionState::Ready;
            Ok(())
        }

        async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ConnectionError> {
            Ok(self.tools.clone())
        }

        async fn invoke_tool(
            &self,
            _tool_name: &str,
            invocation_id: &str,
            _arguments: serde_json::Value,
        ) -> Result<ToolResult, ConnectionError> {
            Ok(ToolResult::success(invocation_id, "Mock output"))
        }

        async fn shutdown(&self) -> Result<(), ConnectionError> {
            *self.state.lock().unwrap() = ConnectionState::Closed;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_provider_has_tool() {
        let provider = MockProvider::new().with_tool("get_time");

        assert!(provider.has_tool("get_time").await.unwrap());
        assert!(!provider.has_tool("unknown").await.unwrap());
    }

    #[tokio::test]
    async fn test_second_initialize_fails_fast() {
        let provider = MockProvider::new();
        provider.initialize().await.unwrap();

        let err = provider.initialize().await.unwrap_err();
        assert!(matches!(
            err,
            ConnectionError::InvalidState {
                actual: ConnectionState::Ready,
                ..
            }
        ));
        assert_eq!(err.provider(), "mock");
    }

    #[test]
    fn test_error_display_names_provider() {
        let err = ConnectionError::Closed {
            provider: "time".to_string(),
        };
        assert_eq!(err.to_string(), "Connection to provider 'time' closed");
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ConnectionState::Ready.to_string(), "ready");
    }
}
