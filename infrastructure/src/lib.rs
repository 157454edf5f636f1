//! Infrastructure layer for toolrelay
//!
//! This crate contains adapters that implement the ports defined in the
//! domain and application layers: MCP tool servers (stdio and Lambda), the
//! Bedrock model gateway, the JSONL transcript, and configuration loading.

pub mod config;
pub mod logging;
pub mod mcp;
pub mod providers;

// Re-export commonly used types
pub use config::{ConfigError, ConfigLoader, FileConfig};
pub use logging::JsonlConversationLogger;
pub use mcp::McpToolProvider;
pub use providers::bedrock::BedrockGateway;
