//! Domain layer for toolrelay
//!
//! This crate contains the core entities and value objects shared by every
//! other layer. It has no dependencies on infrastructure or presentation
//! concerns and performs no I/O.
//!
//! # Core Concepts
//!
//! ## Tools
//!
//! - **ToolDescriptor**: one tool advertised by a tool server
//! - **ToolProvider**: one connection to one tool server (stdio, Lambda, ...)
//! - **ToolResult**: the in-band answer to a model's tool request
//!
//! ## Conversation
//!
//! - **Conversation**: append-only list of user/assistant turns
//! - **ModelTurn**: a model response plus its stop reason

pub mod conversation;
pub mod providers;
pub mod tool;
pub mod util;

// Re-export commonly used types
pub use conversation::{
    ContentBlock, Conversation, ConversationTurn, ModelTurn, Role, StopReason, ToolUse,
};
pub use providers::{
    BedrockProviderConfig, InferenceConfig, LambdaServerConfig, ServerConfig, StdioServerConfig,
    TransportConfig,
};
pub use tool::{
    ConnectionError, ConnectionState, ToolDescriptor, ToolProvider, ToolResult, ToolResultContent,
    ToolStatus, render_tool_specs,
};
