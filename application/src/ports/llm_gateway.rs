//! LLM Gateway port
//!
//! Defines the interface for asking the model for its next turn.

use async_trait::async_trait;
use thiserror::Error;
use toolrelay_domain::{ConversationTurn, ModelTurn};

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Throttled: {0}")]
    Throttled(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Gateway for LLM communication
///
/// One call is one stateless request: the full conversation goes out every
/// time, the model's next turn comes back. Implementations (adapters) live in
/// the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Identifier of the model this gateway talks to
    fn model_id(&self) -> &str;

    /// Request the model's next turn.
    ///
    /// `tools` holds tool specifications already rendered into the gateway's
    /// envelope (see [`ToolDescriptor::to_tool_spec`](toolrelay_domain::ToolDescriptor::to_tool_spec)).
    async fn respond(
        &self,
        messages: &[ConversationTurn],
        system_prompt: &str,
        tools: &[serde_json::Value],
    ) -> Result<ModelTurn, GatewayError>;
}
