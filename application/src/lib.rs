//! Application layer for toolrelay
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{ChatParams, DEFAULT_SYSTEM_PROMPT};
pub use ports::{
    chat_observer::{ChatObserver, NoChatObserver},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    llm_gateway::{GatewayError, LlmGateway},
};
pub use use_cases::provider_group::{CloseReport, GroupError, ProviderGroup};
pub use use_cases::run_chat::{ChatError, ConversationLoop, LoopState};
