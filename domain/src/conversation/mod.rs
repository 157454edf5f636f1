//! Conversation domain module

pub mod entities;
pub mod response;

pub use entities::{ContentBlock, Conversation, ConversationTurn, Role, ToolUse};
pub use response::{ModelTurn, StopReason};
