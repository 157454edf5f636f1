//! Chat parameters for the conversation loop.
//!
//! [`ChatParams`] groups the static parameters the
//! [`ConversationLoop`](crate::use_cases::run_chat::ConversationLoop) needs.
//! Model inference parameters are gateway configuration, not listed here.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default system prompt sent with every model request.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Conversation loop control parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatParams {
    /// Fixed system prompt for the whole conversation.
    pub system_prompt: String,
    /// Pause inserted between consecutive utterances in batch mode
    /// (keeps request rates under gateway throttling limits).
    pub utterance_delay: Duration,
}

impl Default for ChatParams {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            utterance_delay: Duration::from_secs(5),
        }
    }
}

impl ChatParams {
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_utterance_delay(mut self, delay: Duration) -> Self {
        self.utterance_delay = delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = ChatParams::default();
        assert_eq!(params.system_prompt, "You are a helpful assistant.");
        assert_eq!(params.utterance_delay, Duration::from_secs(5));
    }

    #[test]
    fn test_builders() {
        let params = ChatParams::default()
            .with_system_prompt("Be terse.")
            .with_utterance_delay(Duration::ZERO);
        assert_eq!(params.system_prompt, "Be terse.");
        assert!(params.utterance_delay.is_zero());
    }
}
