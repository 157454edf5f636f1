//! Chat configuration from TOML (`[chat]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;
use toolrelay_application::{ChatParams, DEFAULT_SYSTEM_PROMPT};

/// Raw chat configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FileChatConfig {
    /// System prompt sent with every model request
    pub system_prompt: String,
    /// Seconds to wait between batch utterances (default: 5)
    pub utterance_delay_secs: u64,
    /// Utterances sent in batch mode when none are given on the command line
    pub utterances: Vec<String>,
}

impl Default for FileChatConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            utterance_delay_secs: 5,
            utterances: vec![
                "Hello!".to_string(),
                "What is the current time in Seattle?".to_string(),
                "Are there any weather alerts right now?".to_string(),
                "Who is Tom Cruise?".to_string(),
            ],
        }
    }
}

impl FileChatConfig {
    pub fn to_chat_params(&self) -> ChatParams {
        ChatParams::default()
            .with_system_prompt(self.system_prompt.clone())
            .with_utterance_delay(Duration::from_secs(self.utterance_delay_secs))
    }
}
