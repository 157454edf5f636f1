//! Model response types.
//!
//! A [`ModelTurn`] is what the model gateway hands back for one request: the
//! content blocks of the assistant turn plus the reason generation stopped.
//!
//! # Branching on the stop reason
//!
//! ```text
//! EndTurn / StopSequence / MaxTokens / Other ─▶ answer is final
//! ToolUse                                     ─▶ dispatch every toolUse block,
//!                                                send results, ask again
//! ```

use super::entities::{ContentBlock, ConversationTurn, ToolUse};
use serde::{Deserialize, Serialize};

/// Reason the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural end of response
    EndTurn,
    /// The model wants tools executed before it continues
    ToolUse,
    /// A configured stop sequence was produced
    StopSequence,
    /// Hit the output token limit, response may be truncated
    MaxTokens,
    /// Gateway-specific reason (guardrail intervention, content filter, ...)
    Other(String),
}

impl StopReason {
    /// Whether this reason asks for tool dispatch
    pub fn requests_tools(&self) -> bool {
        matches!(self, StopReason::ToolUse)
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::EndTurn => write!(f, "end_turn"),
            StopReason::ToolUse => write!(f, "tool_use"),
            StopReason::StopSequence => write!(f, "stop_sequence"),
            StopReason::MaxTokens => write!(f, "max_tokens"),
            StopReason::Other(reason) => write!(f, "{}", reason),
        }
    }
}

/// One response from the model gateway.
///
/// ```
/// use toolrelay_domain::{ContentBlock, ModelTurn, StopReason, ToolUse};
///
/// let turn = ModelTurn::new(
///     StopReason::ToolUse,
///     vec![
///         ContentBlock::Text("Let me check.".to_string()),
///         ContentBlock::ToolUse(ToolUse::new("t1", "get_time", serde_json::json!({}))),
///     ],
/// );
/// assert_eq!(turn.tool_uses().count(), 1);
/// assert_eq!(turn.text_content(), "Let me check.");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTurn {
    pub stop_reason: StopReason,
    pub content: Vec<ContentBlock>,
}

impl ModelTurn {
    pub fn new(stop_reason: StopReason, content: Vec<ContentBlock>) -> Self {
        Self {
            stop_reason,
            content,
        }
    }

    /// A text-only final answer
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(StopReason::EndTurn, vec![ContentBlock::Text(text.into())])
    }

    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("")
    }

    pub fn tool_uses(&self) -> impl Iterator<Item = &ToolUse> {
        self.content.iter().filter_map(ContentBlock::as_tool_use)
    }

    /// The assistant turn to append to the conversation
    pub fn to_turn(&self) -> ConversationTurn {
        ConversationTurn::assistant(self.content.clone())
    }
}
