//! Tool result value objects
//!
//! A [`ToolResult`] is the answer to exactly one `toolUse` block. It always
//! carries at least one content block, including for failures, so the model
//! receives something it can react to in-band.

use serde::{Deserialize, Serialize};

/// Outcome status of a tool invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Success,
    Error,
}

impl ToolStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ToolStatus::Success => "success",
            ToolStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One block of tool output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolResultContent {
    /// Plain text output
    Text(String),
    /// Structured output (non-text MCP content is passed through as JSON)
    Json(serde_json::Value),
}

impl ToolResultContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ToolResultContent::Text(s) => Some(s),
            ToolResultContent::Json(_) => None,
        }
    }
}

/// Placeholder used when a provider answers with no content at all.
const EMPTY_CONTENT_PLACEHOLDER: &str = "(no content)";

/// Result of a single tool invocation, matched to its `toolUse` block by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawToolResult")]
pub struct ToolResult {
    /// Id of the `toolUse` block this result answers
    pub tool_use_id: String,
    /// Output blocks, never empty
    content: Vec<ToolResultContent>,
    /// Whether the tool succeeded
    pub status: ToolStatus,
}

/// Wire shape of [`ToolResult`], checked before it becomes one.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawToolResult {
    tool_use_id: String,
    content: Vec<ToolResultContent>,
    status: ToolStatus,
}

impl TryFrom<RawToolResult> for ToolResult {
    type Error = String;

    fn try_from(raw: RawToolResult) -> Result<Self, Self::Error> {
        if raw.content.is_empty() {
            return Err(format!(
                "tool result '{}' has no content blocks",
                raw.tool_use_id
            ));
        }
        Ok(Self {
            tool_use_id: raw.tool_use_id,
            content: raw.content,
            status: raw.status,
        })
    }
}

impl ToolResult {
    /// Build a result from arbitrary content blocks.
    ///
    /// An empty `content` is replaced with a single placeholder text block.
    pub fn new(
        tool_use_id: impl Into<String>,
        content: Vec<ToolResultContent>,
        status: ToolStatus,
    ) -> Self {
        let content = if content.is_empty() {
            vec![ToolResultContent::Text(EMPTY_CONTENT_PLACEHOLDER.to_string())]
        } else {
            content
        };
        Self {
            tool_use_id: tool_use_id.into(),
            content,
            status,
        }
    }

    /// Create a successful single-text result
    pub fn success(tool_use_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(
            tool_use_id,
            vec![ToolResultContent::Text(text.into())],
            ToolStatus::Success,
        )
    }

    /// Create a failed single-text result
    pub fn error(tool_use_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            tool_use_id,
            vec![ToolResultContent::Text(message.into())],
            ToolStatus::Error,
        )
    }

    /// Synthetic result for a tool name no provider owns.
    pub fn unknown_tool(tool_use_id: impl Into<String>, tool_name: &str) -> Self {
        Self::error(
            tool_use_id,
            format!("No server found with tool: {}", tool_name),
        )
    }

    pub fn content(&self) -> &[ToolResultContent] {
        &self.content
    }

    pub fn is_success(&self) -> bool {
        self.status == ToolStatus::Success
    }

    /// Concatenate all text blocks (JSON blocks are rendered compactly).
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|block| match block {
                ToolResultContent::Text(s) => s.clone(),
                ToolResultContent::Json(v) => v.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
