//! Type conversions between AWS Bedrock SDK and domain types
//!
//! Converts Bedrock Converse API responses to domain [`ModelTurn`]s, and
//! domain conversation turns and tool specs to Bedrock request formats.

use aws_sdk_bedrockruntime::types as bedrock;
use aws_smithy_types::Document;
use toolrelay_application::ports::llm_gateway::GatewayError;
use toolrelay_domain::{
    ContentBlock, ConversationTurn, ModelTurn, Role, StopReason, ToolResult, ToolResultContent,
    ToolStatus, ToolUse,
};

fn build_error(what: &str, e: impl std::fmt::Display) -> GatewayError {
    GatewayError::RequestFailed(format!("Failed to build {}: {}", what, e))
}

// ─── Bedrock → Domain ────────────────────────────────────────────

/// Convert Bedrock stop reason to domain StopReason.
pub fn convert_stop_reason(reason: &bedrock::StopReason) -> StopReason {
    match reason {
        bedrock::StopReason::EndTurn => StopReason::EndTurn,
        bedrock::StopReason::ToolUse => StopReason::ToolUse,
        bedrock::StopReason::MaxTokens => StopReason::MaxTokens,
        bedrock::StopReason::StopSequence => StopReason::StopSequence,
        other => StopReason::Other(other.as_str().to_string()),
    }
}

/// Convert a single Bedrock content block to a domain ContentBlock.
///
/// Returns `None` for unsupported block types (Image, GuardContent, etc.).
pub fn convert_content_block(block: &bedrock::ContentBlock) -> Option<ContentBlock> {
    match block {
        bedrock::ContentBlock::Text(text) => Some(ContentBlock::Text(text.clone())),
        bedrock::ContentBlock::ToolUse(tool_use) => Some(ContentBlock::ToolUse(ToolUse::new(
            tool_use.tool_use_id(),
            tool_use.name(),
            document_to_json(tool_use.input()),
        ))),
        _ => None,
    }
}

/// Convert a Bedrock ConverseOutput to a domain ModelTurn.
pub fn convert_converse_output(
    output: &bedrock::ConverseOutput,
    stop_reason: &bedrock::StopReason,
) -> ModelTurn {
    let content = match output {
        bedrock::ConverseOutput::Message(message) => message
            .content()
            .iter()
            .filter_map(convert_content_block)
            .collect(),
        _ => Vec::new(),
    };
    ModelTurn::new(convert_stop_reason(stop_reason), content)
}

// ─── Domain → Bedrock ────────────────────────────────────────────

/// Convert one conversation turn to a Bedrock message.
pub fn convert_turn(turn: &ConversationTurn) -> Result<bedrock::Message, GatewayError> {
    let role = match turn.role {
        Role::User => bedrock::ConversationRole::User,
        Role::Assistant => bedrock::ConversationRole::Assistant,
    };
    let content = turn
        .content
        .iter()
        .map(convert_block)
        .collect::<Result<Vec<_>, _>>()?;

    bedrock::Message::builder()
        .role(role)
        .set_content(Some(content))
        .build()
        .map_err(|e| build_error("message", e))
}

fn convert_block(block: &ContentBlock) -> Result<bedrock::ContentBlock, GatewayError> {
    match block {
        ContentBlock::Text(text) => Ok(bedrock::ContentBlock::Text(text.clone())),
        ContentBlock::ToolUse(tool_use) => bedrock::ToolUseBlock::builder()
            .tool_use_id(&tool_use.id)
            .name(&tool_use.name)
            .input(json_to_document(&tool_use.input))
            .build()
            .map(bedrock::ContentBlock::ToolUse)
            .map_err(|e| build_error("toolUse block", e)),
        ContentBlock::ToolResult(result) => convert_tool_result(result),
    }
}

/// Convert a domain ToolResult to a Bedrock ContentBlock::ToolResult.
pub fn convert_tool_result(result: &ToolResult) -> Result<bedrock::ContentBlock, GatewayError> {
    let status = match result.status {
        ToolStatus::Success => bedrock::ToolResultStatus::Success,
        ToolStatus::Error => bedrock::ToolResultStatus::Error,
    };

    let content = result
        .content()
        .iter()
        .map(|block| match block {
            ToolResultContent::Text(text) => bedrock::ToolResultContentBlock::Text(text.clone()),
            ToolResultContent::Json(value) => {
                bedrock::ToolResultContentBlock::Json(json_to_document(value))
            }
        })
        .collect();

    bedrock::ToolResultBlock::builder()
        .tool_use_id(&result.tool_use_id)
        .status(status)
        .set_content(Some(content))
        .build()
        .map(bedrock::ContentBlock::ToolResult)
        .map_err(|e| build_error("toolResult block", e))
}

/// Convert a rendered tool spec envelope to a Bedrock Tool.
///
/// Expects `{"toolSpec": {"name", "description", "inputSchema": {"json": {...}}}}`.
/// Returns `None` if the envelope has no name.
pub fn convert_tool_spec(spec: &serde_json::Value) -> Option<Result<bedrock::Tool, GatewayError>> {
    let inner = spec.get("toolSpec")?;
    let name = inner.get("name")?.as_str()?;
    let description = inner.get("description").and_then(|d| d.as_str());
    let schema = inner
        .get("inputSchema")
        .and_then(|s| s.get("json"))
        .cloned()
        .unwrap_or_else(|| serde_json::json!({"type": "object", "properties": {}}));

    let mut builder = bedrock::ToolSpecification::builder()
        .name(name)
        .input_schema(bedrock::ToolInputSchema::Json(json_to_document(&schema)));
    if let Some(desc) = description.filter(|d| !d.is_empty()) {
        builder = builder.description(desc);
    }

    Some(
        builder
            .build()
            .map(bedrock::Tool::ToolSpec)
            .map_err(|e| build_error("tool spec", e)),
    )
}

/// Build the tool configuration, or `None` when no tools are offered.
pub fn convert_tool_config(
    specs: &[serde_json::Value],
) -> Result<Option<bedrock::ToolConfiguration>, GatewayError> {
    let tools = specs
        .iter()
        .filter_map(convert_tool_spec)
        .collect::<Result<Vec<_>, _>>()?;
    if tools.is_empty() {
        return Ok(None);
    }
    bedrock::ToolConfiguration::builder()
        .set_tools(Some(tools))
        .build()
        .map(Some)
        .map_err(|e| build_error("tool config", e))
}

// ─── JSON ↔ Document helpers ─────────────────────────────────────

/// Convert a serde_json::Value to an aws_smithy_types::Document.
pub fn json_to_document(value: &serde_json::Value) -> Document {
    match value {
        serde_json::Value::Null => Document::Null,
        serde_json::Value::Bool(b) => Document::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Document::Number(aws_smithy_types::Number::PosInt(u))
            } else if let Some(i) = n.as_i64() {
                Document::Number(aws_smithy_types::Number::NegInt(i))
            } else if let Some(f) = n.as_f64() {
                Document::Number(aws_smithy_types::Number::Float(f))
            } else {
                Document::Null
            }
        }
        serde_json::Value::String(s) => Document::String(s.clone()),
        serde_json::Value::Array(arr) => {
            Document::Array(arr.iter().map(json_to_document).collect())
        }
        serde_json::Value::Object(map) => Document::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_document(v)))
                .collect(),
        ),
    }
}

/// Convert an aws_smithy_types::Document to a serde_json::Value.
pub fn document_to_json(doc: &Document) -> serde_json::Value {
    match doc {
        Document::Null => serde_json::Value::Null,
        Document::Bool(b) => serde_json::Value::Bool(*b),
        Document::Number(n) => match n {
            aws_smithy_types::Number::PosInt(i) => serde_json::json!(*i),
            aws_smithy_types::Number::NegInt(i) => serde_json::json!(*i),
            aws_smithy_types::Number::Float(f) => serde_json::Value::Number(
                serde_json::Number::from_f64(*f).unwrap_or_else(|| serde_json::Number::from(0)),
            ),
        },
        Document::String(s) => serde_json::Value::String(s.clone()),
        Document::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(document_to_json).collect())
        }
        Document::Object(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), document_to_json(v)))
                .collect(),
        ),
    }
}

/// Convert a Bedrock SDK error to a GatewayError.
pub fn convert_converse_error(
    err: &aws_sdk_bedrockruntime::error::SdkError<
        aws_sdk_bedrockruntime::operation::converse::ConverseError,
    >,
) -> GatewayError {
    use aws_sdk_bedrockruntime::operation::converse::ConverseError;

    match err {
        aws_sdk_bedrockruntime::error::SdkError::ServiceError(service_err) => {
            match service_err.err() {
                ConverseError::ThrottlingException(e) => {
                    GatewayError::Throttled(format!("Bedrock throttled: {}", e))
                }
                ConverseError::ModelNotReadyException(e) => {
                    GatewayError::ModelNotAvailable(format!("Bedrock model not ready: {}", e))
                }
                ConverseError::ResourceNotFoundException(e) => {
                    GatewayError::ModelNotAvailable(format!("Bedrock model not found: {}", e))
                }
                ConverseError::ValidationException(e) => {
                    GatewayError::RequestFailed(format!("Bedrock validation error: {}", e))
                }
                ConverseError::ModelTimeoutException(_) => GatewayError::Timeout,
                other => GatewayError::RequestFailed(format!("Bedrock error: {:?}", other)),
            }
        }
        other => GatewayError::ConnectionError(format!(
            "Bedrock SDK error: {}",
            aws_sdk_bedrockruntime::error::DisplayErrorContext(other)
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolrelay_domain::ToolDescriptor;

    #[test]
    fn test_convert_stop_reasons() {
        assert_eq!(
            convert_stop_reason(&bedrock::StopReason::EndTurn),
            StopReason::EndTurn
        );
        assert_eq!(
            convert_stop_reason(&bedrock::StopReason::ToolUse),
            StopReason::ToolUse
        );
        assert_eq!(
            convert_stop_reason(&bedrock::StopReason::StopSequence),
            StopReason::StopSequence
        );
        assert_eq!(
            convert_stop_reason(&bedrock::StopReason::MaxTokens),
            StopReason::MaxTokens
        );
    }

    #[test]
    fn test_convert_tool_use_block() {
        let block = bedrock::ContentBlock::ToolUse(
            bedrock::ToolUseBlock::builder()
                .tool_use_id("tooluse_1")
                .name("get_time")
                .input(json_to_document(&serde_json::json!({"timezone": "UTC"})))
                .build()
                .unwrap(),
        );
        let converted = convert_content_block(&block).unwrap();
        let tool_use = converted.as_tool_use().unwrap();
        assert_eq!(tool_use.id, "tooluse_1");
        assert_eq!(tool_use.input["timezone"], "UTC");
    }

    #[test]
    fn test_json_document_roundtrip() {
        let original = serde_json::json!({
            "name": "test",
            "count": 42,
            "offset": -3,
            "ratio": 0.5,
            "nested": { "flag": true },
            "items": [1, 2, 3]
        });
        let doc = json_to_document(&original);
        assert_eq!(document_to_json(&doc), original);
    }

    #[test]
    fn test_convert_conversation_turns() {
        let user = ConversationTurn::user_text("What time is it?");
        assert_eq!(
            convert_turn(&user).unwrap().role(),
            &bedrock::ConversationRole::User
        );

        let assistant = ConversationTurn::assistant(vec![
            ContentBlock::Text("Checking.".to_string()),
            ContentBlock::ToolUse(ToolUse::new("t1", "get_time", serde_json::json!({}))),
        ]);
        let message = convert_turn(&assistant).unwrap();
        assert_eq!(message.content().len(), 2);

        let results = ConversationTurn::tool_results(vec![
            ToolResult::success("t1", "10:00"),
            ToolResult::unknown_tool("t2", "nope"),
        ]);
        let message = convert_turn(&results).unwrap();
        assert!(
            message
                .content()
                .iter()
                .all(|b| matches!(b, bedrock::ContentBlock::ToolResult(_)))
        );
    }

    #[test]
    fn test_tool_config_from_rendered_specs() {
        let specs = vec![
            ToolDescriptor::new(
                "get_time",
                "Current time",
                serde_json::json!({"type": "object", "properties": {"timezone": {"type": "string"}}}),
            )
            .to_tool_spec(),
        ];
        let config = convert_tool_config(&specs).unwrap().unwrap();
        assert_eq!(config.tools().len(), 1);
    }

    #[test]
    fn test_no_tools_means_no_tool_config() {
        assert!(convert_tool_config(&[]).unwrap().is_none());
    }

    #[test]
    fn test_tool_spec_without_name_is_skipped() {
        let spec = serde_json::json!({"toolSpec": {"description": "No name"}});
        assert!(convert_tool_spec(&spec).is_none());
    }
}
