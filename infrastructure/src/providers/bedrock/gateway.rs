//! Bedrock model gateway
//!
//! Implements the [`LlmGateway`] port with the stateless Converse API: the
//! full conversation, the system prompt and the tool configuration go out
//! on every call.

use super::types;
use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client as BedrockClient;
use aws_sdk_bedrockruntime::types as bedrock;
use toolrelay_application::ports::llm_gateway::{GatewayError, LlmGateway};
use toolrelay_domain::{BedrockProviderConfig, ConversationTurn, InferenceConfig, ModelTurn};
use tracing::{debug, info};

pub struct BedrockGateway {
    client: BedrockClient,
    config: BedrockProviderConfig,
}

impl BedrockGateway {
    /// Create a new Bedrock gateway.
    ///
    /// Loads AWS credentials from the default chain (optionally a named
    /// profile) and creates a Bedrock Runtime client for the configured
    /// region.
    pub async fn new(config: BedrockProviderConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()));

        if let Some(ref profile) = config.profile {
            loader = loader.profile_name(profile);
        }

        let aws_config = loader.load().await;
        info!(model = %config.model_id, region = %config.region, "Bedrock gateway initialized");

        Self {
            client: BedrockClient::new(&aws_config),
            config,
        }
    }
}

#[async_trait]
impl LlmGateway for BedrockGateway {
    fn model_id(&self) -> &str {
        &self.config.model_id
    }

    async fn respond(
        &self,
        messages: &[ConversationTurn],
        system_prompt: &str,
        tools: &[serde_json::Value],
    ) -> Result<ModelTurn, GatewayError> {
        let messages = messages
            .iter()
            .map(types::convert_turn)
            .collect::<Result<Vec<_>, _>>()?;
        let message_count = messages.len();

        let mut request = self
            .client
            .converse()
            .model_id(&self.config.model_id)
            .set_messages(Some(messages))
            .inference_config(inference_configuration(&self.config.inference)?);

        if !system_prompt.is_empty() {
            request = request.system(bedrock::SystemContentBlock::Text(system_prompt.to_string()));
        }

        if let Some(tool_config) = types::convert_tool_config(tools)? {
            request = request.tool_config(tool_config);
        }

        debug!(
            model = %self.config.model_id,
            messages = message_count,
            tools = tools.len(),
            "Calling Bedrock Converse API"
        );

        let response = request
            .send()
            .await
            .map_err(|e| types::convert_converse_error(&e))?;

        let output = response.output().ok_or_else(|| {
            GatewayError::RequestFailed("No output in Bedrock response".to_string())
        })?;

        Ok(types::convert_converse_output(output, response.stop_reason()))
    }
}

fn inference_configuration(
    inference: &InferenceConfig,
) -> Result<bedrock::InferenceConfiguration, GatewayError> {
    let max_tokens = i32::try_from(inference.max_tokens).map_err(|_| {
        GatewayError::RequestFailed(format!(
            "max_tokens {} exceeds the Converse limit of {}",
            inference.max_tokens,
            i32::MAX
        ))
    })?;
    Ok(bedrock::InferenceConfiguration::builder()
        .max_tokens(max_tokens)
        .temperature(inference.temperature)
        .top_p(inference.top_p)
        .build())
}
