//! Model gateway configuration from TOML (`[model]` section)

use serde::{Deserialize, Serialize};
use toolrelay_domain::{BedrockProviderConfig, InferenceConfig};

/// Raw Bedrock model configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FileModelConfig {
    /// Bedrock model id or inference profile id
    pub model_id: String,
    /// AWS region of the Bedrock endpoint (default: "us-east-2")
    pub region: String,
    /// AWS profile name for credentials
    pub profile: Option<String>,
    /// Max tokens per response (default: 4096)
    pub max_tokens: u32,
    /// Sampling temperature (default: 0.7)
    pub temperature: f32,
    /// Nucleus sampling (default: 1.0)
    pub top_p: f32,
}

impl Default for FileModelConfig {
    fn default() -> Self {
        let defaults = BedrockProviderConfig::default();
        Self {
            model_id: defaults.model_id,
            region: defaults.region,
            profile: defaults.profile,
            max_tokens: defaults.inference.max_tokens,
            temperature: defaults.inference.temperature,
            top_p: defaults.inference.top_p,
        }
    }
}

impl FileModelConfig {
    pub fn to_bedrock_config(&self) -> BedrockProviderConfig {
        BedrockProviderConfig {
            model_id: self.model_id.clone(),
            region: self.region.clone(),
            profile: self.profile.clone(),
            inference: InferenceConfig {
                max_tokens: self.max_tokens,
                temperature: self.temperature,
                top_p: self.top_p,
            },
        }
    }
}
