//! Provider configuration types (provider-neutral, serde-free).
//!
//! These types define the shape of tool-server and model-gateway settings
//! without depending on any serialization format (TOML, JSON, etc.).

use std::collections::HashMap;

/// One configured tool server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Unique name, used in logs and error messages
    pub name: String,
    /// How to reach the server
    pub transport: TransportConfig,
}

/// Transport-specific settings. The set of transports is closed.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportConfig {
    /// Local subprocess speaking JSON-RPC over stdin/stdout
    Stdio(StdioServerConfig),
    /// Server hosted in an AWS Lambda function
    Lambda(LambdaServerConfig),
}

impl TransportConfig {
    pub fn kind(&self) -> &str {
        match self {
            TransportConfig::Stdio(_) => "stdio",
            TransportConfig::Lambda(_) => "lambda",
        }
    }
}

/// Local subprocess server settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StdioServerConfig {
    /// Executable (`npx` is resolved through `PATH`)
    pub command: String,
    /// Arguments passed to the executable
    pub args: Vec<String>,
    /// Variables added on top of the parent environment
    pub env: HashMap<String, String>,
}

/// Lambda-hosted server settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LambdaServerConfig {
    /// Function name or ARN
    pub function_name: String,
    /// AWS region the function lives in
    pub region: String,
}

impl ServerConfig {
    pub fn stdio(name: impl Into<String>, config: StdioServerConfig) -> Self {
        Self {
            name: name.into(),
            transport: TransportConfig::Stdio(config),
        }
    }

    pub fn lambda(name: impl Into<String>, config: LambdaServerConfig) -> Self {
        Self {
            name: name.into(),
            transport: TransportConfig::Lambda(config),
        }
    }

    /// Check that the fields the transport needs are present and non-empty.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("server name cannot be empty".to_string());
        }
        match &self.transport {
            TransportConfig::Stdio(stdio) => {
                if stdio.command.trim().is_empty() {
                    return Err("command must be a non-empty string".to_string());
                }
            }
            TransportConfig::Lambda(lambda) => {
                if lambda.function_name.trim().is_empty() {
                    return Err("function_name must be a non-empty string".to_string());
                }
                if lambda.region.trim().is_empty() {
                    return Err("region must be a non-empty string".to_string());
                }
            }
        }
        Ok(())
    }
}

/// Fixed inference parameters sent with every model request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceConfig {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: 0.7,
            top_p: 1.0,
        }
    }
}

/// AWS Bedrock model gateway configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BedrockProviderConfig {
    /// Bedrock model id or inference profile id
    pub model_id: String,
    /// AWS region (default: "us-east-2")
    pub region: String,
    /// AWS profile name for credentials
    pub profile: Option<String>,
    pub inference: InferenceConfig,
}

impl Default for BedrockProviderConfig {
    fn default() -> Self {
        Self {
            model_id: "anthropic.claude-3-5-sonnet-20241022-v2:0".to_string(),
            region: "us-east-2".to_string(),
            profile: None,
            inference: InferenceConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_stdio_config() {
        let config = ServerConfig::stdio(
            "time",
            StdioServerConfig {
                command: "uvx".to_string(),
                args: vec!["mcp-server-time".to_string()],
                env: HashMap::new(),
            },
        );
        assert!(config.validate().is_ok());
        assert_eq!(config.transport.kind(), "stdio");
    }

    #[test]
    fn test_empty_command_rejected() {
        let config = ServerConfig::stdio("time", StdioServerConfig::default());
        let err = config.validate().unwrap_err();
        assert!(err.contains("command"));
    }

    #[test]
    fn test_lambda_requires_function_and_region() {
        let missing_function = ServerConfig::lambda(
            "weather",
            LambdaServerConfig {
                function_name: String::new(),
                region: "us-east-2".to_string(),
            },
        );
        assert!(missing_function.validate().unwrap_err().contains("function_name"));

        let missing_region = ServerConfig::lambda(
            "weather",
            LambdaServerConfig {
                function_name: "mcp-server-weather".to_string(),
                region: " ".to_string(),
            },
        );
        assert!(missing_region.validate().unwrap_err().contains("region"));
    }

    #[test]
    fn test_inference_defaults() {
        let inference = InferenceConfig::default();
        assert_eq!(inference.max_tokens, 4096);
        assert!((inference.temperature - 0.7).abs() < f32::EPSILON);
        assert!((inference.top_p - 1.0).abs() < f32::EPSILON);
    }
}
