//! Tool server configuration from TOML (`[[servers]]` array)
//!
//! ```toml
//! [[servers]]
//! name = "time"
//! [servers.stdio]
//! command = "uvx"
//! args = ["mcp-server-time"]
//!
//! [[servers]]
//! name = "weather-alerts"
//! [servers.lambda]
//! function_name = "mcp-server-weather-alerts"
//! region = "us-east-2"
//! ```
//!
//! Entries are an array so registration order (and therefore tool routing
//! precedence) is the file order.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use toolrelay_domain::{LambdaServerConfig, ServerConfig, StdioServerConfig};

/// One `[[servers]]` entry. Exactly one transport table must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FileServerConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdio: Option<FileStdioConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lambda: Option<FileLambdaConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FileStdioConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FileLambdaConfig {
    pub function_name: String,
    #[serde(default)]
    pub region: String,
}

impl FileServerConfig {
    /// Convert to the domain type, checking the entry is well formed.
    pub fn to_server_config(&self) -> Result<ServerConfig, String> {
        let config = match (&self.stdio, &self.lambda) {
            (Some(stdio), None) => ServerConfig::stdio(
                &self.name,
                StdioServerConfig {
                    command: stdio.command.clone(),
                    args: stdio.args.clone(),
                    env: stdio.env.clone(),
                },
            ),
            (None, Some(lambda)) => ServerConfig::lambda(
                &self.name,
                LambdaServerConfig {
                    function_name: lambda.function_name.clone(),
                    region: lambda.region.clone(),
                },
            ),
            (Some(_), Some(_)) => {
                return Err(format!(
                    "server '{}' sets both [servers.stdio] and [servers.lambda]",
                    self.name
                ));
            }
            (None, None) => {
                return Err(format!(
                    "server '{}' needs a [servers.stdio] or [servers.lambda] table",
                    self.name
                ));
            }
        };
        config
            .validate()
            .map_err(|reason| format!("server '{}': {}", self.name, reason))?;
        Ok(config)
    }
}
