//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to domain/application types
//! once validated.

mod chat;
mod logging;
mod model;
mod servers;

pub use chat::FileChatConfig;
pub use logging::FileLoggingConfig;
pub use model::FileModelConfig;
pub use servers::{FileLambdaConfig, FileServerConfig, FileStdioConfig};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use toolrelay_domain::ServerConfig;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Configuration is usable but probably not what was meant
    Warning,
    /// Configuration cannot be used
    Error,
}

/// A single problem found by [`FileConfig::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub message: String,
}

impl ConfigIssue {
    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.severity {
            Severity::Warning => write!(f, "warning: {}", self.message),
            Severity::Error => write!(f, "error: {}", self.message),
        }
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FileConfig {
    /// Bedrock model gateway settings
    pub model: FileModelConfig,
    /// Conversation settings
    pub chat: FileChatConfig,
    /// Transcript and log file settings
    pub logging: FileLoggingConfig,
    /// Tool servers in registration order
    pub servers: Vec<FileServerConfig>,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.model.model_id.trim().is_empty() {
            issues.push(ConfigIssue::error("model.model_id cannot be empty"));
        }
        if self.model.region.trim().is_empty() {
            issues.push(ConfigIssue::error("model.region cannot be empty"));
        }
        if self.model.max_tokens == 0 {
            issues.push(ConfigIssue::error("model.max_tokens must be positive"));
        } else if i32::try_from(self.model.max_tokens).is_err() {
            issues.push(ConfigIssue::error(format!(
                "model.max_tokens must be at most {}, got {}",
                i32::MAX,
                self.model.max_tokens
            )));
        }
        if !(0.0..=1.0).contains(&self.model.temperature) {
            issues.push(ConfigIssue::error(format!(
                "model.temperature must be within 0.0..=1.0, got {}",
                self.model.temperature
            )));
        }
        if !(0.0..=1.0).contains(&self.model.top_p) {
            issues.push(ConfigIssue::error(format!(
                "model.top_p must be within 0.0..=1.0, got {}",
                self.model.top_p
            )));
        }

        let mut seen = HashSet::new();
        for server in &self.servers {
            if let Err(reason) = server.to_server_config() {
                issues.push(ConfigIssue::error(reason));
            }
            if !server.name.is_empty() && !seen.insert(server.name.as_str()) {
                issues.push(ConfigIssue::warning(format!(
                    "server name '{}' is used more than once",
                    server.name
                )));
            }
        }

        if self.servers.is_empty() {
            issues.push(ConfigIssue::warning(
                "no [[servers]] configured, the model will have no tools",
            ));
        }

        issues
    }

    /// Domain server configs in registration order.
    ///
    /// Call after [`validate`](Self::validate) reported no errors; malformed
    /// entries are reported here as well.
    pub fn server_configs(&self) -> Result<Vec<ServerConfig>, String> {
        self.servers
            .iter()
            .map(FileServerConfig::to_server_config)
            .collect()
    }
}
