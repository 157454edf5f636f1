//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL conversation transcript (disabled when unset)
    pub transcript: Option<PathBuf>,
    /// Also write diagnostic logs to this file
    pub log_file: Option<PathBuf>,
}
