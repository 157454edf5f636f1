//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for toolrelay
#[derive(Parser, Debug)]
#[command(name = "toolrelay")]
#[command(author, version, about = "Chat with a Bedrock model that can call MCP tool servers")]
#[command(long_about = r#"
toolrelay connects a Bedrock-hosted model to a set of MCP tool servers
(local processes over stdio, or AWS Lambda functions) and runs a
conversation in which the model may call their tools.

Servers are started in configuration order before the first message and
stopped in reverse order when the session ends.

Configuration is loaded from (in priority order):
1. TOOLRELAY_* environment variables (e.g. TOOLRELAY_MODEL__REGION)
2. --config <path>     Explicit config file
3. ./toolrelay.toml    Project-level config
4. ~/.config/toolrelay/config.toml   Global config

Example:
  toolrelay "What is the current time in Seattle?"
  toolrelay --chat --model anthropic.claude-3-5-haiku-20241022-v1:0
  toolrelay --transcript chat.jsonl -vv
"#)]
pub struct Cli {
    /// Utterances to send in order (batch mode; defaults to [chat].utterances)
    pub utterances: Vec<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Bedrock model id (overrides [model].model_id)
    #[arg(short, long, value_name = "MODEL_ID")]
    pub model: Option<String>,

    /// AWS region of the Bedrock endpoint (overrides [model].region)
    #[arg(long, value_name = "REGION")]
    pub region: Option<String>,

    /// Append the conversation transcript as JSONL to this file
    #[arg(long, value_name = "PATH")]
    pub transcript: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
