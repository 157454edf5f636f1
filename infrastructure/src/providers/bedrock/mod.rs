//! AWS Bedrock model gateway (Converse API)

pub mod gateway;
pub mod types;

pub use gateway::BedrockGateway;
