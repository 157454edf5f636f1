//! Model gateway adapters
//!
//! Each adapter implements the [`LlmGateway`](toolrelay_application::LlmGateway)
//! port for one model backend.

pub mod bedrock;
