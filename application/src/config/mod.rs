//! Application-level configuration.
//!
//! - [`ChatParams`]: conversation loop control (system prompt, pacing)

pub mod chat_params;

pub use chat_params::{ChatParams, DEFAULT_SYSTEM_PROMPT};
