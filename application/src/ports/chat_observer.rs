//! Chat observer port
//!
//! Structured observability hooks for the provider group and the
//! conversation loop. The core never prints; the presentation layer
//! implements this trait to render progress (console, spinner, etc.).

use toolrelay_domain::{ConnectionError, ModelTurn, ToolResult};

/// Callback for lifecycle events during a chat session.
///
/// Every method has a no-op default so implementations only override what
/// they display.
pub trait ChatObserver: Send + Sync {
    /// A provider finished its handshake and is ready
    fn on_provider_started(&self, _provider: &str) {}

    /// A provider was shut down (`error` is set when teardown reported one)
    fn on_provider_stopped(&self, _provider: &str, _error: Option<&ConnectionError>) {}

    /// A user utterance was appended to the conversation
    fn on_user_turn(&self, _utterance: &str) {}

    /// A model request is about to be sent
    fn on_model_requested(&self, _tool_count: usize) {}

    /// A tool invocation was routed to `provider`
    fn on_tool_invoked(&self, _provider: &str, _tool_name: &str, _invocation_id: &str) {}

    /// A tool invocation produced an error result (unknown tool included)
    fn on_tool_failed(&self, _tool_name: &str, _result: &ToolResult) {}

    /// A model turn was appended to the conversation
    fn on_turn_completed(&self, _turn: &ModelTurn) {}
}

/// No-op observer for tests and quiet mode
pub struct NoChatObserver;

impl ChatObserver for NoChatObserver {}
