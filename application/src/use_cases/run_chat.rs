//! Run Chat use case.
//!
//! Drives one conversation between the user, the model gateway and the
//! [`ProviderGroup`]. Each utterance is one turn cycle:
//!
//! ```text
//! AwaitingUserInput ─send()─▶ ModelRequested ─end_turn──────────────────▶ AwaitingUserInput
//!                                   │
//!                                   └─tool_use─▶ ToolDispatch ─▶ FollowUpRequested ─▶ AwaitingUserInput
//! ```
//!
//! Any error moves the loop to [`LoopState::Failed`]; later calls to
//! [`ConversationLoop::send`] return [`ChatError::SessionTerminated`].

use crate::config::ChatParams;
use crate::ports::chat_observer::{ChatObserver, NoChatObserver};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::use_cases::provider_group::ProviderGroup;
use futures::future::join_all;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use toolrelay_domain::util::truncate_str;
use toolrelay_domain::{
    ConnectionError, Conversation, ConversationTurn, ModelTurn, Role, ToolResult, ToolUse,
    render_tool_specs,
};
use tracing::{debug, info, warn};

/// Answer for a `toolUse` the loop never dispatched
const TOOL_NOT_EXECUTED: &str = "Tool call was not executed";

/// Errors that can occur during a chat session.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Model stopped for tool use but sent no toolUse blocks")]
    MalformedResponse,

    #[error("Tool provider error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Conversation was terminated by an earlier error")]
    SessionTerminated,
}

/// Where the conversation loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    AwaitingUserInput,
    ModelRequested,
    ToolDispatch,
    FollowUpRequested,
    Failed,
}

/// Conversation loop over a borrowed, open [`ProviderGroup`].
///
/// The loop never outlives the group it routes through, so teardown stays
/// with whoever opened the group.
pub struct ConversationLoop<'g> {
    group: &'g ProviderGroup,
    gateway: Arc<dyn LlmGateway>,
    params: ChatParams,
    conversation: Conversation,
    state: LoopState,
    observer: Arc<dyn ChatObserver>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl<'g> ConversationLoop<'g> {
    pub fn new(group: &'g ProviderGroup, gateway: Arc<dyn LlmGateway>, params: ChatParams) -> Self {
        Self {
            group,
            gateway,
            params,
            conversation: Conversation::new(),
            state: LoopState::AwaitingUserInput,
            observer: Arc::new(NoChatObserver),
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ChatObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// The provider group tool calls are routed through
    pub fn group(&self) -> &'g ProviderGroup {
        self.group
    }

    pub fn model_id(&self) -> &str {
        self.gateway.model_id()
    }

    /// Read-only conversation history
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Process one user utterance and return the model's final turn for it.
    pub async fn send(&mut self, utterance: &str) -> Result<ModelTurn, ChatError> {
        if self.state == LoopState::Failed {
            return Err(ChatError::SessionTerminated);
        }

        match self.turn_cycle(utterance).await {
            Ok(turn) => {
                self.state = LoopState::AwaitingUserInput;
                Ok(turn)
            }
            Err(e) => {
                warn!(error = %e, "Conversation failed");
                self.state = LoopState::Failed;
                Err(e)
            }
        }
    }

    /// Send each utterance in order, pausing between them.
    ///
    /// Stops at the first error.
    pub async fn run(&mut self, utterances: &[String]) -> Result<Vec<ModelTurn>, ChatError> {
        let mut turns = Vec::with_capacity(utterances.len());
        for (i, utterance) in utterances.iter().enumerate() {
            if i > 0 && !self.params.utterance_delay.is_zero() {
                debug!(
                    "Pausing {:?} before next utterance",
                    self.params.utterance_delay
                );
                tokio::time::sleep(self.params.utterance_delay).await;
            }
            turns.push(self.send(utterance).await?);
        }
        Ok(turns)
    }

    async fn turn_cycle(&mut self, utterance: &str) -> Result<ModelTurn, ChatError> {
        info!("User: {}", truncate_str(utterance, 100));
        let leftover = self.unanswered_tool_uses();
        if leftover.is_empty() {
            self.conversation.push(ConversationTurn::user_text(utterance));
        } else {
            warn!(
                count = leftover.len(),
                "Answering tool calls left open by the previous turn as not executed"
            );
            self.conversation_logger.log(ConversationEvent::new(
                "tool_results",
                json!({ "results": serde_json::to_value(&leftover).unwrap_or_default() }),
            ));
            self.conversation
                .push(ConversationTurn::user_text_after_results(leftover, utterance));
        }
        self.observer.on_user_turn(utterance);
        self.conversation_logger.log(ConversationEvent::new(
            "user_turn",
            json!({ "text": utterance }),
        ));

        // Catalog is fetched once and reused for the follow-up request
        let catalog = self.group.list_all_tools().await?;
        let tool_specs = render_tool_specs(&catalog);
        debug!("Offering {} tool(s) to the model", tool_specs.len());

        self.state = LoopState::ModelRequested;
        let turn = self.request_model(&tool_specs).await?;

        if !turn.stop_reason.requests_tools() {
            return Ok(turn);
        }

        let tool_uses: Vec<ToolUse> = turn.tool_uses().cloned().collect();
        if tool_uses.is_empty() {
            return Err(ChatError::MalformedResponse);
        }

        self.state = LoopState::ToolDispatch;
        let results = self.dispatch_tools(&tool_uses).await?;
        self.conversation_logger.log(ConversationEvent::new(
            "tool_results",
            json!({ "results": serde_json::to_value(&results).unwrap_or_default() }),
        ));
        self.conversation.push(ConversationTurn::tool_results(results));

        self.state = LoopState::FollowUpRequested;
        let final_turn = self.request_model(&tool_specs).await?;
        if final_turn.stop_reason.requests_tools() {
            warn!("Follow-up turn requested more tools; they are answered as not executed with the next utterance");
        }
        Ok(final_turn)
    }

    /// Error results for `toolUse` blocks in the last turn that nothing
    /// answered, so the next request stays well-formed.
    fn unanswered_tool_uses(&self) -> Vec<ToolResult> {
        match self.conversation.last() {
            Some(turn) if turn.role == Role::Assistant => turn
                .tool_uses()
                .map(|tu| ToolResult::error(&tu.id, TOOL_NOT_EXECUTED))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Invoke every requested tool concurrently, keeping emission order.
    async fn dispatch_tools(&self, tool_uses: &[ToolUse]) -> Result<Vec<ToolResult>, ChatError> {
        info!("Dispatching {} tool call(s)", tool_uses.len());
        let group = self.group;
        let futures = tool_uses
            .iter()
            .map(|tu| group.resolve_and_invoke(&tu.name, &tu.id, tu.input.clone()));

        let results = join_all(futures)
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(results)
    }

    async fn request_model(
        &mut self,
        tool_specs: &[serde_json::Value],
    ) -> Result<ModelTurn, ChatError> {
        self.observer.on_model_requested(tool_specs.len());
        let turn = self
            .gateway
            .respond(
                self.conversation.turns(),
                &self.params.system_prompt,
                tool_specs,
            )
            .await?;

        debug!(stop_reason = %turn.stop_reason, "Model turn received");
        self.conversation.push(turn.to_turn());
        self.conversation_logger.log(ConversationEvent::new(
            "model_turn",
            json!({
                "model": self.gateway.model_id(),
                "stop_reason": turn.stop_reason.to_string(),
                "content": serde_json::to_value(&turn.content).unwrap_or_default(),
            }),
        ));
        self.observer.on_turn_completed(&turn);
        Ok(turn)
    }
}
