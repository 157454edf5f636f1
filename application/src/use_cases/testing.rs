//! In-memory test doubles shared by the use case tests.

use crate::ports::chat_observer::ChatObserver;
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use toolrelay_domain::{
    ConnectionError, ConnectionState, ConversationTurn, ModelTurn, ToolDescriptor, ToolProvider,
    ToolResult,
};

/// Ordered record of provider calls, shared across providers of one test.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Scriptable provider that records every lifecycle call into an [`EventLog`].
pub struct MockProvider {
    name: String,
    tools: Vec<ToolDescriptor>,
    responses: HashMap<String, ToolResult>,
    delays: HashMap<String, Duration>,
    state: Mutex<ConnectionState>,
    log: EventLog,
    fail_init: bool,
    fail_shutdown: bool,
    fail_invoke: bool,
}

impl MockProvider {
    pub fn new(name: &str, log: &EventLog) -> Self {
        Self {
            name: name.to_string(),
            tools: Vec::new(),
            responses: HashMap::new(),
            delays: HashMap::new(),
            state: Mutex::new(ConnectionState::Uninitialized),
            log: log.clone(),
            fail_init: false,
            fail_shutdown: false,
            fail_invoke: false,
        }
    }

    pub fn with_tool(mut self, name: &str) -> Self {
        self.tools.push(ToolDescriptor::new(
            name,
            format!("{} from {}", name, self.name),
            serde_json::json!({"type": "object", "properties": {}}),
        ));
        self
    }

    /// Answer `tool` with a fixed result (its id is rewritten per call).
    pub fn with_response(mut self, tool: &str, result: ToolResult) -> Self {
        self.responses.insert(tool.to_string(), result);
        self
    }

    /// Make `tool` take `delay` and record `done:<provider>:<tool>:<id>`
    /// when it completes.
    pub fn with_delay(mut self, tool: &str, delay: Duration) -> Self {
        self.delays.insert(tool.to_string(), delay);
        self
    }

    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub fn failing_shutdown(mut self) -> Self {
        self.fail_shutdown = true;
        self
    }

    pub fn failing_invoke(mut self) -> Self {
        self.fail_invoke = true;
        self
    }

    pub fn boxed(self) -> Box<dyn ToolProvider> {
        Box::new(self)
    }

    fn record(&self, event: String) {
        self.log.lock().unwrap().push(event);
    }

    fn require_ready(&self) -> Result<(), ConnectionError> {
        let state = *self.state.lock().unwrap();
        if state != ConnectionState::Ready {
            return Err(ConnectionError::invalid_state(
                &self.name,
                ConnectionState::Ready,
                state,
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ToolProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> ConnectionState {
        *self.state.lock().unwrap()
    }

    async fn initialize(&self) -> Result<(), ConnectionError> {
        self.record(format!("init:{}", self.name));
        let mut state = self.state.lock().unwrap();
        if *state != ConnectionState::Uninitialized {
            return Err(ConnectionError::invalid_state(
                &self.name,
                ConnectionState::Uninitialized,
                *state,
            ));
        }
        if self.fail_init {
            return Err(ConnectionError::Handshake {
                provider: self.name.clone(),
                message: "server exited during initialize".to_string(),
            });
        }
        *state = ConnectionState::Ready;
        Ok(())
    }

    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ConnectionError> {
        self.require_ready()?;
        self.record(format!("list:{}", self.name));
        Ok(self.tools.clone())
    }

    async fn invoke_tool(
        &self,
        tool_name: &str,
        invocation_id: &str,
        arguments: Value,
    ) -> Result<ToolResult, ConnectionError> {
        self.require_ready()?;
        self.record(format!("invoke:{}:{}:{}", self.name, tool_name, invocation_id));
        if self.fail_invoke {
            return Err(ConnectionError::Closed {
                provider: self.name.clone(),
            });
        }
        if let Some(delay) = self.delays.get(tool_name) {
            tokio::time::sleep(*delay).await;
            self.record(format!("done:{}:{}:{}", self.name, tool_name, invocation_id));
        }
        match self.responses.get(tool_name) {
            Some(result) => {
                let mut result = result.clone();
                result.tool_use_id = invocation_id.to_string();
                Ok(result)
            }
            None => Ok(ToolResult::success(
                invocation_id,
                format!("{}:{}:{}", self.name, tool_name, arguments),
            )),
        }
    }

    async fn shutdown(&self) -> Result<(), ConnectionError> {
        self.record(format!("shutdown:{}", self.name));
        *self.state.lock().unwrap() = ConnectionState::Closed;
        if self.fail_shutdown {
            return Err(ConnectionError::Closed {
                provider: self.name.clone(),
            });
        }
        Ok(())
    }
}

/// One recorded gateway request.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub messages: Vec<ConversationTurn>,
    pub system_prompt: String,
    pub tools: Vec<Value>,
}

/// Gateway that replays a fixed script of responses and records requests.
pub struct ScriptedGateway {
    script: Mutex<VecDeque<Result<ModelTurn, GatewayError>>>,
    requests: Mutex<Vec<GatewayRequest>>,
}

impl ScriptedGateway {
    pub fn new(script: Vec<Result<ModelTurn, GatewayError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<GatewayRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    fn model_id(&self) -> &str {
        "scripted"
    }

    async fn respond(
        &self,
        messages: &[ConversationTurn],
        system_prompt: &str,
        tools: &[Value],
    ) -> Result<ModelTurn, GatewayError> {
        self.requests.lock().unwrap().push(GatewayRequest {
            messages: messages.to_vec(),
            system_prompt: system_prompt.to_string(),
            tools: tools.to_vec(),
        });
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Other("script exhausted".to_string())))
    }
}

/// Observer that records hook calls as strings.
#[derive(Default)]
pub struct RecordingObserver {
    pub calls: Mutex<Vec<String>>,
}

impl ChatObserver for RecordingObserver {
    fn on_provider_started(&self, provider: &str) {
        self.calls.lock().unwrap().push(format!("started:{}", provider));
    }

    fn on_provider_stopped(&self, provider: &str, error: Option<&ConnectionError>) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("stopped:{}:{}", provider, error.is_some()));
    }

    fn on_tool_invoked(&self, provider: &str, tool_name: &str, _invocation_id: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("invoked:{}:{}", provider, tool_name));
    }

    fn on_tool_failed(&self, tool_name: &str, _result: &ToolResult) {
        self.calls.lock().unwrap().push(format!("failed:{}", tool_name));
    }
}
