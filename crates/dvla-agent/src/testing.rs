//! Test doubles shared by the loop and stream tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use dvla_core::types::{LlmResponse, Message, ToolCall, ToolDefinition};
use dvla_providers::{LlmProvider, LlmRequestConfig, ProviderError};

use crate::tools::{Tool, ToolRegistry};

/// One recorded `chat` call.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub messages: Vec<Message>,
    pub tools: Option<Vec<ToolDefinition>>,
}

/// A provider that replays a script of responses and records every request.
///
/// Once the script runs out it answers with a transport-style error.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<LlmResponse, ProviderError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<LlmResponse, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn replies(replies: Vec<LlmResponse>) -> Self {
        Self::new(replies.into_iter().map(Ok).collect())
    }

    /// Sleep this long inside every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        _model: &str,
        _config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            messages: messages.to_vec(),
            tools: tools.map(<[ToolDefinition]>::to_vec),
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or(Err(ProviderError::Status {
            status: 503,
            body: "script exhausted".into(),
        }))
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    fn display_name(&self) -> &str {
        "ScriptedProvider"
    }
}

/// Native tool call response.
pub fn call(id: &str, name: &str, arguments: Value) -> LlmResponse {
    LlmResponse::tool_call(ToolCall::new(id, name, arguments.to_string()))
}

/// Identity tool returning a fixed user id.
pub struct StubIdentity(pub &'static str);

#[async_trait]
impl Tool for StubIdentity {
    fn name(&self) -> &str {
        "GetCurrentUser"
    }
    fn description(&self) -> &str {
        "Returns the current user for querying transactions. Takes no arguments."
    }
    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {}, "required": [] })
    }
    async fn execute(&self, _params: HashMap<String, Value>) -> anyhow::Result<String> {
        Ok(json!({ "userId": self.0 }).to_string())
    }
}

/// Transactions tool serving a fixed table per user id.
pub struct StubTransactions(pub HashMap<&'static str, &'static str>);

#[async_trait]
impl Tool for StubTransactions {
    fn name(&self) -> &str {
        "GetUserTransactions"
    }
    fn description(&self) -> &str {
        "Returns the transactions associated to the userId provided."
    }
    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "userId": { "type": "string" } },
            "required": ["userId"]
        })
    }
    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let id = crate::tools::base::require_id(&params, "userId")?;
        Ok(self.0.get(id.as_str()).copied().unwrap_or("[]").to_string())
    }
}

/// Tool that always fails.
pub struct BrokenTool;

#[async_trait]
impl Tool for BrokenTool {
    fn name(&self) -> &str {
        "Broken"
    }
    fn description(&self) -> &str {
        "Always fails."
    }
    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {}, "required": [] })
    }
    async fn execute(&self, _params: HashMap<String, Value>) -> anyhow::Result<String> {
        anyhow::bail!("database unavailable")
    }
}

/// Registry with the two stub bank tools.
pub fn stub_registry(current_user: &'static str, tables: &[(&'static str, &'static str)]) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(StubIdentity(current_user)));
    registry.register(Arc::new(StubTransactions(tables.iter().copied().collect())));
    registry
}
