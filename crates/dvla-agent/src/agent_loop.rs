//! Agent loop: the LLM ↔ tool-calling reasoning loop.
//!
//! One call to [`AgentLoop::process_message`] appends the user's message to
//! its conversation and alternates model calls with tool calls until the
//! model gives a final answer or the round cap is reached.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use dvla_core::config::{AgentConfig, ToolProtocol};
use dvla_core::conversation::{Conversation, Turn};
use dvla_core::store::ConversationStore;
use dvla_core::types::{ToolCall, ToolDefinition};
use dvla_core::utils::truncate_string;
use dvla_providers::traits::{LlmProvider, LlmRequestConfig};

use crate::context::ContextBuilder;
use crate::error::AgentError;
use crate::parser::{parse_response, AgentResponse};
use crate::tools::registry::ToolRegistry;

/// Pseudo-tool recorded when the model's output could not be classified.
pub const EXCEPTION_TOOL: &str = "_Exception";

/// Tool result recorded for an unclassifiable model output.
pub const INVALID_RESPONSE: &str = "Invalid or incomplete response";

// ─────────────────────────────────────────────
// AgentLoop
// ─────────────────────────────────────────────

/// The reasoning loop: owns the provider, the tools, and the conversations.
pub struct AgentLoop {
    /// LLM provider.
    provider: Arc<dyn LlmProvider>,
    /// Tool registry, immutable after construction.
    tools: ToolRegistry,
    /// Conversation store shared with whoever else needs transcripts.
    store: Arc<ConversationStore>,
    /// Context builder.
    context: ContextBuilder,
    /// Model to use (provider default when the config leaves it empty).
    model: String,
    /// Max model rounds per user message.
    max_iterations: usize,
    /// LLM request config (temperature, max_tokens).
    request_config: LlmRequestConfig,
}

impl AgentLoop {
    /// Create a new agent loop.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: ToolRegistry,
        store: Arc<ConversationStore>,
        config: &AgentConfig,
    ) -> Self {
        let model = if config.model.is_empty() {
            provider.default_model().to_string()
        } else {
            config.model.clone()
        };
        let context = ContextBuilder::new(
            config.system_policy.clone(),
            config.tool_protocol,
            tools.descriptions(),
        );

        info!(
            model = %model,
            provider = provider.display_name(),
            tools = tools.len(),
            max_iterations = config.max_iterations,
            protocol = %config.tool_protocol,
            "agent loop initialized"
        );

        Self {
            provider,
            tools,
            store,
            context,
            model,
            max_iterations: config.max_iterations as usize,
            request_config: LlmRequestConfig::from(config),
        }
    }

    /// Answer one user message in the given conversation.
    ///
    /// The conversation is locked for the whole execution, so concurrent
    /// messages to the same id are answered one after the other.
    pub async fn process_message(
        &self,
        conversation_id: &str,
        message: &str,
    ) -> Result<String, AgentError> {
        let handle = self.store.get_or_create(conversation_id);
        let mut conversation = handle.lock().await;

        debug!(conversation = %conversation_id, "received message");
        conversation.push(Turn::user(message));

        self.run(&mut conversation).await
    }

    /// Run the loop over a transcript that ends with an unanswered user turn.
    ///
    /// Returns [`AgentError::NoPendingMessage`] without calling the model if
    /// there is nothing to answer.
    pub async fn run(&self, conversation: &mut Conversation) -> Result<String, AgentError> {
        if conversation.pending_user_message().is_none() {
            warn!(conversation = %conversation.id, "no pending user message");
            return Err(AgentError::NoPendingMessage);
        }

        let tool_defs: Option<Vec<ToolDefinition>> = match self.context.protocol() {
            ToolProtocol::Native => Some(self.tools.definitions()),
            ToolProtocol::Json => None,
        };

        for round in 0..self.max_iterations {
            let messages = self.context.build_messages(conversation.turns());
            debug!(conversation = %conversation.id, round, "LLM call");

            let response = self
                .provider
                .chat(
                    &messages,
                    tool_defs.as_deref(),
                    &self.model,
                    &self.request_config,
                )
                .await
                .map_err(|e| {
                    error!(conversation = %conversation.id, round, error = %e, "LLM call failed");
                    AgentError::from(e)
                })?;

            let call_id = format!("call_{}", conversation.len());
            match parse_response(&response, &call_id) {
                AgentResponse::FinalAnswer { text } => {
                    info!(conversation = %conversation.id, round, "final answer");
                    conversation.push(Turn::assistant(text.clone()));
                    return Ok(text);
                }
                AgentResponse::ToolCall { call, log } => {
                    self.run_tool(conversation, call, log, round).await;
                }
                AgentResponse::Unparseable { raw } => {
                    warn!(
                        conversation = %conversation.id,
                        round,
                        output = %truncate_string(&raw, 200),
                        "could not parse LLM output"
                    );
                    let call = ToolCall::new(call_id, EXCEPTION_TOOL, raw.clone());
                    conversation.push(Turn::tool_invocation(call.clone(), Some(raw)));
                    conversation.push(Turn::tool_result(&call, INVALID_RESPONSE));
                }
            }
        }

        warn!(
            conversation = %conversation.id,
            rounds = self.max_iterations,
            "iteration limit reached without a final answer"
        );
        Err(AgentError::NonConvergence {
            rounds: self.max_iterations,
        })
    }

    /// Execute one requested tool and record the invocation and its result.
    ///
    /// Failures are recorded as the result text; they never abort the loop.
    async fn run_tool(
        &self,
        conversation: &mut Conversation,
        call: ToolCall,
        log: Option<String>,
        round: usize,
    ) {
        info!(
            conversation = %conversation.id,
            tool = %call.function.name,
            round,
            "executing tool call"
        );
        conversation.push(Turn::tool_invocation(call.clone(), log));

        let result = match self.tools.execute(call.name(), call.arguments()).await {
            Ok(output) => output,
            Err(e) => e.to_string(),
        };

        debug!(
            tool = %call.function.name,
            result_len = result.len(),
            "tool result"
        );
        conversation.push(Turn::tool_result(&call, result));
    }

    /// The tool registry.
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// The conversation store.
    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    /// The model in use.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
