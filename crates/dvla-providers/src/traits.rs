//! LLM Provider trait: the model-invocation seam of the reasoning loop.
//!
//! The `HttpProvider` in `http_provider.rs` covers OpenAI-compatible APIs;
//! tests substitute scripted providers.

use async_trait::async_trait;
use dvla_core::config::AgentConfig;
use dvla_core::types::{LlmResponse, Message, ToolDefinition};

use crate::error::ProviderError;

/// Configuration passed to each LLM call.
#[derive(Clone, Debug, PartialEq)]
pub struct LlmRequestConfig {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl Default for LlmRequestConfig {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.0,
        }
    }
}

impl From<&AgentConfig> for LlmRequestConfig {
    fn from(agent: &AgentConfig) -> Self {
        Self {
            max_tokens: agent.max_tokens,
            temperature: agent.temperature,
        }
    }
}

/// Trait that all LLM providers must implement.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat completion request.
    ///
    /// # Arguments
    /// * `messages`: System prompt plus the rendered transcript.
    /// * `tools`   : Tool definitions offered natively, if any.
    /// * `model`   : Model identifier (e.g. `"gpt-4o-mini"`).
    /// * `config`  : Temperature, max_tokens.
    ///
    /// # Errors
    /// Any failure to obtain a response is returned as a [`ProviderError`];
    /// the caller treats it as fatal for the current request.
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError>;

    /// The default model for this provider instance.
    fn default_model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
