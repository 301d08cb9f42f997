//! Error types for tool dispatch and the reasoning loop.

use dvla_providers::ProviderError;
use thiserror::Error;

/// A tool call that could not produce output.
///
/// The loop never propagates these: the rendered message becomes the
/// tool-result turn so the model can react to it.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{name} is not a valid tool, try one of [{}].", available.join(", "))]
    NotFound { name: String, available: Vec<String> },

    #[error("Invalid arguments for {name}: {reason}")]
    InvalidArguments { name: String, reason: String },

    #[error("Error executing {name}: {reason}")]
    Failed { name: String, reason: String },
}

/// Why a reasoning loop execution ended without an answer.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The round cap was reached without a final answer.
    #[error("Agent stopped due to iteration limit or time limit.")]
    NonConvergence { rounds: usize },

    /// The model could not be reached or answered with garbage.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The transcript does not end with an unanswered user message.
    #[error("No pending user message to answer")]
    NoPendingMessage,

    /// The worker task running the loop panicked or was cancelled.
    #[error("Agent worker failed: {0}")]
    Worker(String),
}
