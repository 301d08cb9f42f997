//! Provider error type.

use thiserror::Error;

/// Failure to obtain a model response. Fatal to the current request.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request never produced an HTTP response (connect, timeout, TLS).
    #[error("Error calling LLM: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("Error calling LLM: {status} - {body}")]
    Status { status: u16, body: String },

    /// The response body was not a chat completion.
    #[error("Error parsing LLM response: {0}")]
    Decode(String),

    /// The completion carried no choices.
    #[error("LLM response contained no choices")]
    EmptyChoices,
}

impl ProviderError {
    /// Whether the failure happened before any response arrived.
    pub fn is_transport(&self) -> bool {
        matches!(self, ProviderError::Http(_))
    }
}
