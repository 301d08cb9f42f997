//! LLM provider layer for DVLA.
//!
//! # Architecture
//!
//! - [`traits::LlmProvider`]: trait the reasoning loop calls once per round
//! - [`error::ProviderError`]: transport and protocol failures
//! - [`http_provider::HttpProvider`]: OpenAI-compatible HTTP client

pub mod error;
pub mod http_provider;
pub mod traits;

// Re-export main types for convenience
pub use error::ProviderError;
pub use http_provider::HttpProvider;
pub use traits::{LlmProvider, LlmRequestConfig};
