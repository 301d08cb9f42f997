//! DVLA Agent: reasoning loop, tools, and streaming delivery.
//!
//! This crate contains:
//! - **tools**: Tool trait, ordered registry, and the bank tools
//! - **parser**: classification of model output into answer / tool call
//! - **context**: system prompt and message list construction
//! - **agent_loop**: the LLM ↔ tool-calling loop
//! - **stream**: single-event delivery of one loop execution

pub mod agent_loop;
pub mod context;
pub mod error;
pub mod parser;
pub mod stream;
pub mod tools;

#[cfg(test)]
pub(crate) mod testing;

pub use agent_loop::AgentLoop;
pub use context::ContextBuilder;
pub use error::{AgentError, ToolError};
pub use parser::AgentResponse;
pub use stream::stream_chat;
pub use tools::{Tool, ToolRegistry};
