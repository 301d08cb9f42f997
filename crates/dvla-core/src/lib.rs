//! Core types for DVLA: chat wire types, the conversation transcript and
//! its store, stream events, configuration, and path helpers.

pub mod config;
pub mod conversation;
pub mod events;
pub mod store;
pub mod types;
pub mod utils;

pub use conversation::{Conversation, Turn, TurnRole};
pub use events::{ChatRequest, EventKind, StreamEvent};
pub use store::{ConversationHandle, ConversationStore};
