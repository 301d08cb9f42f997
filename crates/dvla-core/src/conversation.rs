//! Conversation transcript: the ordered, append-only list of turns that is
//! replayed to the model on every round.
//!
//! A tool round contributes two turns: the invocation the model asked for and
//! the text the tool returned. Both carry the `tool-result` role; the
//! invocation keeps the original [`ToolCall`] so the context builder can
//! replay it in either tool protocol.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ToolCall;

// ─────────────────────────────────────────────
// Turn
// ─────────────────────────────────────────────

/// Coarse role of a turn in the transcript.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TurnRole {
    User,
    Assistant,
    ToolResult,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
            TurnRole::ToolResult => "tool-result",
        }
    }
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry in a conversation transcript. Immutable once appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Turn {
    /// A message from the human.
    User { content: String },
    /// Assistant text: the welcome message or a final answer.
    Assistant { content: String },
    /// The model's request to run a tool.
    ///
    /// `log` holds the raw model text the request was parsed from when the
    /// JSON action protocol is in use; it is `None` for native tool calls.
    ToolInvocation {
        call: ToolCall,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        log: Option<String>,
    },
    /// What the tool returned (or the text describing its failure).
    ToolResult {
        tool_call_id: String,
        name: String,
        content: String,
    },
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Turn::User {
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Turn::Assistant {
            content: content.into(),
        }
    }

    pub fn tool_invocation(call: ToolCall, log: Option<String>) -> Self {
        Turn::ToolInvocation { call, log }
    }

    pub fn tool_result(call: &ToolCall, content: impl Into<String>) -> Self {
        Turn::ToolResult {
            tool_call_id: call.id.clone(),
            name: call.function.name.clone(),
            content: content.into(),
        }
    }

    pub fn role(&self) -> TurnRole {
        match self {
            Turn::User { .. } => TurnRole::User,
            Turn::Assistant { .. } => TurnRole::Assistant,
            Turn::ToolInvocation { .. } | Turn::ToolResult { .. } => TurnRole::ToolResult,
        }
    }

    /// Text payload of the turn.
    ///
    /// For an invocation this is the raw model log when present, otherwise a
    /// `name(arguments)` rendering of the call.
    pub fn text(&self) -> String {
        match self {
            Turn::User { content } | Turn::Assistant { content } => content.clone(),
            Turn::ToolInvocation { call, log } => match log {
                Some(log) => log.clone(),
                None => format!("{}({})", call.function.name, call.function.arguments),
            },
            Turn::ToolResult { content, .. } => content.clone(),
        }
    }
}

// ─────────────────────────────────────────────
// Conversation
// ─────────────────────────────────────────────

/// A conversation keyed by an opaque id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    turns: Vec<Turn>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a conversation seeded with the assistant's welcome turn.
    pub fn new(id: impl Into<String>, welcome: impl Into<String>) -> Self {
        let now = Utc::now();
        Conversation {
            id: id.into(),
            turns: vec![Turn::assistant(welcome)],
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a turn to the end of the transcript.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
        self.updated_at = Utc::now();
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The user message awaiting an answer, if the transcript ends with one.
    pub fn pending_user_message(&self) -> Option<&str> {
        match self.turns.last() {
            Some(Turn::User { content }) => Some(content),
            _ => None,
        }
    }
}
