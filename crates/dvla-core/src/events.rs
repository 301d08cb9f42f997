//! Inbound request and outbound stream event types.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Conversation id used when a request does not name one.
pub const DEFAULT_CONVERSATION_ID: &str = "default";

/// An inbound chat request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Text of the user's message.
    pub message: String,
    /// Conversation to continue; `"default"` when absent.
    #[serde(default, alias = "conversationId", skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        ChatRequest {
            message: message.into(),
            conversation_id: None,
        }
    }

    pub fn with_conversation(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }

    /// The conversation id this request addresses.
    pub fn conversation_id(&self) -> &str {
        self.conversation_id
            .as_deref()
            .unwrap_or(DEFAULT_CONVERSATION_ID)
    }
}

/// Kind of a terminal stream event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Response,
    Error,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Response => "response",
            EventKind::Error => "error",
        }
    }
}

/// One event on the outbound stream.
///
/// `data` is text-encoded JSON: `{"output": ...}` for a response,
/// `{"error": ...}` for an error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    pub event: EventKind,
    pub data: String,
}

impl StreamEvent {
    /// A successful final answer.
    pub fn response(output: impl AsRef<str>) -> Self {
        StreamEvent {
            event: EventKind::Response,
            data: json!({ "output": output.as_ref() }).to_string(),
        }
    }

    /// A failure with a human-readable description.
    pub fn error(message: impl AsRef<str>) -> Self {
        StreamEvent {
            event: EventKind::Error,
            data: json!({ "error": message.as_ref() }).to_string(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.event.as_str()
    }

    pub fn is_error(&self) -> bool {
        self.event == EventKind::Error
    }

    /// Pull the `output` or `error` string back out of `data`.
    pub fn payload_text(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(&self.data).ok()?;
        let key = match self.event {
            EventKind::Response => "output",
            EventKind::Error => "error",
        };
        value.get(key)?.as_str().map(str::to_string)
    }

    /// Render as a server-sent events frame.
    pub fn to_sse(&self) -> String {
        format!("event: {}\ndata: {}\n\n", self.name(), self.data)
    }
}
