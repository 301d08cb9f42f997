//! Classification of a model response into the loop's next step.
//!
//! Two shapes of tool request are understood: native function calls, and a
//! JSON action blob in the message text:
//!
//! ````text
//! ```json
//! {"action": "GetUserTransactions", "action_input": "1"}
//! ```
//! ````
//!
//! The action `"Final Answer"` ends the loop with `action_input` as the
//! answer. Plain prose is taken as a final answer as well.

use serde_json::Value;
use tracing::warn;

use dvla_core::types::{LlmResponse, ToolCall};

/// Action name that ends the loop in the JSON protocol.
pub const FINAL_ANSWER_ACTION: &str = "Final Answer";

const ACTION_KEY: &str = "\"action\"";

/// What the model asked for this round.
#[derive(Clone, Debug, PartialEq)]
pub enum AgentResponse {
    /// Done: this text is the answer.
    FinalAnswer { text: String },
    /// Run one tool. `log` is the model text it was parsed from, when the
    /// request came as a JSON blob rather than a native call.
    ToolCall { call: ToolCall, log: Option<String> },
    /// Neither of the above.
    Unparseable { raw: String },
}

/// Classify `response`. `call_id` names the tool call when the model did not
/// supply an id itself (JSON protocol).
pub fn parse_response(response: &LlmResponse, call_id: &str) -> AgentResponse {
    if let Some(first) = response.tool_calls.first() {
        if response.tool_calls.len() > 1 {
            warn!(
                requested = response.tool_calls.len(),
                used = %first.function.name,
                "model requested several tools; running only the first"
            );
        }
        let mut call = first.clone();
        if call.id.is_empty() {
            call.id = call_id.to_string();
        }
        return AgentResponse::ToolCall { call, log: None };
    }

    let text = response.content.as_deref().unwrap_or("").trim();
    if text.is_empty() {
        return AgentResponse::Unparseable { raw: String::new() };
    }

    match action_blob(text) {
        Some(blob) => parse_action(blob, text, call_id),
        None => AgentResponse::FinalAnswer {
            text: text.to_string(),
        },
    }
}

/// The candidate action blob inside `text`, if the text mentions an action.
///
/// The blob runs from the first `{` to the last `}`, or to the end of the
/// text when the closing brace is missing. A blob that does not parse makes
/// the whole response unparseable rather than a final answer.
fn action_blob(text: &str) -> Option<&str> {
    if !text.contains(ACTION_KEY) {
        return None;
    }
    let candidate = fenced_block(text)
        .filter(|block| block.contains(ACTION_KEY))
        .unwrap_or(text);
    let start = candidate.find('{')?;
    let blob = match candidate.rfind('}') {
        Some(end) if end > start => &candidate[start..=end],
        _ => &candidate[start..],
    };
    Some(blob.trim())
}

/// Contents of the first triple-backtick fenced block, with an optional
/// `json` tag. An unclosed fence runs to the end of the text.
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")? + 3;
    let rest = &text[start..];
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    Some(rest.find("```").map_or(rest, |end| &rest[..end]))
}

fn parse_action(blob: &str, raw: &str, call_id: &str) -> AgentResponse {
    let unparseable = || AgentResponse::Unparseable {
        raw: raw.to_string(),
    };

    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(blob) else {
        return unparseable();
    };
    let Some(action) = map.get("action").and_then(Value::as_str) else {
        return unparseable();
    };
    let input = map.get("action_input").cloned().unwrap_or(Value::Null);

    if action == FINAL_ANSWER_ACTION {
        let text = match input {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        };
        return AgentResponse::FinalAnswer { text };
    }

    let arguments = match input {
        Value::String(s) => s,
        Value::Null => "{}".to_string(),
        other => other.to_string(),
    };
    AgentResponse::ToolCall {
        call: ToolCall::new(call_id, action.trim(), arguments),
        log: Some(raw.to_string()),
    }
}
