//! Context builder: constructs the system prompt and the message list sent
//! to the model each round.
//!
//! The whole transcript is replayed every round. Tool rounds are rendered in
//! one of two ways:
//! - native calls become an assistant `tool_calls` message followed by a
//!   `tool` message;
//! - text-protocol calls become the assistant's raw action text followed by
//!   a user-side `TOOL RESPONSE` message.

use std::collections::HashSet;

use dvla_core::config::ToolProtocol;
use dvla_core::conversation::Turn;
use dvla_core::types::Message;
use tracing::debug;

use crate::parser::FINAL_ANSWER_ACTION;

// ─────────────────────────────────────────────
// Context builder
// ─────────────────────────────────────────────

/// Builds system prompts and conversation message lists for the agent loop.
#[derive(Clone, Debug)]
pub struct ContextBuilder {
    /// Policy text leading every system prompt.
    system_policy: String,
    protocol: ToolProtocol,
    /// `(name, description)` of every registered tool.
    tools: Vec<(String, String)>,
}

impl ContextBuilder {
    pub fn new(
        system_policy: impl Into<String>,
        protocol: ToolProtocol,
        tools: Vec<(String, String)>,
    ) -> Self {
        Self {
            system_policy: system_policy.into(),
            protocol,
            tools,
        }
    }

    pub fn protocol(&self) -> ToolProtocol {
        self.protocol
    }

    // ────────────── System prompt ──────────────

    /// Build the full system prompt.
    ///
    /// With the native protocol this is the policy alone; tools travel as
    /// definitions. With the JSON protocol the tool list and the response
    /// format are spelled out after the policy.
    pub fn build_system_prompt(&self) -> String {
        match self.protocol {
            ToolProtocol::Native => self.system_policy.clone(),
            ToolProtocol::Json => {
                let mut parts = vec![self.system_policy.clone()];
                parts.push(self.build_tools_section());
                parts.push(format_instructions(&self.tool_names()));
                parts.join("\n\n")
            }
        }
    }

    fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|(n, _)| n.as_str()).collect()
    }

    fn build_tools_section(&self) -> String {
        let mut section = String::from("## Tools\n\nAssistant can use these tools:\n");
        for (name, description) in &self.tools {
            section.push_str(&format!("\n> {name}: {description}"));
        }
        section
    }

    // ────────────── Messages ──────────────

    /// Build the complete message list for one model call.
    ///
    /// 1. System prompt
    /// 2. Every turn of the transcript, in order
    pub fn build_messages(&self, turns: &[Turn]) -> Vec<Message> {
        let mut messages = Vec::with_capacity(turns.len() + 1);
        messages.push(Message::system(self.build_system_prompt()));

        // Ids of invocations replayed as native tool calls; their results
        // must be `tool` messages.
        let mut native_ids: HashSet<&str> = HashSet::new();

        for turn in turns {
            match turn {
                Turn::User { content } => messages.push(Message::user(content)),
                Turn::Assistant { content } => messages.push(Message::assistant(content)),
                Turn::ToolInvocation { call, log: None } => {
                    native_ids.insert(call.id.as_str());
                    messages.push(Message::assistant_tool_calls(vec![call.clone()]));
                }
                Turn::ToolInvocation {
                    log: Some(log), ..
                } => messages.push(Message::assistant(log)),
                Turn::ToolResult {
                    tool_call_id,
                    content,
                    ..
                } => {
                    if native_ids.contains(tool_call_id.as_str()) {
                        messages.push(Message::tool_result(tool_call_id, content));
                    } else {
                        messages.push(Message::user(tool_response(content, self.protocol)));
                    }
                }
            }
        }

        debug!(
            turns = turns.len(),
            messages = messages.len(),
            protocol = %self.protocol,
            "built context"
        );
        messages
    }
}

/// How the model must answer under the JSON protocol.
fn format_instructions(tool_names: &[&str]) -> String {
    format!(
        "## Response format\n\n\
         Reply with a markdown code snippet holding exactly one JSON blob and nothing else.\n\n\
         To use a tool:\n\
         ```json\n{{\"action\": string, \"action_input\": string}}\n```\n\
         where `action` is one of [{names}] and `action_input` is the tool input.\n\n\
         To answer the user:\n\
         ```json\n{{\"action\": \"{final_answer}\", \"action_input\": string}}\n```\n\
         where `action_input` is your reply.",
        names = tool_names.join(", "),
        final_answer = FINAL_ANSWER_ACTION,
    )
}

/// User-side wrapper for a tool result replayed as text. The closing
/// instruction names the answer shape the current protocol expects.
fn tool_response(content: &str, protocol: ToolProtocol) -> String {
    let instruction = match protocol {
        ToolProtocol::Json => {
            "Reply to my last message using this information, as a single JSON blob \
             in the response format."
        }
        ToolProtocol::Native => {
            "Reply to my last message using this information, either with your \
             answer or with one tool call."
        }
    };
    format!("TOOL RESPONSE:\n---------------------\n{content}\n\n{instruction}")
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use dvla_core::types::ToolCall;

    fn tools() -> Vec<(String, String)> {
        vec![
            ("GetCurrentUser".into(), "Returns the current user.".into()),
            ("GetUserTransactions".into(), "Returns transactions.".into()),
        ]
    }

    #[test]
    fn test_native_prompt_is_policy_only() {
        let ctx = ContextBuilder::new("Only use GetCurrentUser.", ToolProtocol::Native, tools());
        assert_eq!(ctx.build_system_prompt(), "Only use GetCurrentUser.");
    }

    #[test]
    fn test_json_prompt_lists_tools_and_format() {
        let ctx = ContextBuilder::new("Policy.", ToolProtocol::Json, tools());
        let prompt = ctx.build_system_prompt();
        assert!(prompt.starts_with("Policy."));
        assert!(prompt.contains("> GetCurrentUser: Returns the current user."));
        assert!(prompt.contains("> GetUserTransactions: Returns transactions."));
        assert!(prompt.contains("[GetCurrentUser, GetUserTransactions]"));
        assert!(prompt.contains("\"action\": \"Final Answer\""));
    }

    #[test]
    fn test_native_tool_round_replay() {
        let ctx = ContextBuilder::new("Policy.", ToolProtocol::Native, tools());
        let call = ToolCall::new("call_1", "GetCurrentUser", "{}");
        let turns = vec![
            Turn::assistant("Welcome"),
            Turn::user("What are my recent transactions?"),
            Turn::tool_invocation(call.clone(), None),
            Turn::tool_result(&call, r#"{"userId":"1"}"#),
        ];

        let messages = ctx.build_messages(&turns);
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[0].role(), "system");
        assert_eq!(messages[1], Message::assistant("Welcome"));
        assert_eq!(messages[3], Message::assistant_tool_calls(vec![call]));
        assert_eq!(messages[4], Message::tool_result("call_1", r#"{"userId":"1"}"#));
    }

    #[test]
    fn test_text_tool_round_replay() {
        let ctx = ContextBuilder::new("Policy.", ToolProtocol::Json, tools());
        let log = r#"{"action": "GetCurrentUser", "action_input": ""}"#;
        let call = ToolCall::new("call_1", "GetCurrentUser", "");
        let turns = vec![
            Turn::user("hi"),
            Turn::tool_invocation(call.clone(), Some(log.into())),
            Turn::tool_result(&call, r#"{"userId":"1"}"#),
        ];

        let messages = ctx.build_messages(&turns);
        assert_eq!(messages[2], Message::assistant(log));
        match &messages[3] {
            Message::User { content } => {
                assert!(content.starts_with("TOOL RESPONSE:"));
                assert!(content.contains(r#"{"userId":"1"}"#));
                assert!(content.contains("single JSON blob"));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_mixed_rounds_in_one_transcript() {
        // A parse failure under the native protocol is replayed as text while
        // the native round next to it keeps the tool-call shape.
        let ctx = ContextBuilder::new("Policy.", ToolProtocol::Native, tools());
        let bad = ToolCall::new("call_1", "_Exception", "garbled");
        let good = ToolCall::new("call_2", "GetCurrentUser", "{}");
        let turns = vec![
            Turn::user("hi"),
            Turn::tool_invocation(bad.clone(), Some("garbled".into())),
            Turn::tool_result(&bad, "Invalid or incomplete response"),
            Turn::tool_invocation(good.clone(), None),
            Turn::tool_result(&good, "ok"),
        ];

        let messages = ctx.build_messages(&turns);
        assert_eq!(messages[2], Message::assistant("garbled"));
        match &messages[3] {
            Message::User { content } => {
                assert!(content.starts_with("TOOL RESPONSE:"));
                assert!(content.contains("one tool call"));
                assert!(!content.contains("JSON blob"));
            }
            other => panic!("unexpected message: {other:?}"),
        }
        assert_eq!(messages[4].role(), "assistant");
        assert_eq!(messages[5], Message::tool_result("call_2", "ok"));
    }
}
