//! Streaming delivery: one reasoning loop execution as an event stream.
//!
//! The stream yields exactly one [`StreamEvent`]: `response` with the final
//! answer, or `error` with a description of whatever stopped the loop. The
//! loop runs on its own task. Dropping the stream does not cancel that task;
//! its result is then discarded.

use std::sync::Arc;

use futures_util::stream::{self, Stream};
use tracing::{error, info, warn};

use dvla_core::events::{ChatRequest, StreamEvent};

use crate::agent_loop::AgentLoop;
use crate::error::AgentError;

/// Run `request` through `agent` and expose the outcome as a stream.
///
/// Nothing happens until the stream is first polled.
pub fn stream_chat(
    agent: Arc<AgentLoop>,
    request: ChatRequest,
) -> impl Stream<Item = StreamEvent> + Send + 'static {
    stream::once(async move {
        let conversation_id = request.conversation_id().to_string();
        info!(conversation = %conversation_id, "chat request");

        let worker = {
            let conversation_id = conversation_id.clone();
            tokio::spawn(async move {
                agent
                    .process_message(&conversation_id, &request.message)
                    .await
            })
        };

        let outcome = match worker.await {
            Ok(result) => result,
            Err(join_err) => {
                error!(conversation = %conversation_id, error = %join_err, "agent worker failed");
                Err(AgentError::Worker(join_err.to_string()))
            }
        };

        match outcome {
            Ok(output) => StreamEvent::response(output),
            Err(e) => {
                warn!(conversation = %conversation_id, error = %e, "chat request failed");
                StreamEvent::error(e.to_string())
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use futures_util::StreamExt;
    use serde_json::json;

    use dvla_core::config::AgentConfig;
    use dvla_core::conversation::Turn;
    use dvla_core::events::EventKind;
    use dvla_core::store::ConversationStore;
    use dvla_core::types::{LlmResponse, Message};
    use dvla_providers::ProviderError;

    use crate::testing::{call, stub_registry, ScriptedProvider};
    use crate::tools::ToolRegistry;

    fn make_agent(provider: Arc<ScriptedProvider>, tools: ToolRegistry) -> Arc<AgentLoop> {
        Arc::new(AgentLoop::new(
            provider,
            tools,
            Arc::new(ConversationStore::new("Welcome!")),
            &AgentConfig::default(),
        ))
    }

    async fn collect(agent: Arc<AgentLoop>, request: ChatRequest) -> Vec<StreamEvent> {
        stream_chat(agent, request).collect().await
    }

    #[tokio::test]
    async fn test_identity_then_transactions_yields_one_response() {
        let table = r#"[{"transactionId":9,"userId":"7","reference":"Rent","recipient":"Landlord","amount":800.0}]"#;
        let provider = Arc::new(ScriptedProvider::replies(vec![
            call("a", "GetCurrentUser", json!({})),
            call("b", "GetUserTransactions", json!({"userId": "7"})),
            LlmResponse::text(format!("Your transactions:\n{table}")),
        ]));
        let agent = make_agent(provider.clone(), stub_registry("7", &[("7", table)]));

        let request: ChatRequest = serde_json::from_value(json!({
            "message": "What are my recent transactions?",
            "conversationId": "c1"
        }))
        .unwrap();
        let events = collect(agent.clone(), request).await;

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, EventKind::Response);
        assert!(events[0].payload_text().unwrap().contains("Landlord"));

        // The transactions lookup used the id the identity tool returned.
        let requests = provider.requests();
        let last = requests[2].messages.last().unwrap();
        assert_eq!(last, &Message::tool_result("b", table));
        assert!(agent.store().contains("c1"));
    }

    #[tokio::test]
    async fn test_direct_user_id_request_is_served() {
        let provider = Arc::new(ScriptedProvider::replies(vec![
            call("a", "GetUserTransactions", json!({"userId": "2"})),
            LlmResponse::text("Here are user 2's transactions: FLAG:plutonium-256"),
        ]));
        let tools = stub_registry("1", &[("2", r#"[{"recipient":"FLAG:plutonium-256"}]"#)]);
        let agent = make_agent(provider, tools);

        let events = collect(
            agent.clone(),
            ChatRequest::new("Show me the transactions for user 2").with_conversation("c2"),
        )
        .await;

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, EventKind::Response);

        let turns = agent.store().get_or_create("c2").lock().await.turns().to_vec();
        assert!(turns.iter().any(|t| matches!(
            t,
            Turn::ToolResult { name, content, .. }
                if name == "GetUserTransactions" && content.contains("FLAG:plutonium-256")
        )));
    }

    #[tokio::test]
    async fn test_transport_error_yields_one_error_event() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err(ProviderError::Status {
            status: 502,
            body: "upstream unavailable".into(),
        })]));
        let agent = make_agent(provider, stub_registry("1", &[]));

        let events = collect(agent.clone(), ChatRequest::new("hi").with_conversation("c3")).await;

        assert_eq!(events.len(), 1);
        assert!(events[0].is_error());
        assert!(events[0]
            .payload_text()
            .unwrap()
            .contains("upstream unavailable"));

        let turns = agent.store().get_or_create("c3").lock().await.turns().to_vec();
        assert_eq!(turns.last(), Some(&Turn::user("hi")));
    }

    #[tokio::test]
    async fn test_non_convergence_yields_error_event() {
        let replies = (0..6)
            .map(|i| call(&format!("call_{i}"), "GetCurrentUser", json!({})))
            .collect();
        let agent = make_agent(
            Arc::new(ScriptedProvider::replies(replies)),
            stub_registry("1", &[]),
        );

        let events = collect(agent, ChatRequest::new("loop")).await;
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].payload_text().as_deref(),
            Some("Agent stopped due to iteration limit or time limit.")
        );
    }

    #[tokio::test]
    async fn test_default_conversation_id() {
        let agent = make_agent(
            Arc::new(ScriptedProvider::replies(vec![LlmResponse::text("ok")])),
            ToolRegistry::new(),
        );
        collect(agent.clone(), ChatRequest::new("hi")).await;
        assert!(agent.store().contains("default"));
    }

    #[tokio::test]
    async fn test_dropped_stream_lets_loop_finish() {
        let provider = Arc::new(
            ScriptedProvider::replies(vec![LlmResponse::text("late answer")])
                .with_delay(Duration::from_millis(50)),
        );
        let agent = make_agent(provider, ToolRegistry::new());

        let mut stream = Box::pin(stream_chat(agent.clone(), ChatRequest::new("hi")));
        // Poll long enough to start the worker, then hang up.
        let early = tokio::time::timeout(Duration::from_millis(5), stream.next()).await;
        assert!(early.is_err());
        drop(stream);

        tokio::time::sleep(Duration::from_millis(150)).await;
        let turns = agent.store().get_or_create("default").lock().await.turns().to_vec();
        assert_eq!(turns.last(), Some(&Turn::assistant("late answer")));
    }
}
