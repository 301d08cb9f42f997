//! Tool Registry: the fixed set of tools the reasoning loop may call.
//!
//! Built once at startup and shared read-only afterwards, so no locking.
//! Registration order is preserved: it is the order tools are described to
//! the model.

use std::sync::Arc;

use dvla_core::types::ToolDefinition;
use tracing::{info, warn};

use super::base::{parse_arguments, Tool};
use crate::error::ToolError;

// ─────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────

/// Stores tools in registration order and dispatches calls by name.
///
/// Owns `Arc<dyn Tool>` so tools can be shared across threads.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Replaces any previous tool with the same name in place.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        info!(tool = tool.name(), "registered tool");
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(idx) => self.tools[idx] = tool,
            None => self.tools.push(tool),
        }
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Check if a tool is registered.
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names of all registered tools, in registration order.
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    /// LLM-facing definitions for all registered tools.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.to_definition()).collect()
    }

    /// `(name, description)` pairs, for prompt-based tool protocols.
    pub fn descriptions(&self) -> Vec<(String, String)> {
        self.tools
            .iter()
            .map(|t| (t.name().to_string(), t.description().to_string()))
            .collect()
    }

    /// Execute a tool by name with a raw argument payload.
    ///
    /// Unknown names and tool failures come back as [`ToolError`]; nothing
    /// here panics or aborts the caller.
    pub async fn execute(&self, name: &str, arguments: &str) -> Result<String, ToolError> {
        let tool = self.get(name).ok_or_else(|| {
            warn!(tool = name, "tool not found");
            ToolError::NotFound {
                name: name.to_string(),
                available: self.tool_names(),
            }
        })?;

        let params = parse_arguments(arguments).map_err(|reason| {
            warn!(tool = name, %reason, "invalid tool arguments");
            ToolError::InvalidArguments {
                name: name.to_string(),
                reason,
            }
        })?;

        tool.execute(params).await.map_err(|e| {
            warn!(tool = name, error = %e, "tool execution failed");
            ToolError::Failed {
                name: name.to_string(),
                reason: e.to_string(),
            }
        })
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    /// Minimal test tool.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn parameters(&self) -> Value {
            json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string", "description": "Text to echo" }
                },
                "required": ["text"]
            })
        }
        async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
            let text = params
                .get("text")
                .or_else(|| params.get("input"))
                .and_then(|v| v.as_str())
                .unwrap_or("(empty)");
            Ok(format!("Echo: {text}"))
        }
    }

    /// Tool that always fails.
    struct FailTool;

    #[async_trait]
    impl Tool for FailTool {
        fn name(&self) -> &str {
            "fail"
        }
        fn description(&self) -> &str {
            "Always fails"
        }
        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {}, "required": []})
        }
        async fn execute(&self, _params: HashMap<String, Value>) -> anyhow::Result<String> {
            anyhow::bail!("intentional failure")
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(EchoTool));
        assert!(reg.has("echo"));
        assert!(!reg.has("nope"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_registration_order_kept() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(FailTool));
        reg.register(Arc::new(EchoTool));
        reg.register(Arc::new(FailTool));
        assert_eq!(reg.tool_names(), vec!["fail", "echo"]);
        assert_eq!(reg.definitions()[1].function.name, "echo");
        assert_eq!(reg.descriptions()[0].1, "Always fails");
    }

    #[tokio::test]
    async fn test_execute_success() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(EchoTool));
        assert_eq!(reg.execute("echo", r#"{"text": "hello"}"#).await.unwrap(), "Echo: hello");
        assert_eq!(reg.execute("echo", "plain words").await.unwrap(), "Echo: plain words");
    }

    #[tokio::test]
    async fn test_execute_not_found() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(EchoTool));
        let err = reg.execute("missing", "{}").await.unwrap_err();
        assert_eq!(err.to_string(), "missing is not a valid tool, try one of [echo].");
    }

    #[tokio::test]
    async fn test_execute_error_caught() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(FailTool));
        let err = reg.execute("fail", "{}").await.unwrap_err();
        assert_eq!(err.to_string(), "Error executing fail: intentional failure");
    }

    #[tokio::test]
    async fn test_execute_invalid_arguments() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(EchoTool));
        let err = reg.execute("echo", "[1, 2]").await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[test]
    fn test_default() {
        let reg = ToolRegistry::default();
        assert!(reg.is_empty());
    }
}
