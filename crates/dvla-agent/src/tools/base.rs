//! Tool trait: the abstract interface every agent tool must implement.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

use dvla_core::types::ToolDefinition;

/// Key under which a bare (non-object) argument payload is exposed.
pub const INPUT_KEY: &str = "input";

// ─────────────────────────────────────────────
// Tool trait
// ─────────────────────────────────────────────

/// Every agent tool implements this trait.
///
/// The agent loop discovers tools via `name()`, describes them to the LLM
/// via `to_definition()`, and dispatches calls via `execute()`. Tools hold
/// no per-conversation state.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name used by the LLM to call this tool (e.g. `"GetCurrentUser"`).
    fn name(&self) -> &str;

    /// Human-readable description shown to the LLM. Must state the argument
    /// shape so the model can call the tool correctly.
    fn description(&self) -> &str;

    /// JSON Schema describing the parameters (as a `serde_json::Value`).
    ///
    /// Must be `{"type": "object", "properties": {...}, "required": [...]}`.
    fn parameters(&self) -> Value;

    /// Execute the tool with the given arguments.
    ///
    /// Returns the tool output as a string (the LLM reads this).
    /// On failure, return an `Err`; the registry converts it into an
    /// error string for the LLM.
    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String>;

    /// Build the `ToolDefinition` sent to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.parameters())
    }
}

// ─────────────────────────────────────────────
// Argument parsing
// ─────────────────────────────────────────────

/// Turn a raw argument payload into a parameter map.
///
/// A JSON object maps field-for-field. Any other scalar, or text that is not
/// JSON at all, is exposed under [`INPUT_KEY`]. Empty payloads and `null`
/// give an empty map. Arrays are rejected.
pub fn parse_arguments(raw: &str) -> Result<HashMap<String, Value>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(HashMap::new());
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map.into_iter().collect()),
        Ok(Value::Null) => Ok(HashMap::new()),
        Ok(Value::Array(_)) => Err("expected an object or a single value, got an array".into()),
        Ok(scalar) => Ok(HashMap::from([(INPUT_KEY.to_string(), scalar)])),
        Err(_) => Ok(HashMap::from([(
            INPUT_KEY.to_string(),
            Value::String(raw.to_string()),
        )])),
    }
}

// ─────────────────────────────────────────────
// Param helpers
// ─────────────────────────────────────────────

/// Extract an identifier given either as a string or a number.
///
/// Looks at `key` first, then at the bare [`INPUT_KEY`] payload.
pub fn require_id(params: &HashMap<String, Value>, key: &str) -> anyhow::Result<String> {
    let value = params
        .get(key)
        .or_else(|| params.get(INPUT_KEY))
        .ok_or_else(|| anyhow::anyhow!("Missing required parameter: {key}"))?;

    match value {
        Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => anyhow::bail!("Parameter {key} must be a string or number, got {other}"),
    }
}
