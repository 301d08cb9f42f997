//! Identity lookup tool.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::bank::BankSource;
use super::base::Tool;

/// `GetCurrentUser`: reports who is logged in.
///
/// Takes no arguments. The user is resolved against the bank data on every
/// call rather than cached.
pub struct GetCurrentUserTool {
    bank: Arc<BankSource>,
    current_user_id: String,
}

impl GetCurrentUserTool {
    pub fn new(bank: Arc<BankSource>, current_user_id: impl Into<String>) -> Self {
        Self {
            bank,
            current_user_id: current_user_id.into(),
        }
    }
}

#[async_trait]
impl Tool for GetCurrentUserTool {
    fn name(&self) -> &str {
        "GetCurrentUser"
    }

    fn description(&self) -> &str {
        "Returns the current user for querying transactions. Takes no arguments."
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {}, "required": [] })
    }

    async fn execute(&self, _params: HashMap<String, Value>) -> anyhow::Result<String> {
        let db = self.bank.load().await?;
        let user = db
            .get_user(&self.current_user_id)
            .ok_or_else(|| anyhow::anyhow!("no user with id {}", self.current_user_id))?;

        debug!(user_id = %user.user_id, "resolved current user");
        Ok(json!({ "userId": user.user_id, "username": user.username }).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::bank::{BankDatabase, User};

    #[tokio::test]
    async fn test_returns_current_user() {
        let tool = GetCurrentUserTool::new(Arc::new(BankSource::from_path(None)), "1");
        let out = tool.execute(HashMap::new()).await.unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value, json!({ "userId": "1", "username": "MartyMcFly" }));
        assert!(!out.contains("Password1"));
    }

    #[tokio::test]
    async fn test_arguments_ignored() {
        let tool = GetCurrentUserTool::new(Arc::new(BankSource::from_path(None)), "2");
        let mut params = HashMap::new();
        params.insert("input".to_string(), json!("1"));
        let out = tool.execute(params).await.unwrap();
        assert!(out.contains("DocBrown"));
    }

    #[tokio::test]
    async fn test_unknown_current_user_fails() {
        let bank = BankSource::Static(BankDatabase {
            users: vec![User {
                user_id: "1".into(),
                username: "MartyMcFly".into(),
                password: String::new(),
            }],
            transactions: vec![],
        });
        let tool = GetCurrentUserTool::new(Arc::new(bank), "42");
        let err = tool.execute(HashMap::new()).await.unwrap_err();
        assert!(err.to_string().contains("no user with id 42"));
    }
}
