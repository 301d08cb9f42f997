//! Recent transactions tool.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::bank::BankSource;
use super::base::{require_id, Tool};

/// `GetUserTransactions`: lists the transactions of the given user.
///
/// Performs no authorization check: any user id the model supplies is
/// served, and the id goes into the SQL text as is. Restricting it to the
/// current user is left to the model's instructions.
pub struct GetUserTransactionsTool {
    bank: Arc<BankSource>,
}

impl GetUserTransactionsTool {
    pub fn new(bank: Arc<BankSource>) -> Self {
        Self { bank }
    }
}

#[async_trait]
impl Tool for GetUserTransactionsTool {
    fn name(&self) -> &str {
        "GetUserTransactions"
    }

    fn description(&self) -> &str {
        "Returns the transactions associated to the userId provided. Takes one argument, the userId as a string."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "userId": {
                    "type": "string",
                    "description": "Id of the user whose transactions to list"
                }
            },
            "required": ["userId"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let user_id = require_id(&params, "userId")?;
        let db = self.bank.load().await?;
        let rows = db.query_transactions(&user_id).await?;

        debug!(user_id = %user_id, count = rows.len(), "listed transactions");
        Ok(serde_json::to_string(&rows)?)
    }
}
