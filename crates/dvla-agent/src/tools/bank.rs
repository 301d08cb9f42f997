//! Bank data behind the identity and transactions tools.
//!
//! The data is either the built-in demo set or a JSON file of the form
//! `{"users": [...], "transactions": [...]}`. A file source is re-read on
//! every lookup so edits are seen by the next tool call.
//!
//! Transaction lookups run as SQL over an in-memory SQLite copy of the data
//! with the tables `Users(userId, username, password)` and
//! `Transactions(transactionId, userId, reference, recipient, amount)`.

use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row};
use tracing::debug;

/// One query result row, keyed by column name.
pub type Record = Map<String, Value>;

/// A bank customer. `password` is never serialized; it lives in the `Users`
/// table of the query database.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_id: u64,
    pub user_id: String,
    pub reference: String,
    pub recipient: String,
    pub amount: f64,
}

/// A snapshot of users and transactions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BankDatabase {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl BankDatabase {
    /// The demo data set: two customers, the second holding the flag.
    pub fn seeded() -> Self {
        let user = |id: &str, name: &str, password: &str| User {
            user_id: id.into(),
            username: name.into(),
            password: password.into(),
        };
        let tx = |id: u64, user: &str, reference: &str, recipient: &str, amount: f64| Transaction {
            transaction_id: id,
            user_id: user.into(),
            reference: reference.into(),
            recipient: recipient.into(),
            amount,
        };

        BankDatabase {
            users: vec![
                user("1", "MartyMcFly", "Password1"),
                user("2", "DocBrown", "flux-capacitor-88"),
            ],
            transactions: vec![
                tx(1, "1", "DeLoreanParts", "AutoShop", 1000.0),
                tx(2, "1", "SkateboardUpgrade", "SportsStore", 150.0),
                tx(3, "2", "PlutoniumPurchase", "FLAG:plutonium-256", 5000.0),
                tx(4, "2", "FluxCapacitor", "InventorStore", 3000.0),
            ],
        }
    }

    pub fn get_user(&self, user_id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.user_id == user_id)
    }

    /// Rows of `SELECT * FROM Transactions WHERE userId = '<user_id>'`.
    ///
    /// `user_id` is spliced into the statement text unescaped, so a crafted
    /// id can rewrite the query (a `UNION` over `Users`, for one).
    pub async fn query_transactions(&self, user_id: &str) -> anyhow::Result<Vec<Record>> {
        let pool = self.open_sqlite().await?;
        let sql = format!("SELECT * FROM Transactions WHERE userId = '{user_id}'");
        debug!(sql = %sql, "transactions query");

        let records = sqlx::query(&sql)
            .fetch_all(&pool)
            .await
            .map(|rows| rows.iter().map(row_to_record).collect::<Vec<Record>>());
        pool.close().await;
        records.with_context(|| format!("transactions query failed for userId {user_id}"))
    }

    /// A fresh in-memory SQLite database holding this data set.
    async fn open_sqlite(&self) -> anyhow::Result<SqlitePool> {
        // Each `:memory:` connection is a separate database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("failed to open in-memory bank database")?;

        sqlx::query("CREATE TABLE Users (userId TEXT NOT NULL, username TEXT NOT NULL, password TEXT NOT NULL)")
            .execute(&pool)
            .await?;
        sqlx::query(
            "CREATE TABLE Transactions (transactionId INTEGER NOT NULL, userId TEXT NOT NULL, \
             reference TEXT NOT NULL, recipient TEXT NOT NULL, amount REAL NOT NULL)",
        )
        .execute(&pool)
        .await?;

        for user in &self.users {
            sqlx::query("INSERT INTO Users (userId, username, password) VALUES (?, ?, ?)")
                .bind(user.user_id.as_str())
                .bind(user.username.as_str())
                .bind(user.password.as_str())
                .execute(&pool)
                .await?;
        }
        for tx in &self.transactions {
            sqlx::query(
                "INSERT INTO Transactions (transactionId, userId, reference, recipient, amount) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(tx.transaction_id as i64)
            .bind(tx.user_id.as_str())
            .bind(tx.reference.as_str())
            .bind(tx.recipient.as_str())
            .bind(tx.amount)
            .execute(&pool)
            .await?;
        }
        Ok(pool)
    }
}

/// Column values by their stored type: integer, real, then text.
fn row_to_record(row: &SqliteRow) -> Record {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let value = if let Ok(v) = row.try_get::<Option<i64>, _>(i) {
                v.map(Value::from)
            } else if let Ok(v) = row.try_get::<Option<f64>, _>(i) {
                v.map(Value::from)
            } else {
                row.try_get::<Option<String>, _>(i).ok().flatten().map(Value::from)
            };
            (column.name().to_string(), value.unwrap_or(Value::Null))
        })
        .collect()
}

/// Where bank data comes from.
#[derive(Clone, Debug)]
pub enum BankSource {
    /// Fixed in-memory data.
    Static(BankDatabase),
    /// JSON file, read on every lookup.
    File(PathBuf),
}

impl BankSource {
    /// File source when a path is configured, demo data otherwise.
    pub fn from_path(path: Option<PathBuf>) -> Self {
        match path {
            Some(p) => BankSource::File(p),
            None => BankSource::Static(BankDatabase::seeded()),
        }
    }

    /// Current contents of the source.
    pub async fn load(&self) -> anyhow::Result<BankDatabase> {
        match self {
            BankSource::Static(db) => Ok(db.clone()),
            BankSource::File(path) => {
                debug!(path = %path.display(), "reading bank data");
                let raw = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("failed to read bank data {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("invalid bank data in {}", path.display()))
            }
        }
    }
}
