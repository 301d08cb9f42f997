//! Agent tools: the trait, the registry, and the bank tools.

pub mod bank;
pub mod base;
pub mod current_user;
pub mod registry;
pub mod transactions;

use std::sync::Arc;

pub use bank::{BankDatabase, BankSource};
pub use base::{parse_arguments, Tool};
pub use current_user::GetCurrentUserTool;
pub use registry::ToolRegistry;
pub use transactions::GetUserTransactionsTool;

/// Registry holding the identity and transactions tools over `bank`.
pub fn bank_registry(bank: BankSource, current_user_id: &str) -> ToolRegistry {
    let bank = Arc::new(bank);
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(GetCurrentUserTool::new(bank.clone(), current_user_id)));
    registry.register(Arc::new(GetUserTransactionsTool::new(bank)));
    registry
}
