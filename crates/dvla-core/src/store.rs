//! In-memory conversation store.
//!
//! Conversations live for the lifetime of the process: there is no eviction
//! and nothing is written to disk. Each conversation sits behind its own
//! async mutex so that two requests for the same id cannot interleave their
//! appends, while different ids proceed independently.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::Mutex;
use tracing::debug;

use crate::conversation::Conversation;

/// Shared handle to one conversation.
pub type ConversationHandle = Arc<Mutex<Conversation>>;

/// Process-wide mapping from conversation id to conversation.
///
/// Thread-safe via `RwLock`: lookups of existing ids share the read lock,
/// creation takes the write lock.
pub struct ConversationStore {
    welcome: String,
    conversations: RwLock<HashMap<String, ConversationHandle>>,
}

impl ConversationStore {
    /// Create an empty store. New conversations open with `welcome`.
    pub fn new(welcome: impl Into<String>) -> Self {
        ConversationStore {
            welcome: welcome.into(),
            conversations: RwLock::new(HashMap::new()),
        }
    }

    /// Get an existing conversation or create a new one seeded with the
    /// welcome turn. Existing conversations are returned unmodified.
    pub fn get_or_create(&self, id: &str) -> ConversationHandle {
        {
            let map = self
                .conversations
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(conv) = map.get(id) {
                return Arc::clone(conv);
            }
        }

        // Re-check under the write lock: a concurrent caller may have created it.
        let mut map = self
            .conversations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let conv = map.entry(id.to_string()).or_insert_with(|| {
            debug!(conversation = %id, "Creating conversation");
            Arc::new(Mutex::new(Conversation::new(id, self.welcome.clone())))
        });
        Arc::clone(conv)
    }

    /// Whether a conversation with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.conversations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    /// Number of conversations held.
    pub fn len(&self) -> usize {
        self.conversations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of all conversations, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .conversations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    pub fn welcome(&self) -> &str {
        &self.welcome
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{Turn, TurnRole};

    #[tokio::test]
    async fn test_new_id_gets_single_welcome_turn() {
        let store = ConversationStore::new("Welcome!");
        let conv = store.get_or_create("c1");
        let conv = conv.lock().await;

        assert_eq!(conv.id, "c1");
        assert_eq!(conv.len(), 1);
        assert_eq!(conv.turns()[0].role(), TurnRole::Assistant);
        assert_eq!(conv.turns()[0].text(), "Welcome!");
    }

    #[tokio::test]
    async fn test_existing_conversation_returned_unmodified() {
        let store = ConversationStore::new("Welcome!");
        {
            let conv = store.get_or_create("c1");
            conv.lock().await.push(Turn::user("hello"));
        }

        let again = store.get_or_create("c1");
        let conv = again.lock().await;
        assert_eq!(conv.len(), 2);
        assert_eq!(conv.pending_user_message(), Some("hello"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_same_handle_for_same_id() {
        let store = ConversationStore::new("Welcome!");
        let a = store.get_or_create("c1");
        let b = store.get_or_create("c1");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_ids_are_independent() {
        let store = ConversationStore::new("Welcome!");
        store.get_or_create("a").lock().await.push(Turn::user("x"));

        let b = store.get_or_create("b");
        assert_eq!(b.lock().await.len(), 1);
        assert_eq!(store.ids(), vec!["a".to_string(), "b".to_string()]);
        assert!(store.contains("a"));
        assert!(!store.contains("c"));
    }

    #[tokio::test]
    async fn test_concurrent_creation_yields_one_conversation() {
        let store = Arc::new(ConversationStore::new("Welcome!"));
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move { store.get_or_create("shared") }));
        }

        let mut convs = Vec::new();
        for h in handles {
            convs.push(h.await.unwrap());
        }

        assert_eq!(store.len(), 1);
        assert!(convs.iter().all(|c| Arc::ptr_eq(c, &convs[0])));
        assert_eq!(convs[0].lock().await.len(), 1);
    }
}
