// src/services/memory.rs
use std::{
    collections::HashMap,
    fmt::Debug,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Key-value view of conversation history, addressed by an opaque thread id.
/// Any backend can sit behind this; the rest of the crate depends only on it.
#[async_trait]
pub trait ConversationMemory: Send + Sync {
    /// Turns recorded so far for this thread, oldest first.
    async fn history(&self, thread_id: &str) -> Vec<Turn>;

    /// Record one turn at the end of the thread.
    async fn append(&self, thread_id: &str, turn: Turn);
}

#[derive(Clone, Debug)]
struct Thread {
    turns: Vec<Turn>,
    last_active: Instant,
}

impl Thread {
    fn new() -> Self {
        Self {
            turns: Vec::new(),
            last_active: Instant::now(),
        }
    }
}

#[derive(Clone)]
pub struct InMemoryStore {
    inner: Arc<RwLock<HashMap<String, Thread>>>,
    ttl: Duration,
}

impl Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl InMemoryStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Remove a thread by id
    pub async fn remove_thread(&self, thread_id: &str) -> bool {
        let mut guard = self.inner.write().await;
        guard.remove(thread_id).is_some()
    }

    /// Remove threads idle longer than ttl. Returns number removed.
    pub async fn purge_expired(&self) -> usize {
        let mut guard = self.inner.write().await;
        let now = Instant::now();
        let before = guard.len();
        guard.retain(|_, t| now.duration_since(t.last_active) < self.ttl);
        before - guard.len()
    }

    /// Number of live threads
    pub async fn thread_count(&self) -> usize {
        let guard = self.inner.read().await;
        guard.len()
    }
}

#[async_trait]
impl ConversationMemory for InMemoryStore {
    async fn history(&self, thread_id: &str) -> Vec<Turn> {
        let guard = self.inner.read().await;
        guard
            .get(thread_id)
            .map(|t| t.turns.clone())
            .unwrap_or_default()
    }

    async fn append(&self, thread_id: &str, turn: Turn) {
        let mut guard = self.inner.write().await;
        let entry = guard
            .entry(thread_id.to_string())
            .or_insert_with(Thread::new);
        entry.turns.push(turn);
        entry.last_active = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn basic_thread_flow() {
        let store = InMemoryStore::new(Duration::from_secs(60));
        store.append("t1", Turn::user("hello")).await;
        let history = store.history("t1").await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, Role::User);
        assert!(store.remove_thread("t1").await);
    }
}
