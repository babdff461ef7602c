//! In-memory history store: useful for testing and ephemeral sessions.

use async_trait::async_trait;
use chatrelay_core::error::StorageError;
use chatrelay_core::history::{HistoryStore, LoadOutcome, next_timestamp};
use chatrelay_core::message::{History, Message, Role, retain_newest};
use tokio::sync::Mutex;

/// A history store that keeps the log in a `Vec`. Nothing survives a restart.
pub struct InMemoryHistoryStore {
    entries: Mutex<History>,
    max_length: usize,
}

impl InMemoryHistoryStore {
    pub fn new(max_length: usize) -> Self {
        Self::with_history(History::new(), max_length)
    }

    /// Start from an existing log, e.g. a fixture in tests.
    pub fn with_history(history: History, max_length: usize) -> Self {
        Self {
            entries: Mutex::new(history),
            max_length,
        }
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn max_length(&self) -> usize {
        self.max_length
    }

    async fn load_outcome(&self) -> LoadOutcome {
        LoadOutcome::Loaded(self.entries.lock().await.clone())
    }

    async fn save(&self, history: &History) -> Result<(), StorageError> {
        *self.entries.lock().await = history.clone();
        Ok(())
    }

    async fn append(&self, sender: Role, text: &str) -> Result<Message, StorageError> {
        let mut entries = self.entries.lock().await;
        let message = Message::new(sender, text, next_timestamp(&entries));
        entries.push(message.clone());
        retain_newest(&mut entries, self.max_length);
        Ok(message)
    }

    async fn clear(&self) -> bool {
        self.entries.lock().await.clear();
        true
    }
}
