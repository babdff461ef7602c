//! History store trait: the durable, bounded, ordered message log.
//!
//! A store owns exactly one conversation log. Reads never fail outward:
//! a missing or unparsable document is an empty history. Writes report
//! `StorageError`, except `clear`, which degrades to `false`.
//!
//! Implementations must serialize `append`, `save` and `clear` so that two
//! overlapping read-modify-write cycles cannot drop each other's message.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::warn;
use crate::error::StorageError;
use crate::message::{History, Message, Role};

/// What a raw read of the persisted log produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing persisted yet
    Missing,
    /// The document parsed
    Loaded(History),
    /// The document exists but is not a valid history
    Corrupt { reason: String },
}

impl LoadOutcome {
    /// Collapse to the public contract: anything unreadable is empty.
    pub fn into_history(self) -> History {
        match self {
            LoadOutcome::Loaded(history) => history,
            LoadOutcome::Missing | LoadOutcome::Corrupt { .. } => History::new(),
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, LoadOutcome::Corrupt { .. })
    }
}

/// Timestamp for a message appended after `history`.
///
/// Never earlier than the newest stored message, so timestamps stay
/// non-decreasing even if the wall clock steps back.
pub fn next_timestamp(history: &History) -> DateTime<Utc> {
    let now = Utc::now();
    match history.last() {
        Some(last) if last.timestamp > now => last.timestamp,
        _ => now,
    }
}

/// The HistoryStore trait.
///
/// Implementations: JSON file (production), in-memory (tests, ephemeral runs).
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// The backend name (e.g., "file", "memory").
    fn name(&self) -> &str;

    /// Retention window: the most messages kept after any append.
    fn max_length(&self) -> usize;

    /// Read the persisted log, reporting exactly what was found.
    async fn load_outcome(&self) -> LoadOutcome;

    /// Read the persisted log. Missing or corrupt data yields an empty history.
    async fn load(&self) -> History {
        match self.load_outcome().await {
            LoadOutcome::Corrupt { reason } => {
                warn!(backend = self.name(), %reason, "History is unreadable, starting fresh");
                History::new()
            }
            outcome => outcome.into_history(),
        }
    }

    /// Overwrite the whole persisted log.
    async fn save(&self, history: &History) -> std::result::Result<(), StorageError>;

    /// Record one message, trim to the retention window, persist, and return
    /// the message with its assigned timestamp.
    async fn append(&self, sender: Role, text: &str) -> std::result::Result<Message, StorageError>;

    /// Persist an empty log. Returns `false` if the write failed.
    async fn clear(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn corrupt_and_missing_collapse_to_empty() {
        assert!(LoadOutcome::Missing.into_history().is_empty());
        let corrupt = LoadOutcome::Corrupt { reason: "bad".into() };
        assert!(corrupt.is_corrupt());
        assert!(corrupt.into_history().is_empty());
    }

    #[test]
    fn loaded_keeps_messages() {
        let history = vec![Message::new(Role::User, "hi", Utc::now())];
        assert_eq!(LoadOutcome::Loaded(history.clone()).into_history(), history);
    }

    #[test]
    fn next_timestamp_never_precedes_last_message() {
        let future = Utc::now() + Duration::hours(1);
        let history = vec![Message::new(Role::User, "hi", future)];
        assert_eq!(next_timestamp(&history), future);
    }

    #[test]
    fn next_timestamp_uses_clock_for_empty_history() {
        let before = Utc::now();
        assert!(next_timestamp(&History::new()) >= before);
    }
}
