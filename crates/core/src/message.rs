//! Message and History domain types.
//!
//! These are the value objects that flow through the relay:
//! the user posts text → the store records a `Message` → the assembler maps
//! the `History` into `ChatMessage`s → the provider replies.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The learner talking to the tutor
    User,
    /// The tutor's replies
    Assistant,
    /// Instructions prepended at assembly time; never persisted
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single recorded turn.
///
/// The timestamp is assigned by the history store at append time, never by
/// the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message
    pub sender: Role,

    /// The text content, stored verbatim
    pub text: String,

    /// When the store recorded this message
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(sender: Role, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp,
        }
    }
}

/// Parse a stored timestamp.
///
/// RFC 3339 with an offset is the written form. Offset-less ISO 8601
/// (`2025-03-01T10:20:30.123456`, as older history files carry) is read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw:?}")))
}

/// The ordered conversation log. Insertion order is conversation order.
pub type History = Vec<Message>;

/// Drop the oldest entries so that at most `max_length` remain.
///
/// Keeps the newest messages in their original order.
pub fn retain_newest(history: &mut History, max_length: usize) {
    if history.len() > max_length {
        let excess = history.len() - max_length;
        history.drain(..excess);
    }
}

/// A provider-ready `{role, content}` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.sender,
            content: message.text.clone(),
        }
    }
}
