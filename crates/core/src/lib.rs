//! # chatrelay core
//!
//! Domain types, traits, and error definitions for the chatrelay tutor
//! backend. This crate has **no framework dependencies**: it defines the
//! model that the storage, provider, assembly and HTTP crates implement
//! against.
//!
//! Every collaborator is a trait here (`HistoryStore`, `Provider`), so the
//! gateway and tests can swap implementations freely.

pub mod error;
pub mod message;
pub mod provider;
pub mod history;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, StorageError};
pub use message::{ChatMessage, History, Message, Role, parse_timestamp, retain_newest};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use history::{HistoryStore, LoadOutcome, next_timestamp};
