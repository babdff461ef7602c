//! Conversation assembly for chatrelay.
//!
//! Takes a user's turn, records it, asks the provider for a reply with the
//! tutor directive in front of the trimmed history, and records the reply.

pub mod assembler;
pub mod directive;

pub use assembler::{build_messages, ConversationAssembler, TurnReply};
pub use directive::TUTOR_DIRECTIVE;
