//! LLM Provider implementations for chatrelay.
//!
//! All providers implement the `chatrelay_core::Provider` trait.
//! `router::build_from_config` picks and constructs the configured one.

pub mod openai_compat;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use router::build_from_config;
