//! Conversation assembly: turns the stored history into a provider request
//! and records the reply.
//!
//! A user turn is strictly sequential:
//!
//! 1. **Record** the user's message (durable before any outward call)
//! 2. **Reload** the trimmed history and prepend the system directive
//! 3. **Complete** with the provider, once, no retry
//! 4. **Record** the assistant's reply
//!
//! No store lock is held while the provider call is in flight; the store
//! serializes each append on its own.

use std::sync::Arc;
use chrono::{DateTime, Utc};
use chatrelay_config::AppConfig;
use chatrelay_core::error::{Error, Result};
use chatrelay_core::history::HistoryStore;
use chatrelay_core::message::{ChatMessage, Message, Role};
use chatrelay_core::provider::{Provider, ProviderRequest};
use tracing::{debug, error, info};
use crate::directive;

/// The outcome of a successful user turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReply {
    /// The provider's reply, as stored
    pub text: String,
    /// Timestamp the store assigned to the assistant message
    pub timestamp: DateTime<Utc>,
}

/// Map a stored log to the provider's message list: the directive first,
/// then every message in order (`sender → role`, `text → content`).
pub fn build_messages(directive: &str, history: &[Message]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(ChatMessage::system(directive));
    messages.extend(history.iter().map(ChatMessage::from));
    messages
}

/// Glues the history store to the completion provider.
pub struct ConversationAssembler {
    store: Arc<dyn HistoryStore>,
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    directive: String,
}

impl ConversationAssembler {
    /// Create an assembler using the built-in tutor directive.
    pub fn new(
        store: Arc<dyn HistoryStore>,
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            store,
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            directive: directive::TUTOR_DIRECTIVE.to_string(),
        }
    }

    /// Build from configuration: model, sampling settings and directive override.
    pub fn from_config(
        config: &AppConfig,
        store: Arc<dyn HistoryStore>,
        provider: Arc<dyn Provider>,
    ) -> Self {
        Self::new(store, provider, &config.default_model)
            .with_temperature(config.default_temperature)
            .with_max_tokens(config.default_max_tokens)
            .with_directive(directive::resolve(
                config.assistant.system_prompt_override.as_deref(),
            ))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the max tokens per reply.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Replace the system directive.
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = directive.into();
        self
    }

    pub fn store(&self) -> &Arc<dyn HistoryStore> {
        &self.store
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one user turn end to end.
    ///
    /// If the provider fails, the user's message stays recorded and no
    /// assistant message is appended.
    pub async fn handle_user_turn(&self, user_text: &str) -> Result<TurnReply> {
        info!(chars = user_text.chars().count(), "User turn received");

        self.store.append(Role::User, user_text).await?;

        let history = self.store.load().await;
        let messages = build_messages(&self.directive, &history);
        debug!(
            history_len = history.len(),
            messages = messages.len(),
            "Assembled provider request"
        );

        let request = ProviderRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self.provider.complete(request).await.map_err(|e| {
            error!(
                provider = self.provider.name(),
                error = %e,
                "Provider call failed; user turn kept without a reply"
            );
            Error::Provider(e)
        })?;

        let stored = self.store.append(Role::Assistant, &response.content).await?;
        info!(model = %response.model, chars = stored.text.chars().count(), "Assistant reply recorded");

        Ok(TurnReply {
            text: stored.text,
            timestamp: stored.timestamp,
        })
    }
}
