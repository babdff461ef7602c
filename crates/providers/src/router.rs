//! Provider selection: builds the configured LLM backend.
//!
//! The relay talks to exactly one provider per process; this resolves its
//! base URL and credentials from configuration.

use std::sync::Arc;
use std::time::Duration;
use chatrelay_config::AppConfig;
use chatrelay_core::error::ProviderError;
use chatrelay_core::provider::Provider;
use crate::openai_compat::OpenAiCompatProvider;

/// Build the default provider from configuration.
///
/// Fails when no API key is available for a hosted provider, so a
/// misconfigured deployment is caught at startup rather than on the first
/// chat request.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let name = config.default_provider.as_str();
    let provider_config = config.providers.get(name);

    let api_key = provider_config
        .and_then(|p| p.api_key.clone())
        .or_else(|| config.api_key.clone());

    let base_url = match provider_config.and_then(|p| p.api_url.clone()) {
        Some(url) => url,
        None => default_base_url(name).ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "Unknown provider '{name}': set providers.{name}.api_url"
            ))
        })?,
    };

    let api_key = match api_key {
        Some(key) => key,
        None if is_local(name) => name.to_string(),
        None => {
            return Err(ProviderError::NotConfigured(format!(
                "No API key for provider '{name}' (set CHATRELAY_API_KEY or OPENAI_API_KEY)"
            )));
        }
    };

    let timeout = Duration::from_secs(config.provider_timeout_secs);
    let provider = OpenAiCompatProvider::new(name, base_url, api_key, timeout)?;
    Ok(Arc::new(provider))
}

/// Local servers that accept any bearer token.
fn is_local(provider_name: &str) -> bool {
    matches!(provider_name, "ollama" | "vllm" | "llamacpp" | "llama.cpp")
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> Option<String> {
    let url = match provider_name {
        "openai" => "https://api.openai.com/v1",
        "openrouter" => "https://openrouter.ai/api/v1",
        "ollama" => "http://localhost:11434/v1",
        "deepseek" => "https://api.deepseek.com/v1",
        "groq" => "https://api.groq.com/openai/v1",
        "together" => "https://api.together.xyz/v1",
        "fireworks" => "https://api.fireworks.ai/inference/v1",
        "vllm" => "http://localhost:8000/v1",
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1",
        _ => return None,
    };
    Some(url.to_string())
}
