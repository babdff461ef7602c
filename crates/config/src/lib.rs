//! Configuration loading, validation, and management for chatrelay.
//!
//! Loads configuration from `~/.chatrelay/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.chatrelay/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Completion provider used for tutor replies
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Model identifier sent with every completion request
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Max tokens per reply
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Seconds before a provider request is abandoned
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_secs: u64,

    /// History store configuration
    #[serde(default)]
    pub history: HistoryConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Tutor persona configuration
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_provider_timeout() -> u64 {
    120
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("history", &self.history)
            .field("gateway", &self.gateway)
            .field("assistant", &self.assistant)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// "file" (durable JSON document) or "memory" (lost on restart)
    #[serde(default = "default_history_backend")]
    pub backend: String,

    /// Location of the JSON document for the file backend
    #[serde(default = "default_history_path")]
    pub path: PathBuf,

    /// Retention window: newest N messages are kept
    #[serde(default = "default_max_history_length")]
    pub max_length: usize,
}

fn default_history_backend() -> String {
    "file".into()
}
fn default_history_path() -> PathBuf {
    AppConfig::config_dir().join("history.json")
}
fn default_max_history_length() -> usize {
    10
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            backend: default_history_backend(),
            path: default_history_path(),
            max_length: default_max_history_length(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Origins allowed by CORS verbatim
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Origins matching this pattern are allowed too. The default admits
    /// http(s)://localhost, 127.0.0.1 and [::1] on any port; an empty
    /// string turns pattern matching off.
    #[serde(default = "default_origin_regex", skip_serializing_if = "Option::is_none")]
    pub allow_origin_regex: Option<String>,
}

fn default_port() -> u16 {
    8000
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost".into(), "http://localhost:8080".into()]
}

/// Loopback origins on any port.
pub const DEFAULT_ORIGIN_REGEX: &str = r"^https?://(localhost|127\.0\.0\.1|\[::1\])(:\d+)?$";

fn default_origin_regex() -> Option<String> {
    Some(DEFAULT_ORIGIN_REGEX.into())
}

impl GatewayConfig {
    /// The origin pattern, if pattern matching is on.
    pub fn origin_regex(&self) -> Option<&str> {
        self.allow_origin_regex
            .as_deref()
            .filter(|pattern| !pattern.trim().is_empty())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            allowed_origins: default_allowed_origins(),
            allow_origin_regex: default_origin_regex(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Replace the built-in English tutor directive entirely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_override: Option<String>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.chatrelay/config.toml).
    ///
    /// Environment overrides are applied on top; see [`AppConfig::apply_env`].
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        Self::load_with(&config_path, |key| std::env::var(key).ok())
    }

    /// Load from `path`, then apply overrides looked up through `env`.
    pub fn load_with(
        path: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides:
    /// - `CHATRELAY_API_KEY`, then `OPENAI_API_KEY` (only when no key is configured)
    /// - `CHATRELAY_PROVIDER`, `CHATRELAY_MODEL`
    /// - `CHATRELAY_HISTORY_FILE`, `CHATRELAY_MAX_HISTORY`
    pub fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if self.api_key.is_none() {
            self.api_key = env("CHATRELAY_API_KEY").or_else(|| env("OPENAI_API_KEY"));
        }

        if let Some(provider) = env("CHATRELAY_PROVIDER") {
            self.default_provider = provider;
        }

        if let Some(model) = env("CHATRELAY_MODEL") {
            self.default_model = model;
        }

        if let Some(path) = env("CHATRELAY_HISTORY_FILE") {
            self.history.path = PathBuf::from(path);
        }

        if let Some(raw) = env("CHATRELAY_MAX_HISTORY") {
            self.history.max_length = raw.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "CHATRELAY_MAX_HISTORY must be a positive integer, got {raw:?}"
                ))
            })?;
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".chatrelay")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.history.max_length == 0 {
            return Err(ConfigError::ValidationError(
                "history.max_length must be at least 1".into(),
            ));
        }

        if !matches!(self.history.backend.as_str(), "file" | "memory") {
            return Err(ConfigError::ValidationError(format!(
                "history.backend must be \"file\" or \"memory\", got {:?}",
                self.history.backend
            )));
        }

        if let Some(pattern) = self.gateway.origin_regex() {
            regex_lite::Regex::new(pattern).map_err(|e| {
                ConfigError::ValidationError(format!("gateway.allow_origin_regex is invalid: {e}"))
            })?;
        }

        if self.provider_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "provider_timeout_secs must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
            || self
                .providers
                .get(&self.default_provider)
                .is_some_and(|p| p.api_key.is_some())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            provider_timeout_secs: default_provider_timeout(),
            history: HistoryConfig::default(),
            gateway: GatewayConfig::default(),
            assistant: AssistantConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.gateway.port, 8000);
        assert_eq!(config.history.max_length, 10);
        assert!(config.history.path.ends_with(".chatrelay/history.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_provider, config.default_provider);
        assert_eq!(parsed.gateway.port, config.gateway.port);
        assert_eq!(parsed.history.path, config.history.path);
    }

    #[test]
    fn origin_regex_defaults_to_loopback() {
        let config = AppConfig::default();
        assert_eq!(config.gateway.origin_regex(), Some(DEFAULT_ORIGIN_REGEX));

        let parsed: AppConfig = toml::from_str("[gateway]\nport = 9000\n").unwrap();
        assert_eq!(parsed.gateway.origin_regex(), Some(DEFAULT_ORIGIN_REGEX));

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let reparsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.gateway.allow_origin_regex, config.gateway.allow_origin_regex);
    }

    #[test]
    fn empty_origin_regex_disables_matching() {
        let parsed: AppConfig = toml::from_str("[gateway]\nallow_origin_regex = \"\"\n").unwrap();
        assert_eq!(parsed.gateway.origin_regex(), None);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn invalid_origin_regex_rejected() {
        let mut config = AppConfig::default();
        config.gateway.allow_origin_regex = Some("^https?://(localhost".into());
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            default_temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_retention_rejected() {
        let mut config = AppConfig::default();
        config.history.max_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_backend_rejected() {
        let mut config = AppConfig::default();
        config.history.backend = "sqlite".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_with(Path::new("/nonexistent/config.toml"), no_env).unwrap();
        assert_eq!(config.default_model, "gpt-4o-mini");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_model = "gpt-4o"

[history]
path = "/srv/tutor/history.json"
max_length = 40
"#,
        )
        .unwrap();

        let config = AppConfig::load_with(&path, no_env).unwrap();
        assert_eq!(config.default_model, "gpt-4o");
        assert_eq!(config.history.path, PathBuf::from("/srv/tutor/history.json"));
        assert_eq!(config.history.max_length, 40);
        assert_eq!(config.history.backend, "file");
        assert_eq!(config.gateway.port, 8000);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_model = [").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = AppConfig::default();
        config
            .apply_env(|key| match key {
                "OPENAI_API_KEY" => Some("sk-test".into()),
                "CHATRELAY_MODEL" => Some("gpt-4.1".into()),
                "CHATRELAY_HISTORY_FILE" => Some("/tmp/h.json".into()),
                "CHATRELAY_MAX_HISTORY" => Some(" 25 ".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.default_model, "gpt-4.1");
        assert_eq!(config.history.path, PathBuf::from("/tmp/h.json"));
        assert_eq!(config.history.max_length, 25);
    }

    #[test]
    fn dedicated_key_wins_over_openai_key() {
        let mut config = AppConfig::default();
        config
            .apply_env(|key| match key {
                "CHATRELAY_API_KEY" => Some("relay".into()),
                "OPENAI_API_KEY" => Some("openai".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("relay"));
    }

    #[test]
    fn bad_max_history_env_is_rejected() {
        let mut config = AppConfig::default();
        let result = config.apply_env(|key| (key == "CHATRELAY_MAX_HISTORY").then(|| "lots".to_string()));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("gpt-4o-mini"));
        assert!(toml_str.contains("8000"));
        assert!(toml_str.contains("max_length = 10"));
    }
}
