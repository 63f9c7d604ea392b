//! Configuration loading, validation, and management for Chatfolio.
//!
//! Loads configuration from `./chatfolio.toml` (or the file named by
//! `CHATFOLIO_CONFIG`) with environment variable overrides. Validates all
//! settings at startup. Once loaded the configuration is immutable and is
//! passed explicitly to the subsystems that need it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an alternate config file.
pub const CONFIG_PATH_ENV: &str = "CHATFOLIO_CONFIG";

/// Origins allowed to call the API with credentials when none are configured.
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "https://manuel-david-new-portfolio.vercel.app",
    "https://nouvo.dev",
    "http://localhost:3000",
    "http://localhost:3001",
];

/// The root configuration structure.
///
/// Maps directly to `chatfolio.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the completion provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Model identifier sent with every completion request
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max output tokens per response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Retry policy for the completion call
    #[serde(default)]
    pub retry: RetryConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Knowledge record source
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
}

fn default_api_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    500
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
            .field("api_base_url", &self.api_base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("retry", &self.retry)
            .field("gateway", &self.gateway)
            .field("knowledge", &self.knowledge)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed pause between attempts, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}
fn default_delay_ms() -> u64 {
    1000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Include raw error detail in error responses
    #[serde(default)]
    pub debug: bool,

    /// Origins allowed by the CORS policy
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_port() -> u16 {
    5000
}
fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_allowed_origins() -> Vec<String> {
    DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            debug: false,
            allowed_origins: default_allowed_origins(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// TOML file replacing the built-in knowledge record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from the default path with environment overrides.
    ///
    /// Environment variables (highest priority):
    /// - `OPENAI_API_KEY` / `CHATFOLIO_API_KEY`
    /// - `PORT`, `HOST`
    /// - `CHATFOLIO_MODEL`, `CHATFOLIO_API_BASE_URL`
    /// - `CHATFOLIO_DEBUG`
    /// - `CHATFOLIO_KNOWLEDGE`
    /// - `CHATFOLIO_ALLOWED_ORIGINS` (comma-separated)
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_path());
        let mut config = Self::load_from(&path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
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

    /// Apply environment overrides through `lookup`, so tests can supply
    /// variables without touching the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("CHATFOLIO_API_KEY").or_else(|| non_empty("OPENAI_API_KEY"))
        {
            self.api_key = Some(key);
        }

        if let Some(port) = non_empty("PORT") {
            self.gateway.port = port.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("PORT must be a port number, got '{port}'"))
            })?;
        }

        if let Some(host) = non_empty("HOST") {
            self.gateway.host = host;
        }

        if let Some(model) = non_empty("CHATFOLIO_MODEL") {
            self.model = model;
        }

        if let Some(url) = non_empty("CHATFOLIO_API_BASE_URL") {
            self.api_base_url = url;
        }

        if let Some(flag) = non_empty("CHATFOLIO_DEBUG") {
            self.gateway.debug = parse_flag(&flag);
        }

        if let Some(path) = non_empty("CHATFOLIO_KNOWLEDGE") {
            self.knowledge.path = Some(PathBuf::from(path));
        }

        if let Some(origins) = non_empty("CHATFOLIO_ALLOWED_ORIGINS") {
            self.gateway.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }

        Ok(())
    }

    /// `./chatfolio.toml`
    pub fn default_path() -> PathBuf {
        PathBuf::from("chatfolio.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "max_tokens must be greater than 0".into(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "retry.max_attempts must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: default_api_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            retry: RetryConfig::default(),
            gateway: GatewayConfig::default(),
            knowledge: KnowledgeConfig::default(),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
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
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.gateway.port, 5000);
        assert_eq!(config.model, "gpt-4");
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.max_tokens, 500);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay_ms, 1000);
        assert!(!config.gateway.debug);
        assert_eq!(config.gateway.allowed_origins.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.model, config.model);
        assert_eq!(parsed.gateway.port, config.gateway.port);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_attempts_rejected() {
        let mut config = AppConfig::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/chatfolio.toml")).unwrap();
        assert_eq!(config.gateway.port, 5000);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn loads_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chatfolio.toml");
        std::fs::write(
            &path,
            r#"
model = "gpt-4o-mini"

[gateway]
port = 8080
debug = true

[retry]
delay_ms = 10
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.gateway.port, 8080);
        assert!(config.gateway.debug);
        assert_eq!(config.retry.delay_ms, 10);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.max_tokens, 500);
    }

    #[test]
    fn unparseable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chatfolio.toml");
        std::fs::write(&path, "port = [").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = AppConfig::default();
        config
            .apply_env(env(&[
                ("OPENAI_API_KEY", "sk-test"),
                ("PORT", "8123"),
                ("CHATFOLIO_DEBUG", "True"),
                ("CHATFOLIO_MODEL", "gpt-4o"),
                ("CHATFOLIO_ALLOWED_ORIGINS", "https://a.dev, https://b.dev,"),
            ]))
            .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.gateway.port, 8123);
        assert!(config.gateway.debug);
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(
            config.gateway.allowed_origins,
            vec!["https://a.dev".to_string(), "https://b.dev".to_string()]
        );
    }

    #[test]
    fn chatfolio_key_wins_over_openai_key() {
        let mut config = AppConfig::default();
        config
            .apply_env(env(&[
                ("OPENAI_API_KEY", "sk-openai"),
                ("CHATFOLIO_API_KEY", "sk-chatfolio"),
            ]))
            .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("sk-chatfolio"));
    }

    #[test]
    fn blank_api_key_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[("OPENAI_API_KEY", "   ")])).unwrap();
        assert!(!config.has_api_key());
    }

    #[test]
    fn bad_port_rejected() {
        let mut config = AppConfig::default();
        let err = config.apply_env(env(&[("PORT", "web")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("sk-very-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("gpt-4"));
        assert!(toml_str.contains("5000"));
    }
}
