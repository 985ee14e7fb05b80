//! Configuration for the Lucid server.
//!
//! Process settings come from an optional TOML file (bind address, port and
//! the `[explainer]` / `[validation]` sections). Provider settings, including
//! the API key, come from `LUCID_*` environment variables and never from the
//! file.

use lucid_domain::provider::{
    DEFAULT_BACKOFF_BASE_MS, DEFAULT_BACKOFF_MAX_MS, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_MS,
};
use lucid_domain::{ApiKey, ClassifiedError, Classify, ErrorCode, ProviderConfig, ProviderKind};
use lucid_explainer::ExplainerConfig;
use lucid_gatekeeper::ValidationConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Environment variable names read at startup
pub mod env {
    /// Provider backend: `openai`, `anthropic` or `ollama`
    pub const PROVIDER: &str = "LUCID_PROVIDER";
    /// API key (not needed for `ollama`)
    pub const API_KEY: &str = "LUCID_API_KEY";
    /// Base URL override
    pub const BASE_URL: &str = "LUCID_BASE_URL";
    /// Model name
    pub const MODEL: &str = "LUCID_MODEL";
    /// Per-attempt timeout in milliseconds
    pub const TIMEOUT_MS: &str = "LUCID_TIMEOUT_MS";
    /// Retries after the first attempt
    pub const MAX_RETRIES: &str = "LUCID_MAX_RETRIES";
    /// First backoff delay in milliseconds
    pub const BACKOFF_BASE_MS: &str = "LUCID_BACKOFF_BASE_MS";
    /// Backoff ceiling in milliseconds
    pub const BACKOFF_MAX_MS: &str = "LUCID_BACKOFF_MAX_MS";
}

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Required environment variable not set
    #[error("Missing required environment variable: {0}")]
    MissingEnv(&'static str),

    /// Environment variable set to an unusable value
    #[error("Invalid value '{value}' for {var}")]
    InvalidEnv {
        /// Variable name
        var: &'static str,
        /// Value as given
        value: String,
    },

    /// A section of the file failed validation
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl Classify for ConfigError {
    fn classify(&self) -> ClassifiedError {
        let code = match self {
            ConfigError::MissingEnv(env::API_KEY) => ErrorCode::MissingCredentials,
            _ => ErrorCode::InvalidConfig,
        };
        ClassifiedError::with_detail(code, self.to_string())
    }
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8080)
    pub bind_port: u16,

    /// Pipeline settings
    pub explainer: ExplainerConfig,

    /// Input validation settings
    pub validation: ValidationConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8080,
            explainer: ExplainerConfig::default(),
            validation: ValidationConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the nested sections
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.trim().is_empty() {
            return Err(ConfigError::Invalid("bind_address is empty".to_string()));
        }
        self.explainer
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.validation
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

/// Read provider settings from the process environment
pub fn provider_config_from_env() -> Result<ProviderConfig, ConfigError> {
    provider_config_from_lookup(|key| std::env::var(key).ok())
}

/// Read provider settings through a lookup function
///
/// Blank values count as unset. A key is required unless the provider is
/// `ollama`.
pub fn provider_config_from_lookup<F>(lookup: F) -> Result<ProviderConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |var: &'static str| lookup(var).filter(|v| !v.trim().is_empty());

    let raw_provider = get(env::PROVIDER).ok_or(ConfigError::MissingEnv(env::PROVIDER))?;
    let provider = ProviderKind::parse(&raw_provider).ok_or_else(|| ConfigError::InvalidEnv {
        var: env::PROVIDER,
        value: raw_provider.clone(),
    })?;

    let api_key = match get(env::API_KEY) {
        Some(key) => ApiKey::new(key.trim()),
        None if provider.requires_api_key() => return Err(ConfigError::MissingEnv(env::API_KEY)),
        None => ApiKey::default(),
    };

    let model = get(env::MODEL).ok_or(ConfigError::MissingEnv(env::MODEL))?;

    let mut config = ProviderConfig::new(provider, api_key, model.trim())
        .with_timeout_ms(parse_or(&get, env::TIMEOUT_MS, DEFAULT_TIMEOUT_MS)?)
        .with_max_retries(parse_or(&get, env::MAX_RETRIES, DEFAULT_MAX_RETRIES)?)
        .with_backoff_ms(
            parse_or(&get, env::BACKOFF_BASE_MS, DEFAULT_BACKOFF_BASE_MS)?,
            parse_or(&get, env::BACKOFF_MAX_MS, DEFAULT_BACKOFF_MAX_MS)?,
        );
    if let Some(base_url) = get(env::BASE_URL) {
        config = config.with_base_url(base_url.trim().trim_end_matches('/'));
    }

    Ok(config)
}

fn parse_or<T, G>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&'static str) -> Option<String>,
{
    match get(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnv { var, value }),
        None => Ok(default),
    }
}
