use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Default completion endpoint when `OPENAI_BASE_URL` is not set.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// Default model identifier when `COMPLETION_MODEL` is not set.
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-3.5-turbo";
/// Default output-token budget when `COMPLETION_MAX_TOKENS` is not set.
pub const DEFAULT_COMPLETION_MAX_TOKENS: u32 = 800;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the askdoc server.
#[derive(Debug)]
pub struct Config {
    /// API key for the completion provider. Absent keys do not prevent
    /// startup; the first completion call fails instead.
    pub openai_api_key: Option<String>,
    /// Base URL of the chat-completion API.
    pub openai_base_url: String,
    /// Model identifier sent with every completion request.
    pub completion_model: String,
    /// Maximum number of output tokens requested per completion.
    pub completion_max_tokens: u32,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// Optional cap on the uploaded request body size in bytes. When unset,
    /// axum's default multipart limit applies.
    pub max_upload_bytes: Option<usize>,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            openai_api_key: load_env_optional("OPENAI_API_KEY"),
            openai_base_url: load_env_optional("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            completion_model: load_env_optional("COMPLETION_MODEL")
                .unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.to_string()),
            completion_max_tokens: load_env_optional("COMPLETION_MAX_TOKENS")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("COMPLETION_MAX_TOKENS".into()))
                })
                .transpose()?
                .unwrap_or(DEFAULT_COMPLETION_MAX_TOKENS),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
            max_upload_bytes: load_env_optional("MAX_UPLOAD_BYTES")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("MAX_UPLOAD_BYTES".into()))
                })
                .transpose()?,
        })
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        base_url = %config.openai_base_url,
        model = %config.completion_model,
        max_tokens = config.completion_max_tokens,
        server_port = ?config.server_port,
        has_api_key = config.openai_api_key.is_some(),
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
