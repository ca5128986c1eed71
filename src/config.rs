// src/config.rs
use std::env;
use std::str::FromStr;

use dotenvy::dotenv;
use thiserror::Error;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful AI therapist providing mental health support.";

#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP bind host (e.g., 0.0.0.0)
    pub app_host: String,
    /// HTTP bind port
    pub app_port: u16,

    /// Gemini API key, required
    pub gemini_api_key: String,
    /// Gemini API base URL
    pub gemini_base_url: String,
    /// Model identifier sent to the provider
    pub gemini_model: String,

    /// Sampling temperature forwarded to the provider
    pub temperature: f32,
    /// Cap on tokens the provider may generate
    pub max_output_tokens: u32,
    /// Outbound request timeout in seconds
    pub request_timeout_secs: u64,
    /// Extra attempts the provider client makes after a failed call
    pub max_retries: u32,

    /// Fixed system instruction sent with every model call
    pub system_prompt: String,
    /// Threads idle longer than this are purged
    pub thread_ttl_secs: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid number for {name}: {value}")]
    InvalidNumber { name: &'static str, value: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env if present
        let _ = dotenv();

        let app_host = env_or_default("APP_HOST", "0.0.0.0");
        let app_port = parse_or_default::<u16>("APP_PORT", 3000)?;

        let gemini_api_key =
            env::var("GEMINI_API_KEY").map_err(|_| ConfigError::MissingVar("GEMINI_API_KEY"))?;
        let gemini_base_url = env_or_default(
            "GEMINI_BASE_URL",
            "https://generativelanguage.googleapis.com/v1beta",
        );
        let gemini_model = env_or_default("GEMINI_MODEL", "gemini-1.5-pro");

        let temperature = parse_or_default::<f32>("TEMPERATURE", 0.7)?;
        let max_output_tokens = parse_or_default::<u32>("MAX_OUTPUT_TOKENS", 256)?;
        let request_timeout_secs = parse_or_default::<u64>("REQUEST_TIMEOUT_SECS", 30)?;
        let max_retries = parse_or_default::<u32>("MAX_RETRIES", 2)?;

        let system_prompt = env_or_default("SYSTEM_PROMPT", DEFAULT_SYSTEM_PROMPT);
        let thread_ttl_secs = parse_or_default::<u64>("THREAD_TTL_SECS", 1800)?;

        Ok(Self {
            app_host,
            app_port,
            gemini_api_key,
            gemini_base_url,
            gemini_model,
            temperature,
            max_output_tokens,
            request_timeout_secs,
            max_retries,
            system_prompt,
            thread_ttl_secs,
        })
    }
}

fn env_or_default(key: &'static str, default: &'static str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_or_default<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(v) => v.parse::<T>().map_err(|_| ConfigError::InvalidNumber {
            name: key,
            value: v,
        }),
        Err(_) => Ok(default),
    }
}
