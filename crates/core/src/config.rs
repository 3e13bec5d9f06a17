//! Environment configuration, resolved once at the process boundary.

use crate::content::{DEFAULT_OLLAMA_ENDPOINT, DEFAULT_OLLAMA_MODEL};
use gemini_live::{DEFAULT_STREAM_CHUNK_SIZE, LiveClientConfig};
use tracing::Level;

pub const DEFAULT_LIVE_MODEL: &str = "gemini-2.5-flash-native-audio-preview-09-2025";
pub const DEFAULT_VOICE: &str = "Studio";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
///
/// The rest of the system takes explicit config structs; this is the single
/// place environment variables are read.
#[derive(Clone, Debug)]
pub struct Config {
    pub gemini_api_key: String,
    pub live_model: String,
    pub voice: String,
    pub chunk_size: usize,
    pub ollama_endpoint: String,
    pub ollama_model: String,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| ConfigError::MissingVar("GEMINI_API_KEY".to_string()))?;

        let live_model =
            std::env::var("LIVE_MODEL").unwrap_or_else(|_| DEFAULT_LIVE_MODEL.to_string());
        let voice = std::env::var("LIVE_VOICE").unwrap_or_else(|_| DEFAULT_VOICE.to_string());

        let chunk_size = match std::env::var("LIVE_CHUNK_SIZE") {
            Ok(raw) => raw.parse::<usize>().ok().filter(|n| *n > 0).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "LIVE_CHUNK_SIZE".to_string(),
                    format!("'{raw}' is not a positive integer"),
                )
            })?,
            Err(_) => DEFAULT_STREAM_CHUNK_SIZE,
        };

        let ollama_endpoint = std::env::var("OLLAMA_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_OLLAMA_ENDPOINT.to_string());
        let ollama_model =
            std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_OLLAMA_MODEL.to_string());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            gemini_api_key,
            live_model,
            voice,
            chunk_size,
            ollama_endpoint,
            ollama_model,
            log_level,
        })
    }

    /// Projects the live-client portion of the configuration.
    pub fn live_client_config(&self) -> LiveClientConfig {
        LiveClientConfig {
            api_key: self.gemini_api_key.clone(),
            model: self.live_model.clone(),
            voice: self.voice.clone(),
            chunk_size: self.chunk_size,
        }
    }
}
