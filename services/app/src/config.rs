//! services/app/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use summarizer_core::handoff::DEFAULT_APP_ORIGIN;
use tracing::Level;
use url::Url;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub storage_dir: PathBuf,
    pub log_level: Level,
    /// The origin the front end is served from; used for CORS and handoff links.
    pub app_origin: Url,
    /// How long the mock summarizer takes to "finish".
    pub summary_delay: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server and Storage Settings ---
        let bind_address_str =
            lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let storage_dir = lookup("STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data"));

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Front End Settings ---
        let app_origin_str =
            lookup("APP_ORIGIN").unwrap_or_else(|| DEFAULT_APP_ORIGIN.to_string());
        let app_origin = Url::parse(&app_origin_str).map_err(|e| {
            ConfigError::InvalidValue("APP_ORIGIN".to_string(), e.to_string())
        })?;

        // --- Mock Summarizer Settings ---
        let summary_delay = match lookup("SUMMARY_DELAY_MS") {
            Some(ms) => Duration::from_millis(ms.parse::<u64>().map_err(|e| {
                ConfigError::InvalidValue("SUMMARY_DELAY_MS".to_string(), e.to_string())
            })?),
            None => Duration::from_millis(2000),
        };

        Ok(Self {
            bind_address,
            storage_dir,
            log_level,
            app_origin,
            summary_delay,
        })
    }
}
