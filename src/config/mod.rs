//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `TRANSPARENCY_CHAT` prefix and nested values use double underscores as separators.
//! Every setting has a default, so an empty environment is a valid configuration.
//!
//! # Example
//!
//! ```no_run
//! use transparency_chat::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Backend at {}", config.api.base_url);
//! ```

mod api;
mod error;
mod logging;
mod realtime;
mod storage;

pub use api::ApiConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use realtime::RealtimeConfig;
pub use storage::StorageConfig;

use serde::Deserialize;
use url::Url;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Question-answer backend (base URL, timeout)
    #[serde(default)]
    pub api: ApiConfig,

    /// WebSocket transport (URL, reconnect policy, heartbeat)
    #[serde(default)]
    pub realtime: RealtimeConfig,

    /// Conversation snapshot location
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log filter and format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `TRANSPARENCY_CHAT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `TRANSPARENCY_CHAT__API__BASE_URL=...` -> `api.base_url = ...`
    /// - `TRANSPARENCY_CHAT__REALTIME__RECONNECT_ATTEMPTS=10` -> `realtime.reconnect_attempts = 10`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TRANSPARENCY_CHAT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.api.validate()?;
        let base = self.api.parsed_base_url()?;
        self.realtime.validate(&base)?;
        self.storage.validate()?;
        Ok(())
    }

    /// The WebSocket URL, explicit or derived from the API base URL.
    pub fn realtime_url(&self) -> Result<Url, ValidationError> {
        let base = self.api.parsed_base_url()?;
        self.realtime.resolve_url(&base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "TRANSPARENCY_CHAT__API__BASE_URL",
        "TRANSPARENCY_CHAT__API__TIMEOUT_SECS",
        "TRANSPARENCY_CHAT__REALTIME__URL",
        "TRANSPARENCY_CHAT__REALTIME__RECONNECT",
        "TRANSPARENCY_CHAT__REALTIME__RECONNECT_ATTEMPTS",
        "TRANSPARENCY_CHAT__REALTIME__MONOTONIC_PROGRESS",
        "TRANSPARENCY_CHAT__STORAGE__KEY",
        "TRANSPARENCY_CHAT__LOGGING__JSON",
    ];

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8001");
        assert_eq!(config.realtime.reconnect_attempts, 5);
        assert_eq!(config.storage.key, "chat-storage");
        assert_eq!(config.logging.filter, "info");
        assert!(config.validate().is_ok());
        assert_eq!(config.realtime_url().unwrap().as_str(), "ws://localhost:8001/ws");
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("TRANSPARENCY_CHAT__API__BASE_URL", "https://qa.example.com");
        env::set_var("TRANSPARENCY_CHAT__API__TIMEOUT_SECS", "30");
        env::set_var("TRANSPARENCY_CHAT__REALTIME__RECONNECT_ATTEMPTS", "10");
        env::set_var("TRANSPARENCY_CHAT__REALTIME__MONOTONIC_PROGRESS", "true");
        env::set_var("TRANSPARENCY_CHAT__LOGGING__JSON", "true");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.realtime.reconnect_attempts, 10);
        assert!(config.realtime.monotonic_progress);
        assert!(config.logging.json);
        assert_eq!(config.realtime_url().unwrap().as_str(), "wss://qa.example.com/ws");
    }

    #[test]
    fn test_explicit_realtime_url() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("TRANSPARENCY_CHAT__REALTIME__URL", "ws://127.0.0.1:9000/ws");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.realtime_url().unwrap().as_str(), "ws://127.0.0.1:9000/ws");
    }

    #[test]
    fn test_validate_rejects_empty_storage_key() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("TRANSPARENCY_CHAT__STORAGE__KEY", " ");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("storage.key"))
        );
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let config = AppConfig {
            api: ApiConfig {
                base_url: "localhost".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidApiUrl(_))));
    }
}
