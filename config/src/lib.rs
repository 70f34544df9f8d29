//! # Configuration Management for FacetHaus
//!
//! This crate provides centralized configuration structures for all FacetHaus
//! components, covering the data-engine connection and the retry policy.
//!
//! ## Quick Start
//!
//! ### Programmatic Configuration
//! ```rust
//! use config::{EngineConfig, RetryConfig};
//!
//! // Engine configuration
//! let engine_config = EngineConfig::new("memory://demo".to_string(), 5000);
//!
//! // Retry configuration
//! let retry_config = RetryConfig::new(3);
//! ```
//!
//! ### TOML File Configuration
//! ```toml
//! [engine]
//! url = "memory://demo"
//! connect_timeout_ms = 5000
//!
//! [retry]
//! max_retries = 3
//! ```
//!
//! Load configuration:
//! ```rust,no_run
//! use config::AppConfig;
//!
//! // Load from facethaus.toml
//! let config = AppConfig::load()?;
//!
//! // Or load from custom path
//! let config = AppConfig::from_file("config/production.toml")?;
//! # Ok::<(), config::ConfigError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::{env, path::Path};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./facethaus.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Environment variable error: {0}")]
    Env(#[from] env::VarError),
    #[error("Dotenvy error: {0}")]
    Dotenvy(#[from] dotenvy::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub retry: RetryConfig,
}

/// Data-engine connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub url: String,
    pub connect_timeout_ms: u64,
}

/// Retry policy configuration for engine calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_retries: u32,
}

impl AppConfig {
    /// Load configuration from TOML file specified in .env or defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config = {
            dotenvy::dotenv()?;

            // Try to load .env file for FACETHAUS_CONFIG path
            if let Ok(config_path) = env::var("FACETHAUS_CONFIG") {
                Self::from_file(&config_path)
            }
            // Try to load config from DEFAULT_CONFIG_PATH
            else if Path::new(DEFAULT_CONFIG_PATH).exists() {
                Self::from_file(DEFAULT_CONFIG_PATH)
            }
            // Return error if neither .env file nor default config file exists
            else {
                Err(ConfigError::Invalid(format!(
                    "Config path must be specified in .env file as FACETHAUS_CONFIG or in {} file",
                    DEFAULT_CONFIG_PATH
                )))
            }
        }?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.url.is_empty() {
            return Err(ConfigError::Invalid(
                "Engine url cannot be empty".to_string(),
            ));
        }
        if self.engine.connect_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "Engine connect_timeout_ms must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new(url: String, connect_timeout_ms: u64) -> Self {
        Self {
            url,
            connect_timeout_ms,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_retries: 3 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [engine]
            url = "memory://demo"
            connect_timeout_ms = 5000

            [retry]
            max_retries = 3
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.engine.url, "memory://demo");
        assert_eq!(config.engine.connect_timeout_ms, 5000);
        assert_eq!(config.retry.max_retries, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_url() {
        let config = AppConfig {
            engine: EngineConfig::new("".to_string(), 5000),
            retry: RetryConfig::default(),
        };

        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = AppConfig {
            engine: EngineConfig::new("memory://demo".to_string(), 0),
            retry: RetryConfig::default(),
        };

        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_retry_config_default() {
        assert_eq!(RetryConfig::default().max_retries, 3);
    }
}
