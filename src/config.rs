//! Configuration management for the Bookshelf client

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Base URL of the REST backend, e.g. `http://localhost:3000/api`
    pub base_url: String,
    pub timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Quiet period before a typed query is sent
    pub debounce_ms: u64,
    /// Initial ceiling, also the load-more increment
    pub page_size: u32,
    pub max_results: u32,
    /// Delay before a lost focus closes the dropdown
    pub blur_grace_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationsConfig {
    pub capacity: usize,
    pub ttl_seconds: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    /// Optional directory for a daily rolling log file
    pub file: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from defaults, files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .set_default("api.base_url", ApiConfig::default().base_url)?
            .set_default("api.timeout_seconds", 15)?
            .set_default("api.connect_timeout_seconds", 15)?
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix BOOKSHELF_)
            .add_source(
                Environment::with_prefix("BOOKSHELF")
                    .separator("_")
                    .try_parsing(true),
            )
            // Override API URL from BOOKSHELF_API_URL env var if present
            .set_override_option("api.base_url", env::var("BOOKSHELF_API_URL").ok())?
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.search.page_size == 0 {
            return Err(ConfigError::Message(
                "search.page_size must be greater than zero".to_string(),
            ));
        }
        if self.search.max_results < self.search.page_size {
            return Err(ConfigError::Message(
                "search.max_results must be at least search.page_size".to_string(),
            ));
        }
        Ok(())
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn blur_grace(&self) -> Duration {
        Duration::from_millis(self.blur_grace_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            timeout_seconds: 15,
            connect_timeout_seconds: 15,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 400,
            page_size: 10,
            max_results: 40,
            blur_grace_ms: 200,
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            capacity: 5,
            ttl_seconds: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            search: SearchConfig::default(),
            notifications: NotificationsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
