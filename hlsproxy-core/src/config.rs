use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub http_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            http_port: 3144,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Flat directory holding one file per segment id, no extensions.
    pub dir: String,
    /// Maximum full GET attempts per segment download.
    pub max_attempts: u32,
    /// Fixed delay between attempts, in milliseconds. No backoff, no jitter.
    pub retry_delay_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: "./cache".to_string(),
            max_attempts: 30,
            retry_delay_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. Config file (if provided)
    /// 3. Defaults (lowest priority)
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
            }
        }

        // Override with environment variables (HLSPROXY_SERVER_HOST, etc.)
        builder = builder.add_source(
            Environment::with_prefix("HLSPROXY")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load from environment variables only (for Docker/K8s)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load from file path
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }

    /// Get HTTP address
    #[must_use]
    pub fn http_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.http_port)
    }

    /// Validate configuration, collecting every problem found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.server.http_port == 0 {
            errors.push("server.http_port must be non-zero".to_string());
        }
        if self.cache.dir.trim().is_empty() {
            errors.push("cache.dir must not be empty".to_string());
        }
        if self.cache.max_attempts == 0 {
            errors.push("cache.max_attempts must be at least 1".to_string());
        }
        match self.logging.format.as_str() {
            "json" | "pretty" => {}
            other => errors.push(format!("logging.format must be json or pretty, got {other}")),
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Fixed delay between download attempts.
    #[must_use]
    pub fn retry_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.cache.retry_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_original_deployment() {
        let config = Config::default();
        assert_eq!(config.http_address(), "0.0.0.0:3144");
        assert_eq!(config.cache.dir, "./cache");
        assert_eq!(config.cache.max_attempts, 30);
        assert_eq!(config.retry_delay(), std::time::Duration::from_millis(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut config = Config::default();
        config.cache.max_attempts = 0;
        config.cache.dir = String::new();
        config.logging.format = "xml".to_string();

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
