//! Server configuration.

use crate::service::{BOARD_SIZE_LIMIT, DEFAULT_MAX_BOARD_SIZE};
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Settings for the game server.
///
/// Values come from, in rising priority: built-in defaults, a TOML file, the
/// `HOST`/`PORT` environment variables, and command-line flags.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    port: u16,

    /// Largest board side length a game may be created with.
    #[serde(default = "default_max_board_size")]
    max_board_size: usize,

    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    log_filter: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_board_size() -> usize {
    DEFAULT_MAX_BOARD_SIZE
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_board_size: default_max_board_size(),
            log_filter: default_log_filter(),
        }
    }
}

impl ServerConfig {
    /// Parses configuration from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml_str(&content)?;
        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Applies `HOST` and `PORT` from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Applies `HOST` and `PORT` as returned by `lookup`.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            debug!(host = %host, "HOST override");
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .parse()
                .map_err(|_| ConfigError::new(format!("PORT is not a valid port: {port}")))?;
            debug!(port = self.port, "PORT override");
        }
        Ok(self)
    }

    /// Checks values that parse but cannot be served.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_board_size == 0 {
            return Err(ConfigError::new(
                "max_board_size must be at least 1".to_string(),
            ));
        }
        if self.max_board_size > BOARD_SIZE_LIMIT {
            return Err(ConfigError::new(format!(
                "max_board_size must be at most {BOARD_SIZE_LIMIT}, got {}",
                self.max_board_size
            )));
        }
        Ok(())
    }

    /// Address to bind the listener to.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::new(format!("Invalid bind address: {}", e)))
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::new(format!("Failed to render config: {}", e)))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = ServerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_env_lookup_overrides() {
        let config = ServerConfig::default()
            .apply_env(|key| match key {
                "PORT" => Some("8081".to_string()),
                "HOST" => Some("0.0.0.0".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(*config.port(), 8081);
        assert_eq!(config.host(), "0.0.0.0");
    }

    #[test]
    fn test_board_limit_bounds() {
        let at_limit = format!("max_board_size = {BOARD_SIZE_LIMIT}");
        assert!(ServerConfig::from_toml_str(&at_limit).is_ok());

        let err = ServerConfig::from_toml_str("max_board_size = 18446744073709551615")
            .unwrap_err();
        assert!(err.message.contains("at most"));
    }

    #[test]
    fn test_bad_port_env() {
        let result = ServerConfig::default().apply_env(|key| {
            (key == "PORT").then(|| "not-a-port".to_string())
        });
        assert!(result.is_err());
    }
}
