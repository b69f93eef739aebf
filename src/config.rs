//! Server configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Settings for the game server.
///
/// Every field has a default, so an empty TOML file is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on.
    #[serde(default = "default_host")]
    host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    port: u16,

    /// Idle seconds between connections before the roster closes.
    #[serde(default = "default_join_timeout")]
    join_timeout_secs: u64,

    /// Seconds a connecting client has to answer with `JOIN`.
    #[serde(default = "default_handshake_timeout")]
    handshake_timeout_secs: u64,

    /// Seconds a remote player has to answer `ASK_FOR_MOVE`.
    #[serde(default = "default_move_timeout")]
    move_timeout_secs: u64,

    /// Longest accepted wire line, in bytes.
    #[serde(default = "default_max_message_bytes")]
    max_message_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_join_timeout() -> u64 {
    30
}

fn default_handshake_timeout() -> u64 {
    10
}

fn default_move_timeout() -> u64 {
    30
}

fn default_max_message_bytes() -> usize {
    5120
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            join_timeout_secs: default_join_timeout(),
            handshake_timeout_secs: default_handshake_timeout(),
            move_timeout_secs: default_move_timeout(),
            max_message_bytes: default_max_message_bytes(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_message_bytes == 0 {
            return Err(ConfigError::new("max_message_bytes must be positive".to_string()));
        }
        if self.move_timeout_secs == 0 || self.handshake_timeout_secs == 0 {
            return Err(ConfigError::new("timeouts must be at least one second".to_string()));
        }
        Ok(())
    }

    /// Replaces the listen address with command-line values, where given.
    pub fn with_address(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    /// `host:port`, ready for binding.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Join window as a duration.
    pub fn join_timeout(&self) -> Duration {
        Duration::from_secs(self.join_timeout_secs)
    }

    /// Handshake deadline as a duration.
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }

    /// Move deadline as a duration.
    pub fn move_timeout(&self) -> Duration {
        Duration::from_secs(self.move_timeout_secs)
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
    fn test_empty_document_uses_defaults() {
        let config = ServerConfig::from_toml("").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.address(), "127.0.0.1:8000");
        assert_eq!(*config.max_message_bytes(), 5120);
    }

    #[test]
    fn test_partial_document() {
        let config = ServerConfig::from_toml("port = 9001\nmove_timeout_secs = 2").unwrap();
        assert_eq!(*config.port(), 9001);
        assert_eq!(config.move_timeout(), Duration::from_secs(2));
        assert_eq!(config.host(), "127.0.0.1");
    }

    #[test]
    fn test_command_line_overrides() {
        let config = ServerConfig::default().with_address(Some("0.0.0.0".to_string()), None);
        assert_eq!(config.address(), "0.0.0.0:8000");
    }

    #[test]
    fn test_rejects_zero_message_size() {
        let err = ServerConfig::from_toml("max_message_bytes = 0").unwrap_err();
        assert!(err.message.contains("max_message_bytes"));
    }
}
