//! # Configuration Management
//!
//! Centralized configuration for the sACN sender.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment variable overrides via `from_env()`
//!
//! The remote port defaults to the sACN port 5568. A local address is optional; when
//! set, the socket of the matching family is bound to it.

use crate::core::packet::SACN_PORT;
use crate::error::{Result, SacnError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::net::IpAddr;
use std::path::Path;
use tracing::Level;

/// Default multicast TTL, matching the OS default of staying on the local subnet
pub const DEFAULT_MULTICAST_TTL: u32 = 1;

/// Default number of pre-allocated send buffers
pub const DEFAULT_BUFFER_POOL_SIZE: usize = 16;

const MAX_BUFFER_POOL_SIZE: usize = 4096;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct SenderConfig {
    /// Socket and addressing configuration
    #[serde(default)]
    pub transport: TransportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SenderConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| SacnError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| SacnError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| SacnError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Defaults overridden by `SACN_*` environment variables.
    ///
    /// Unparseable values are rejected rather than ignored.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(port) = env_var("SACN_REMOTE_PORT")? {
            config.transport.remote_port = port;
        }

        if let Some(addr) = env_var::<IpAddr>("SACN_LOCAL_ADDRESS")? {
            config.transport.local_address = Some(addr);
        }

        if let Some(port) = env_var("SACN_LOCAL_PORT")? {
            config.transport.local_port = port;
        }

        if let Some(ttl) = env_var("SACN_MULTICAST_TTL")? {
            config.transport.multicast_ttl = ttl;
        }

        if let Some(level) = env_var::<Level>("SACN_LOG_LEVEL")? {
            config.logging.log_level = level;
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SacnError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| SacnError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration.
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.transport.validate();
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(SacnError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

fn env_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| SacnError::ConfigError(format!("Invalid value for {name}: '{raw}'"))),
        Err(_) => Ok(None),
    }
}

/// Socket and addressing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Destination port for every datagram
    pub remote_port: u16,

    /// Local address to bind the matching-family socket to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_address: Option<IpAddr>,

    /// Local port used with `local_address`; 0 lets the OS choose
    pub local_port: u16,

    /// IPv4 multicast TTL
    pub multicast_ttl: u32,

    /// Whether multicast sends loop back to local receivers
    pub multicast_loop: bool,

    /// Number of pre-allocated send buffers
    pub buffer_pool_size: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            remote_port: SACN_PORT,
            local_address: None,
            local_port: 0,
            multicast_ttl: DEFAULT_MULTICAST_TTL,
            multicast_loop: true,
            buffer_pool_size: DEFAULT_BUFFER_POOL_SIZE,
        }
    }
}

impl TransportConfig {
    /// Bind to `addr` before sending on its family's socket
    pub fn with_local_address(mut self, addr: IpAddr) -> Self {
        self.local_address = Some(addr);
        self
    }

    /// Validate transport configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.remote_port == 0 {
            errors.push("Remote port cannot be 0".to_string());
        }

        if let Some(addr) = self.local_address {
            if addr.is_multicast() {
                errors.push(format!(
                    "Local address {addr} is a multicast group (expected a unicast interface address)"
                ));
            }
            if let IpAddr::V4(v4) = addr {
                if v4.is_broadcast() {
                    errors.push(format!("Local address {addr} is a broadcast address"));
                }
            }
        } else if self.local_port != 0 {
            errors.push("local_port requires local_address to be set".to_string());
        }

        if self.multicast_ttl == 0 || self.multicast_ttl > 255 {
            errors.push(format!(
                "Invalid multicast TTL: {} (valid range: 1-255)",
                self.multicast_ttl
            ));
        }

        if self.buffer_pool_size > MAX_BUFFER_POOL_SIZE {
            errors.push(format!(
                "Buffer pool size too large: {} (maximum: {MAX_BUFFER_POOL_SIZE})",
                self.buffer_pool_size
            ));
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to log to console
    pub log_to_console: bool,

    /// Whether to log to file
    pub log_to_file: bool,

    /// Path to log file (if log_to_file is true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file_path: Option<String>,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("sacn-transport"),
            log_level: Level::INFO,
            log_to_console: true,
            log_to_file: false,
            log_file_path: None,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        if self.log_to_file {
            if let Some(ref path) = self.log_file_path {
                if let Some(parent) = Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        errors.push(format!(
                            "Log file directory does not exist: {}",
                            parent.display()
                        ));
                    }
                }
            } else {
                errors.push("log_file_path must be specified when log_to_file is true".to_string());
            }
        }

        if !self.log_to_console && !self.log_to_file {
            errors
                .push("At least one logging output (console or file) must be enabled".to_string());
        }

        errors
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
