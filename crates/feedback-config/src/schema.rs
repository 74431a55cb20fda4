// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema definitions for the feedback service.
//!
//! # Schema Structure
//!
//! ```text
//! FeedbackConfig
//! ├── server: ServerConfig
//! ├── security: SecurityConfig
//! │   └── token: TokenConfig
//! ├── storage: StorageConfig
//! ├── cache: CacheConfig
//! ├── broker: BrokerConfig
//! └── logging: LoggingConfig
//! ```

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

// =============================================================================
// Constants
// =============================================================================

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default shutdown grace period in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 5;

/// Default token lifetime in minutes.
pub const DEFAULT_TOKEN_TTL_MINUTES: u64 = 10;

/// Default maximum token lifetime in minutes (one day).
pub const DEFAULT_MAX_TOKEN_TTL_MINUTES: u64 = 1440;

/// Default cache entry lifetime in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60;

/// Default broker topic.
pub const DEFAULT_TOPIC: &str = "feedbacks";

/// Default in-memory topic capacity.
pub const DEFAULT_TOPIC_CAPACITY: usize = 1024;

/// Default PostgreSQL pool size.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Minimum recommended secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

// =============================================================================
// Top-Level Configuration
// =============================================================================

/// The root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedbackConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Signing secret and token settings.
    #[serde(default)]
    pub security: SecurityConfig,

    /// Storage backend.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Response cache backend.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Broker backend.
    #[serde(default)]
    pub broker: BrokerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FeedbackConfig {
    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.security.validate()?;
        self.storage.validate()?;
        self.cache.validate()?;
        self.broker.validate()?;
        Ok(())
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-request timeout.
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Grace period for in-flight requests on shutdown.
    #[serde(default = "default_shutdown_timeout", with = "humantime_serde")]
    pub shutdown_timeout: Duration,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS)
}

impl ServerConfig {
    /// Validates the server configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.port == 0 {
            return Err(ConfigError::validation("server.port", "cannot be zero"));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "cannot be zero",
            ));
        }
        Ok(())
    }

    /// Returns the socket address.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_PORT,
            request_timeout: default_request_timeout(),
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

// =============================================================================
// Security Configuration
// =============================================================================

/// Signing secret and token issuance settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityConfig {
    /// Shared HMAC secret for bearer credentials.
    #[serde(default)]
    pub secret: Option<SecretValue>,

    /// Token issuance settings.
    #[serde(default)]
    pub token: TokenConfig,
}

impl SecurityConfig {
    /// Validates the security configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        match self.secret {
            None => return Err(ConfigError::missing_field("security.secret")),
            Some(ref secret) if secret.expose().is_empty() => {
                return Err(ConfigError::validation(
                    "security.secret",
                    "cannot be empty",
                ))
            }
            Some(ref secret) if secret.expose().len() < MIN_SECRET_LEN => {
                tracing::warn!(
                    min_len = MIN_SECRET_LEN,
                    "Signing secret is shorter than recommended"
                );
            }
            Some(_) => {}
        }
        self.token.validate()
    }
}

/// Token issuance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenConfig {
    /// Lifetime used when the caller gives none.
    #[serde(default = "default_token_ttl")]
    pub default_ttl_minutes: u64,

    /// Largest lifetime a caller may request.
    #[serde(default = "default_max_token_ttl")]
    pub max_ttl_minutes: u64,
}

fn default_token_ttl() -> u64 {
    DEFAULT_TOKEN_TTL_MINUTES
}

fn default_max_token_ttl() -> u64 {
    DEFAULT_MAX_TOKEN_TTL_MINUTES
}

impl TokenConfig {
    /// Validates the token configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_ttl_minutes == 0 {
            return Err(ConfigError::validation(
                "security.token.max_ttl_minutes",
                "cannot be zero",
            ));
        }
        if self.default_ttl_minutes == 0 || self.default_ttl_minutes > self.max_ttl_minutes {
            return Err(ConfigError::validation(
                "security.token.default_ttl_minutes",
                format!("must be in 1..={}", self.max_ttl_minutes),
            ));
        }
        Ok(())
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            default_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
            max_ttl_minutes: DEFAULT_MAX_TOKEN_TTL_MINUTES,
        }
    }
}

// =============================================================================
// Backend Configuration
// =============================================================================

/// Storage backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-process ordered table.
    #[default]
    Memory,
    /// PostgreSQL via `sqlx`.
    Postgres,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Backend kind.
    #[serde(default)]
    pub backend: StorageBackend,

    /// Connection URL (postgres only).
    #[serde(default)]
    pub url: Option<SecretValue>,

    /// Pool size (postgres only).
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

impl StorageConfig {
    /// Validates the storage configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.backend == StorageBackend::Postgres {
            validate_url("storage.url", self.url.as_ref())?;
            if self.max_connections == 0 {
                return Err(ConfigError::validation(
                    "storage.max_connections",
                    "cannot be zero",
                ));
            }
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

/// Cache backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// In-process map with per-entry TTL.
    #[default]
    Memory,
    /// Redis `SET ... EX`.
    Redis,
}

/// Response cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Backend kind.
    #[serde(default)]
    pub backend: CacheBackend,

    /// Connection URL (redis only).
    #[serde(default)]
    pub url: Option<SecretValue>,

    /// Entry lifetime in seconds.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

fn default_cache_ttl() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

impl CacheConfig {
    /// Validates the cache configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.ttl_secs == 0 {
            return Err(ConfigError::validation("cache.ttl_secs", "cannot be zero"));
        }
        if self.backend == CacheBackend::Redis {
            validate_url("cache.url", self.url.as_ref())?;
        }
        Ok(())
    }

    /// Returns the entry lifetime as a Duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            url: None,
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

/// Broker backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrokerBackend {
    /// In-process broadcast topic.
    #[default]
    Memory,
    /// Redis `PUBLISH`.
    Redis,
}

/// Broker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrokerConfig {
    /// Backend kind.
    #[serde(default)]
    pub backend: BrokerBackend,

    /// Connection URL (redis only).
    #[serde(default)]
    pub url: Option<SecretValue>,

    /// Topic (channel) name.
    #[serde(default = "default_topic")]
    pub topic: String,

    /// Per-subscriber buffer (memory only).
    #[serde(default = "default_topic_capacity")]
    pub capacity: usize,
}

fn default_topic() -> String {
    DEFAULT_TOPIC.to_string()
}

fn default_topic_capacity() -> usize {
    DEFAULT_TOPIC_CAPACITY
}

impl BrokerConfig {
    /// Validates the broker configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.topic.trim().is_empty() {
            return Err(ConfigError::validation("broker.topic", "cannot be empty"));
        }
        match self.backend {
            BrokerBackend::Memory if self.capacity == 0 => Err(ConfigError::validation(
                "broker.capacity",
                "cannot be zero",
            )),
            BrokerBackend::Memory => Ok(()),
            BrokerBackend::Redis => validate_url("broker.url", self.url.as_ref()),
        }
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            backend: BrokerBackend::Memory,
            url: None,
            topic: default_topic(),
            capacity: DEFAULT_TOPIC_CAPACITY,
        }
    }
}

fn validate_url(field: &str, value: Option<&SecretValue>) -> ConfigResult<()> {
    let value = value.ok_or_else(|| ConfigError::missing_field(field))?;
    url::Url::parse(value.expose())
        .map(|_| ())
        .map_err(|e| ConfigError::validation(field, format!("invalid URL: {e}")))
}

// =============================================================================
// Logging Configuration
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the filter directive for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parses a level name, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Compact single-line text.
    Compact,
    /// JSON lines.
    Json,
}

// =============================================================================
// Secret Value
// =============================================================================

/// A secret that never prints its contents.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretValue(String);

impl SecretValue {
    /// Creates a new secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the secret in clear text.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "***")
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretValue(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> FeedbackConfig {
        let mut config = FeedbackConfig::default();
        config.security.secret = Some(SecretValue::new("a".repeat(32)));
        config
    }

    #[test]
    fn test_defaults() {
        let config = FeedbackConfig::default();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.server.shutdown_timeout, Duration::from_secs(5));
        assert_eq!(config.security.token.default_ttl_minutes, 10);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.broker.topic, "feedbacks");
    }

    #[test]
    fn test_secret_required() {
        let config = FeedbackConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField { .. })
        ));
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_remote_backends_need_urls() {
        let mut config = valid_config();
        config.storage.backend = StorageBackend::Postgres;
        assert!(config.validate().is_err());
        config.storage.url = Some(SecretValue::new("postgres://u:p@localhost/feedback"));
        assert!(config.validate().is_ok());

        config.cache.backend = CacheBackend::Redis;
        config.cache.url = Some(SecretValue::new("not a url"));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { .. })
        ));
        config.cache.url = Some(SecretValue::new("redis://localhost:6379"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_token_ttl_bounds() {
        let mut config = valid_config();
        config.security.token.default_ttl_minutes = 0;
        assert!(config.validate().is_err());

        config.security.token.default_ttl_minutes = 2000;
        assert!(config.validate().is_err());

        config.security.token.max_ttl_minutes = 2000;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_secret_value_redacted() {
        let secret = SecretValue::new("hunter2");
        assert_eq!(secret.to_string(), "***");
        assert!(!format!("{secret:?}").contains("hunter2"));
        assert_eq!(secret.expose(), "hunter2");
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("debug"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("loud"), None);
        assert_eq!(LogLevel::Info.as_str(), "info");
    }
}
