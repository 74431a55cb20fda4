// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading.
//!
//! A document goes through the same steps whether it comes from a file or a
//! string:
//!
//! 1. Expand `${VAR}` and `${VAR:fallback}` in the raw text
//! 2. Deserialize into [`FeedbackConfig`] (YAML, TOML or JSON)
//! 3. Apply `FEEDBACK_*` overrides
//! 4. Validate
//!
//! Steps 1 and 3 are skipped when the loader is built with
//! [`ConfigLoader::with_env_vars(false)`](ConfigLoader::with_env_vars).
//!
//! # Overrides
//!
//! | Variable                  | Effect                                  |
//! |---------------------------|-----------------------------------------|
//! | `FEEDBACK_SERVER_HOST`    | `server.host`                           |
//! | `FEEDBACK_SERVER_PORT`    | `server.port`                           |
//! | `FEEDBACK_SECRET`         | `security.secret`                       |
//! | `FEEDBACK_DATABASE_URL`   | `storage.url`, backend set to postgres  |
//! | `FEEDBACK_CACHE_URL`      | `cache.url`, backend set to redis       |
//! | `FEEDBACK_CACHE_TTL_SECS` | `cache.ttl_secs`                        |
//! | `FEEDBACK_BROKER_URL`     | `broker.url`, backend set to redis      |
//! | `FEEDBACK_BROKER_TOPIC`   | `broker.topic`                          |
//! | `FEEDBACK_LOG_LEVEL`      | `logging.level`                         |

use std::borrow::Cow;
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult, INLINE_SOURCE};
use crate::schema::{
    BrokerBackend, CacheBackend, FeedbackConfig, LogLevel, SecretValue, StorageBackend,
};

/// Default environment variable prefix.
pub const DEFAULT_ENV_PREFIX: &str = "FEEDBACK";

/// `${NAME}` or `${NAME:fallback}`.
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::([^}]*))?\}").expect("placeholder regex is valid")
});

// =============================================================================
// ConfigFormat
// =============================================================================

/// Document formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.yaml` / `.yml`, read through the `config` crate.
    Yaml,
    /// `.toml`
    Toml,
    /// `.json`
    Json,
}

impl ConfigFormat {
    /// Picks the format from the file extension, case-insensitively.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Err(ConfigError::unsupported_format("(no extension)"));
        };

        match ext.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::unsupported_format(other)),
        }
    }

    fn parse<T: DeserializeOwned>(self, content: &str, source: &Path) -> ConfigResult<T> {
        let parsed: Result<T, String> = match self {
            Self::Yaml => config::Config::builder()
                .add_source(config::File::from_str(content, config::FileFormat::Yaml))
                .build()
                .and_then(|c| c.try_deserialize())
                .map_err(|e| e.to_string()),
            Self::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| ConfigError::parse(source, message))
    }
}

// =============================================================================
// ConfigLoader
// =============================================================================

/// Reads, overrides and validates a [`FeedbackConfig`].
///
/// ```no_run
/// use feedback_config::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .with_env_prefix("FEEDBACK_STAGING")
///     .load("feedback.yaml")
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    env_prefix: String,
    use_env: bool,
}

impl ConfigLoader {
    /// A loader using the `FEEDBACK` prefix with the environment enabled.
    pub fn new() -> Self {
        Self {
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            use_env: true,
        }
    }

    /// Uses `prefix` instead of `FEEDBACK` for overrides.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Turns placeholder expansion and overrides on or off.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.use_env = enabled;
        self
    }

    /// Loads a file; the format follows its extension.
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<FeedbackConfig> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }
        let format = ConfigFormat::from_path(path)?;
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;

        let config = self.load_text(&raw, format, path)?;
        info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Loads an in-memory document.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<FeedbackConfig> {
        self.load_text(content, format, Path::new(INLINE_SOURCE))
    }

    /// Starts from defaults and applies only the environment.
    pub fn load_defaults(&self) -> ConfigResult<FeedbackConfig> {
        let mut config = FeedbackConfig::default();
        self.finish(&mut config)?;
        Ok(config)
    }

    fn load_text(
        &self,
        raw: &str,
        format: ConfigFormat,
        source: &Path,
    ) -> ConfigResult<FeedbackConfig> {
        let text = if self.use_env {
            expand_placeholders(raw)
        } else {
            Cow::Borrowed(raw)
        };

        let mut config: FeedbackConfig = format.parse(&text, source)?;
        self.finish(&mut config)?;
        Ok(config)
    }

    fn finish(&self, config: &mut FeedbackConfig) -> ConfigResult<()> {
        if self.use_env {
            self.apply_overrides(config)?;
        }
        config.validate()?;

        debug!(
            storage = ?config.storage.backend,
            cache = ?config.cache.backend,
            broker = ?config.broker.backend,
            "Configuration validated"
        );
        Ok(())
    }

    /// Looks up `<prefix>_<suffix>`, returning the full name with the value.
    fn lookup(&self, suffix: &str) -> Option<(String, String)> {
        let name = format!("{}_{}", self.env_prefix, suffix);
        env::var(&name).ok().map(|value| (name, value))
    }

    fn apply_overrides(&self, config: &mut FeedbackConfig) -> ConfigResult<()> {
        if let Some((name, value)) = self.lookup("SERVER_HOST") {
            config.server.host = parse_override(&name, &value, "expected an IP address")?;
        }
        if let Some((name, value)) = self.lookup("SERVER_PORT") {
            config.server.port = parse_override(&name, &value, "expected a port number")?;
        }
        if let Some((_, value)) = self.lookup("SECRET") {
            config.security.secret = Some(SecretValue::new(value));
        }

        if let Some((_, value)) = self.lookup("DATABASE_URL") {
            config.storage.backend = StorageBackend::Postgres;
            config.storage.url = Some(SecretValue::new(value));
        }
        if let Some((_, value)) = self.lookup("CACHE_URL") {
            config.cache.backend = CacheBackend::Redis;
            config.cache.url = Some(SecretValue::new(value));
        }
        if let Some((name, value)) = self.lookup("CACHE_TTL_SECS") {
            config.cache.ttl_secs = parse_override(&name, &value, "expected a number of seconds")?;
        }
        if let Some((_, value)) = self.lookup("BROKER_URL") {
            config.broker.backend = BrokerBackend::Redis;
            config.broker.url = Some(SecretValue::new(value));
        }
        if let Some((_, value)) = self.lookup("BROKER_TOPIC") {
            config.broker.topic = value;
        }

        if let Some((name, value)) = self.lookup("LOG_LEVEL") {
            config.logging.level = LogLevel::parse(&value)
                .ok_or_else(|| ConfigError::invalid_env_var(name, "expected a log level"))?;
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Replaces every placeholder whose variable is set or which has a fallback.
/// Anything else is left verbatim.
fn expand_placeholders(raw: &str) -> Cow<'_, str> {
    PLACEHOLDER.replace_all(raw, |caps: &Captures<'_>| {
        let name = &caps[1];
        match (env::var(name), caps.get(2)) {
            (Ok(value), _) => value,
            (Err(_), Some(fallback)) => fallback.as_str().to_string(),
            (Err(_), None) => {
                warn!(variable = name, "Placeholder refers to an unset variable");
                caps[0].to_string()
            }
        }
    })
}

fn parse_override<T: FromStr>(name: &str, value: &str, expected: &str) -> ConfigResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid_env_var(name, expected))
}

/// Loads a file with the default loader.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<FeedbackConfig> {
    ConfigLoader::new().load(path)
}

/// Loads an in-memory document with the default loader.
pub fn load_config_str(content: &str, format: ConfigFormat) -> ConfigResult<FeedbackConfig> {
    ConfigLoader::new().load_from_str(content, format)
}

// =============================================================================
// Tests
// =============================================================================
