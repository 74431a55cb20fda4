// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Errors raised while reading, parsing and checking a service configuration.
//!
//! ```text
//! ConfigError
//! ├── FileNotFound / Io   - the file could not be read
//! ├── UnsupportedFormat   - unknown extension
//! ├── Parse               - the text does not match the schema
//! ├── InvalidEnvVar       - a FEEDBACK_* override could not be parsed
//! ├── MissingField        - a required value is absent (e.g. the secret)
//! └── Validation          - a value is present but unusable
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Source name used for configuration parsed from memory.
pub const INLINE_SOURCE: &str = "<inline>";

/// A configuration failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("config file not found: {}", path.display())]
    FileNotFound {
        /// Requested path.
        path: PathBuf,
    },

    /// The configuration file exists but could not be read.
    #[error("cannot read config file {}: {source}", path.display())]
    Io {
        /// Requested path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file extension names no supported format.
    #[error("unsupported config format '{format}' (expected yaml, yml, toml or json)")]
    UnsupportedFormat {
        /// The extension, or a marker when there was none.
        format: String,
    },

    /// The content could not be deserialized.
    #[error("cannot parse {}: {message}", source_name.display())]
    Parse {
        /// File path, or [`INLINE_SOURCE`].
        source_name: PathBuf,
        /// Deserializer message.
        message: String,
    },

    /// An environment override holds an unusable value.
    #[error("environment variable {name}: {message}")]
    InvalidEnvVar {
        /// Full variable name.
        name: String,
        /// What was expected.
        message: String,
    },

    /// A required value is absent.
    #[error("missing required setting '{field}'")]
    MissingField {
        /// Dotted setting path.
        field: String,
    },

    /// A value failed validation.
    #[error("invalid setting '{field}': {message}")]
    Validation {
        /// Dotted setting path.
        field: String,
        /// What is wrong with it.
        message: String,
    },
}

impl ConfigError {
    /// A file-not-found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// A read error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// An unsupported-format error.
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// A parse error attributed to `source_name`.
    pub fn parse(source_name: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    /// A parse error for in-memory content.
    pub fn parse_inline(message: impl ToString) -> Self {
        Self::parse(INLINE_SOURCE, message)
    }

    /// An invalid-override error.
    pub fn invalid_env_var(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            message: message.into(),
        }
    }

    /// A missing-setting error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField { field: field.into() }
    }

    /// A validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns `true` when the file itself could not be read.
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::FileNotFound { .. } | Self::Io { .. })
    }

    /// Returns `true` when the content was read but rejected.
    pub fn is_content_error(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. } | Self::MissingField { .. } | Self::Validation { .. }
        )
    }

    /// Short label for log fields.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::FileNotFound { .. } => "file_not_found",
            Self::Io { .. } => "io",
            Self::UnsupportedFormat { .. } => "unsupported_format",
            Self::Parse { .. } => "parse",
            Self::InvalidEnvVar { .. } => "invalid_env_var",
            Self::MissingField { .. } => "missing_field",
            Self::Validation { .. } => "validation",
        }
    }
}

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
