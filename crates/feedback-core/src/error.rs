// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error hierarchy for the feedback domain.
//!
//! ```text
//! FeedbackError (root)
//! ├── InvalidParameter - malformed client input (bad id, bad limit, ...)
//! ├── Validation       - semantically invalid feedback fields
//! ├── NotFound         - no record with the requested id
//! ├── Storage          - storage capability failure
//! ├── Publish          - broker capability failure
//! └── Cache            - cache capability failure
//! ```

use std::fmt;
use thiserror::Error;

// =============================================================================
// FeedbackError - Root Error Type
// =============================================================================

/// The root error type for feedback operations.
#[derive(Debug, Error)]
pub enum FeedbackError {
    /// A request parameter was missing or malformed.
    #[error("{message}")]
    InvalidParameter {
        /// Error message.
        message: String,
    },

    /// One or more feedback fields failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// The requested record does not exist.
    #[error("feedback '{id}' not found")]
    NotFound {
        /// The requested identifier.
        id: String,
    },

    /// Storage capability error.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Broker capability error.
    #[error(transparent)]
    Publish(#[from] PublishError),

    /// Cache capability error.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl FeedbackError {
    /// Creates an invalid-parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(id: impl fmt::Display) -> Self {
        Self::NotFound { id: id.to_string() }
    }

    /// Returns `true` if the error was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter { .. } | Self::Validation(_) | Self::NotFound { .. }
        )
    }

    /// Returns the error type as a string for logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidParameter { .. } => "invalid_parameter",
            Self::Validation(_) => "validation",
            Self::NotFound { .. } => "not_found",
            Self::Storage(_) => "storage",
            Self::Publish(_) => "publish",
            Self::Cache(_) => "cache",
        }
    }
}

// =============================================================================
// Validation
// =============================================================================

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Wire name of the field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All field errors found in one input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a field error.
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Returns `true` if no errors were recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the recorded errors.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Returns `true` if `field` has an error.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Converts to `Err(self)` when any error was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid feedback: ")?;
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

// =============================================================================
// Capability Errors
// =============================================================================

/// Storage capability errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The database rejected or failed a query.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The backend is unavailable.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Cache capability errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Redis command failed.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The backend is unavailable.
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

/// Broker capability errors.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The record could not be encoded.
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    /// Redis command failed.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The topic has been closed.
    #[error("topic '{topic}' is closed")]
    Closed {
        /// Topic name.
        topic: String,
    },

    /// The backend is unavailable.
    #[error("broker unavailable: {0}")]
    Unavailable(String),
}

// =============================================================================
// Result Aliases
// =============================================================================

/// Result type for feedback operations.
pub type FeedbackResult<T> = Result<T, FeedbackError>;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Result type for publish operations.
pub type PublishResult<T> = Result<T, PublishError>;
