// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API error types and handling.
//!
//! Every error renders as `{"error": "<message>"}` with the status below.
//!
//! | Error              | Status |
//! |--------------------|--------|
//! | `InvalidParameter` | 400    |
//! | `Validation`       | 400    |
//! | `Unauthorized`     | 401    |
//! | `Forbidden`        | 401    |
//! | `NotFound`         | 404    |
//! | `Dependency`       | 500    |
//! | `Internal`         | 500    |

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use feedback_core::FeedbackError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// ApiError
// =============================================================================

/// API error type with HTTP status code mapping.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing client input (400).
    #[error("{message}")]
    InvalidParameter {
        /// Error message.
        message: String,
    },

    /// Semantically invalid feedback fields (400).
    #[error("{message}")]
    Validation {
        /// Error message.
        message: String,
    },

    /// Missing, invalid or expired credential (401).
    #[error("{message}")]
    Unauthorized {
        /// Error message.
        message: String,
    },

    /// Valid credential with insufficient role (401).
    #[error("{message}")]
    Forbidden {
        /// Error message.
        message: String,
    },

    /// Resource not found (404).
    #[error("{message}")]
    NotFound {
        /// Error message.
        message: String,
    },

    /// A storage, broker or cache call failed (500).
    #[error("{message}")]
    Dependency {
        /// Which capability failed.
        capability: &'static str,
        /// Error message.
        message: String,
    },

    /// Internal server error (500).
    #[error("{message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl ApiError {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates an invalid parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a dependency failure.
    pub fn dependency(capability: &'static str, message: impl Into<String>) -> Self {
        Self::Dependency {
            capability,
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidParameter { .. } | ApiError::Validation { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized { .. } | ApiError::Forbidden { .. } => StatusCode::UNAUTHORIZED,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Dependency { .. } | ApiError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for categorization.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidParameter { .. } => "INVALID_PARAMETER",
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized { .. } => "UNAUTHORIZED",
            ApiError::Forbidden { .. } => "FORBIDDEN",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::Dependency { .. } => "DEPENDENCY_ERROR",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns `true` if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Returns `true` if the caller's input or credential caused the error.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if self.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Server error occurred"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Client error occurred"
            );
        }

        let body = ErrorBody {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Error Response Body
// =============================================================================

/// Error response body: `{"error": "<message>"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
}

// =============================================================================
// From Implementations
// =============================================================================

impl From<FeedbackError> for ApiError {
    fn from(err: FeedbackError) -> Self {
        match err {
            FeedbackError::InvalidParameter { message } => ApiError::invalid_parameter(message),
            FeedbackError::Validation(errors) => ApiError::validation(errors.to_string()),
            FeedbackError::NotFound { .. } => ApiError::not_found(err.to_string()),
            FeedbackError::Storage(e) => ApiError::dependency("storage", e.to_string()),
            FeedbackError::Publish(e) => ApiError::dependency("broker", e.to_string()),
            FeedbackError::Cache(e) => ApiError::dependency("cache", e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_parameter(format!("invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::invalid_parameter(format!("invalid query: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::invalid_parameter(format!("invalid path: {}", rejection.body_text()))
    }
}

// =============================================================================
// Tests
// =============================================================================
