// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the `feedback` binary.
//!
//! Every failure maps to a process exit code:
//!
//! | Code | Meaning                                   |
//! |------|-------------------------------------------|
//! | 1    | configuration missing or invalid          |
//! | 2    | listener or backend could not start       |
//! | 3    | the server failed while running           |
//! | 4    | local I/O (stdout, files)                 |
//! | 5    | a request-level error surfaced offline    |

use std::net::SocketAddr;

use thiserror::Error;

/// Exit code for configuration failures.
pub const EXIT_CONFIG: i32 = 1;
/// Exit code for startup failures.
pub const EXIT_STARTUP: i32 = 2;
/// Exit code for failures while serving.
pub const EXIT_SERVE: i32 = 3;
/// Exit code for local I/O failures.
pub const EXIT_IO: i32 = 4;
/// Exit code for request-level errors raised by offline commands.
pub const EXIT_REQUEST: i32 = 5;

/// Result type alias for binary operations.
pub type BinResult<T> = Result<T, BinError>;

/// Errors surfaced by the `feedback` binary.
#[derive(Debug, Error)]
pub enum BinError {
    /// The configuration is incomplete for the requested command.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The configuration file could not be loaded.
    #[error(transparent)]
    Config(#[from] feedback_config::ConfigError),

    /// The listen address could not be bound.
    #[error("cannot listen on {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: SocketAddr,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A storage, cache or broker backend could not be reached.
    #[error("{backend} backend unavailable: {message}")]
    Backend {
        /// `storage`, `cache` or `broker`.
        backend: &'static str,
        /// Connection error.
        message: String,
    },

    /// The HTTP layer failed, or an offline command hit a request error.
    #[error(transparent)]
    Api(#[from] feedback_api::ApiError),

    /// A domain operation failed.
    #[error(transparent)]
    Core(#[from] feedback_core::FeedbackError),

    /// The server stopped abnormally.
    #[error("server error: {0}")]
    Serve(String),

    /// Writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error with a description of what was being attempted.
    #[error("{context}: {source}")]
    WithContext {
        /// What was being attempted.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<BinError>,
    },
}

impl BinError {
    /// A configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// A backend connection error.
    pub fn backend(backend: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Backend {
            backend,
            message: err.to_string(),
        }
    }

    /// A server failure.
    pub fn serve(msg: impl Into<String>) -> Self {
        Self::Serve(msg.into())
    }

    /// Wraps the error with a description of the attempted action.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the process exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) | Self::Config(_) => EXIT_CONFIG,
            Self::Bind { .. } | Self::Backend { .. } => EXIT_STARTUP,
            Self::Serve(_) => EXIT_SERVE,
            Self::Api(e) if e.is_client_error() => EXIT_REQUEST,
            Self::Api(_) => EXIT_SERVE,
            Self::Core(e) if e.is_client_error() => EXIT_REQUEST,
            Self::Core(_) => EXIT_SERVE,
            Self::Io(_) => EXIT_IO,
            Self::WithContext { source, .. } => source.exit_code(),
        }
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

/// Prints the error and its cause chain on stderr.
pub fn report_error(error: &BinError) {
    eprintln!("Error: {}", error);

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  Caused by: {}", cause);
        source = cause.source();
    }
}

/// Reports the error and exits with its code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}
