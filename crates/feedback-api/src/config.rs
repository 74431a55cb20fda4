// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Router-wide HTTP limits.
//!
//! The listen address is not here: callers bind their own listener and hand
//! it to [`ApiServer::serve`](crate::ApiServer::serve).

use std::time::Duration;

use feedback_config::schema::{DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SHUTDOWN_TIMEOUT_SECS};
use feedback_config::ServerConfig;
use serde::{Deserialize, Serialize};

/// Largest accepted request body. Feedback submissions are small JSON objects.
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

/// Limits applied by the router and the server loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Requests still running after this get `408`.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// How long in-flight requests may run once shutdown starts.
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
    /// Body size limit in bytes.
    pub max_body_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ApiConfig {
    /// Takes the timeouts from the `server` section.
    pub fn from_server(server: &ServerConfig) -> Self {
        Self {
            request_timeout: server.request_timeout,
            shutdown_timeout: server.shutdown_timeout,
            ..Self::default()
        }
    }

    /// Sets the shutdown grace period.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}
