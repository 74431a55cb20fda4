// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # feedback-config
//!
//! Configuration management for the feedback service.
//!
//! ## Features
//!
//! - **Schema Definition**: server, security, backends and logging, each with validation
//! - **Multi-Format Support**: YAML, TOML, and JSON configuration files
//! - **Environment Overrides**: `FEEDBACK_*` variables and `${VAR:default}` placeholders
//!
//! ## Quick Start
//!
//! ```no_run
//! use feedback_config::loader::load_config;
//!
//! let config = load_config("feedback.yaml").unwrap();
//! println!("Listening on {}", config.server.socket_addr());
//! ```
//!
//! ## Example File
//!
//! ```yaml
//! server:
//!   port: 8080
//!   shutdown_timeout: 5s
//! security:
//!   secret: ${FEEDBACK_SECRET}
//! storage:
//!   backend: postgres
//!   url: postgres://feedback@localhost/feedback
//! cache:
//!   backend: redis
//!   url: redis://localhost:6379
//!   ttl_secs: 60
//! broker:
//!   backend: redis
//!   url: redis://localhost:6379
//!   topic: feedbacks
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, load_config_str, ConfigFormat, ConfigLoader};
pub use schema::{
    BrokerBackend, BrokerConfig, CacheBackend, CacheConfig, FeedbackConfig, LogFormat, LogLevel,
    LoggingConfig, SecretValue, SecurityConfig, ServerConfig, StorageBackend, StorageConfig,
    TokenConfig,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{ConfigError, ConfigResult};
    pub use crate::loader::{load_config, ConfigFormat, ConfigLoader};
    pub use crate::schema::FeedbackConfig;
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
