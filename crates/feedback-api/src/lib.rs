// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # feedback-api
//!
//! HTTP surface of the feedback service.
//!
//! This crate provides the route table, the bearer credential gate, the
//! per-route response cache and the server with bounded graceful shutdown.
//!
//! ## Routes
//!
//! | Verb | Path             | Wrappers    |
//! |------|------------------|-------------|
//! | GET  | `/status`        |             |
//! | GET  | `/token`         |             |
//! | GET  | `/feedbacks`     | gate        |
//! | GET  | `/feedback/{id}` | gate, cache |
//! | GET  | `/p-feedbacks`   | gate, cache |
//! | POST | `/feedback`      | gate        |

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod state;

pub use auth::{AuthClaims, AuthorizationGate, GateError, Operation, Role, SigningKeys, TokenIssuer};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorBody};
pub use handlers::{CreatedResponse, CURSOR_NEXT};
pub use middleware::{CacheLayer, GateLayer, CACHE_HIT, CACHE_MISS, X_CACHE};
pub use server::{ApiServer, RouteSpec, ROUTES};
pub use state::{AppState, AppStateBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
