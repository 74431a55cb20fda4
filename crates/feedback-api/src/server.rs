// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Router assembly and the serve loop.
//!
//! Global layers, outermost first: request tracing, panic recovery, request
//! timeout, body limit. Per-route wrappers come from [`ROUTES`].

use std::any::Any;
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::handlers;
use crate::middleware::{CacheLayer, GateLayer};
use crate::state::AppState;

// =============================================================================
// Route Table
// =============================================================================

/// A registered route and its wrappers, outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteSpec {
    /// HTTP method.
    pub method: &'static str,
    /// Path pattern.
    pub path: &'static str,
    /// Wrappers, outermost first.
    pub wrappers: &'static [&'static str],
}

/// Every route the server registers.
pub const ROUTES: &[RouteSpec] = &[
    RouteSpec {
        method: "GET",
        path: "/status",
        wrappers: &[],
    },
    RouteSpec {
        method: "GET",
        path: "/token",
        wrappers: &[],
    },
    RouteSpec {
        method: "GET",
        path: "/feedbacks",
        wrappers: &["gate"],
    },
    RouteSpec {
        method: "GET",
        path: "/feedback/{id}",
        wrappers: &["gate", "cache"],
    },
    RouteSpec {
        method: "GET",
        path: "/p-feedbacks",
        wrappers: &["gate", "cache"],
    },
    RouteSpec {
        method: "POST",
        path: "/feedback",
        wrappers: &["gate"],
    },
];

// =============================================================================
// ApiServer
// =============================================================================

/// The API server.
pub struct ApiServer {
    state: AppState,
    config: Arc<ApiConfig>,
}

impl ApiServer {
    /// Creates a new API server with the given state.
    pub fn new(state: AppState) -> Self {
        let config = state.config.clone();
        Self { state, config }
    }

    /// Creates the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let gate = GateLayer::new(self.state.gate.clone());
        let cache = CacheLayer::new(self.state.cache.clone());

        let middleware_stack = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                self.config.request_timeout,
            ))
            .layer(DefaultBodyLimit::max(self.config.max_body_bytes));

        // Per-route layers: the last one added runs first.
        Router::new()
            .route("/status", get(handlers::status))
            .route("/token", get(handlers::issue_token))
            .route(
                "/feedbacks",
                get(handlers::list_feedbacks).route_layer(gate.clone()),
            )
            .route(
                "/feedback/{id}",
                get(handlers::get_feedback)
                    .route_layer(cache.clone())
                    .route_layer(gate.clone()),
            )
            .route(
                "/p-feedbacks",
                get(handlers::page_feedbacks)
                    .route_layer(cache)
                    .route_layer(gate.clone()),
            )
            .route("/feedback", post(handlers::create_feedback).route_layer(gate))
            .layer(middleware_stack)
            .with_state(self.state.clone())
    }

    /// Serves on an already bound listener.
    ///
    /// Once `shutdown_signal` resolves no new connections are accepted and
    /// in-flight requests get `shutdown_timeout` to finish. Whatever is still
    /// running after that is dropped.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown_signal: impl Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let grace = self.config.shutdown_timeout;
        let router = self.router();

        if let Ok(addr) = listener.local_addr() {
            info!("Starting API server on {}", addr);
        }
        log_routes();

        let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
        let signal = async move {
            shutdown_signal.await;
            info!(grace = ?grace, "Shutdown requested, draining in-flight requests");
            let _ = signalled_tx.send(());
        };

        let server = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(signal)
        .into_future();

        let deadline = async move {
            match signalled_rx.await {
                Ok(()) => tokio::time::sleep(grace).await,
                Err(_) => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            result = server => {
                result.map_err(|e| ApiError::internal(format!("Server error: {}", e)))?;
                info!("API server shutdown complete");
            }
            _ = deadline => {
                warn!(grace = ?grace, "Grace period elapsed, dropping in-flight requests");
            }
        }

        Ok(())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Logs every registered route.
fn log_routes() {
    for route in ROUTES {
        info!(
            method = route.method,
            path = route.path,
            wrappers = ?route.wrappers,
            "Route registered"
        );
    }
}

/// Turns a handler panic into a 500 with the usual error body.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "Handler panicked");

    ApiError::internal("internal server error").into_response()
}

// =============================================================================
// Tests
// =============================================================================
