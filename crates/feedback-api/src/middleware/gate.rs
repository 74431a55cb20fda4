// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authorization gate middleware.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{header, Request},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

use crate::auth::{AuthorizationGate, Operation};

// =============================================================================
// GateLayer
// =============================================================================

/// Layer that runs every request through the [`AuthorizationGate`].
///
/// On success the verified [`AuthClaims`](crate::auth::AuthClaims) are
/// inserted into the request extensions. On failure the request is answered
/// directly and the inner service never runs.
#[derive(Clone)]
pub struct GateLayer {
    gate: Arc<AuthorizationGate>,
}

impl GateLayer {
    /// Creates a new gate layer.
    pub fn new(gate: Arc<AuthorizationGate>) -> Self {
        Self { gate }
    }
}

impl<S> Layer<S> for GateLayer {
    type Service = GateMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GateMiddleware {
            inner,
            gate: self.gate.clone(),
        }
    }
}

// =============================================================================
// GateMiddleware
// =============================================================================

/// Middleware produced by [`GateLayer`].
#[derive(Clone)]
pub struct GateMiddleware<S> {
    inner: S,
    gate: Arc<AuthorizationGate>,
}

impl<S> Service<Request<Body>> for GateMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let operation = Operation::from_method(req.method());
        let verdict = self
            .gate
            .authorize(req.headers().get(header::AUTHORIZATION), operation);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            match verdict {
                Ok(claims) => {
                    req.extensions_mut().insert(claims);
                    inner.call(req).await
                }
                Err(e) => {
                    tracing::debug!(
                        error = %e,
                        step = e.step(),
                        path = %req.uri().path(),
                        "Request rejected by gate"
                    );
                    Ok(e.into_response())
                }
            }
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
