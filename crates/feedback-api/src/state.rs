// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use feedback_config::TokenConfig;
use feedback_core::{FeedbackService, MemoryCache, ResponseCache};

use crate::auth::{AuthorizationGate, SigningKeys, TokenIssuer};
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
///
/// The signing secret enters once, through the builder, and is held only by
/// the issuer and the gate.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Feedback orchestrator.
    pub service: FeedbackService,
    /// Response cache used by cache-wrapped routes.
    pub cache: Arc<dyn ResponseCache>,
    /// Token issuer.
    pub issuer: Arc<TokenIssuer>,
    /// Authorization gate.
    pub gate: Arc<AuthorizationGate>,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Returns the feedback service.
    pub fn service(&self) -> &FeedbackService {
        &self.service
    }

    /// Returns the token issuer.
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Returns the authorization gate.
    pub fn gate(&self) -> &Arc<AuthorizationGate> {
        &self.gate
    }

    /// Returns the response cache.
    pub fn cache(&self) -> &Arc<dyn ResponseCache> {
        &self.cache
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("store", &self.service.store().name())
            .field("cache", &self.cache.name())
            .field("topic", &self.service.publisher().topic())
            .finish()
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing AppState.
pub struct AppStateBuilder {
    config: Option<ApiConfig>,
    service: Option<FeedbackService>,
    cache: Option<Arc<dyn ResponseCache>>,
    secret: Option<String>,
    token: TokenConfig,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config: None,
            service: None,
            cache: None,
            secret: None,
            token: TokenConfig::default(),
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the feedback service.
    pub fn service(mut self, service: FeedbackService) -> Self {
        self.service = Some(service);
        self
    }

    /// Sets the response cache.
    pub fn cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Sets the signing secret.
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Sets token issuance bounds.
    pub fn token_config(mut self, token: TokenConfig) -> Self {
        self.token = token;
        self
    }

    /// Builds the AppState.
    ///
    /// Fails if the service or the secret is missing. Without an explicit
    /// cache an in-memory one with a 60 second TTL is used.
    pub fn build(self) -> ApiResult<AppState> {
        let config = self.config.unwrap_or_default();

        let service = self
            .service
            .ok_or_else(|| ApiError::internal("feedback service is not configured"))?;

        let secret = self
            .secret
            .ok_or_else(|| ApiError::internal("signing secret is not configured"))?;
        let keys = Arc::new(SigningKeys::from_secret(&secret)?);

        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(MemoryCache::new(Duration::from_secs(60))));

        Ok(AppState {
            config: Arc::new(config),
            service,
            cache,
            issuer: Arc::new(TokenIssuer::from_config(keys.clone(), &self.token)),
            gate: Arc::new(AuthorizationGate::new(keys)),
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// FromRef implementations for extracting parts of state
// =============================================================================

impl axum::extract::FromRef<AppState> for Arc<TokenIssuer> {
    fn from_ref(state: &AppState) -> Self {
        state.issuer.clone()
    }
}

impl axum::extract::FromRef<AppState> for FeedbackService {
    fn from_ref(state: &AppState) -> Self {
        state.service.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<ApiConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================
