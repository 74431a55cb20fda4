// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Harness
//!
//! Runs the real router in-process over mock capabilities, so suites can
//! drive HTTP requests and then inspect what reached each backend.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tower::ServiceExt;

use feedback_api::{ApiConfig, ApiServer, AppState, CreatedResponse, Role, SigningKeys, TokenIssuer};
use feedback_config::TokenConfig;
use feedback_core::{FeedbackId, FeedbackInput, FeedbackService};

use super::fixtures::{OTHER_SECRET, TEST_SECRET};
use super::mocks::{MockCache, MockPublisher, MockStore};

// =============================================================================
// TestApp
// =============================================================================

/// An in-process feedback service.
pub struct TestApp {
    /// The full router, middleware included.
    pub router: Router,
    /// Storage double.
    pub store: Arc<MockStore>,
    /// Broker double.
    pub publisher: Arc<MockPublisher>,
    /// Cache double.
    pub cache: Arc<MockCache>,
    /// Issuer sharing the router's secret.
    pub issuer: TokenIssuer,
}

impl TestApp {
    /// Creates an app over fresh, healthy doubles.
    pub fn new() -> Self {
        TestAppBuilder::new().build()
    }

    /// Creates a builder.
    pub fn builder() -> TestAppBuilder {
        TestAppBuilder::new()
    }

    /// A valid `Authorization` value for `role`.
    pub fn token(&self, role: Role) -> String {
        let token = self
            .issuer
            .issue(role, 10)
            .expect("Failed to issue test token");
        format!("Bearer {token}")
    }

    /// An `Authorization` value that expired a minute ago.
    pub fn expired_token(&self, role: Role) -> String {
        let issued_at: DateTime<Utc> = Utc::now() - chrono::Duration::minutes(2);
        let token = self
            .issuer
            .issue_at(role, 1, issued_at)
            .expect("Failed to issue test token");
        format!("Bearer {token}")
    }

    /// An `Authorization` value signed with a different secret.
    pub fn foreign_token(&self, role: Role) -> String {
        let keys = Arc::new(SigningKeys::from_secret(OTHER_SECRET).expect("valid secret"));
        let token = TokenIssuer::new(keys, 10, 60)
            .issue(role, 10)
            .expect("Failed to issue test token");
        format!("Bearer {token}")
    }

    /// Sends a request through the router.
    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Sends a GET with an optional `Authorization` value.
    pub async fn get(&self, uri: &str, auth: Option<&str>) -> TestResponse {
        self.request(build_request(Method::GET, uri, auth, Body::empty()))
            .await
    }

    /// Sends a POST with a raw JSON body.
    pub async fn post_json(&self, uri: &str, auth: Option<&str>, body: &str) -> TestResponse {
        self.request(build_request(
            Method::POST,
            uri,
            auth,
            Body::from(body.to_string()),
        ))
        .await
    }

    /// Creates a record over HTTP with an unrestricted token.
    pub async fn create(&self, input: &FeedbackInput) -> FeedbackId {
        let body = serde_json::to_string(input).expect("input serializes");
        let auth = self.token(Role::Unrestricted);
        let response = self.post_json("/feedback", Some(&auth), &body).await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "create failed: {}",
            response.text()
        );
        response.json::<CreatedResponse>().id
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

fn build_request(method: Method, uri: &str, auth: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .expect("Failed to build request")
}

// =============================================================================
// TestAppBuilder
// =============================================================================

/// Builder for [`TestApp`].
pub struct TestAppBuilder {
    store: Arc<MockStore>,
    publisher: Arc<MockPublisher>,
    cache: Arc<MockCache>,
    token: TokenConfig,
}

impl TestAppBuilder {
    /// Creates a builder with healthy doubles.
    pub fn new() -> Self {
        Self {
            store: Arc::new(MockStore::new()),
            publisher: Arc::new(MockPublisher::new()),
            cache: Arc::new(MockCache::new()),
            token: TokenConfig::default(),
        }
    }

    /// Uses the given store.
    pub fn store(mut self, store: Arc<MockStore>) -> Self {
        self.store = store;
        self
    }

    /// Uses the given publisher.
    pub fn publisher(mut self, publisher: Arc<MockPublisher>) -> Self {
        self.publisher = publisher;
        self
    }

    /// Uses the given cache.
    pub fn cache(mut self, cache: Arc<MockCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Uses the given token limits.
    pub fn token_config(mut self, token: TokenConfig) -> Self {
        self.token = token;
        self
    }

    /// Builds the app.
    pub fn build(self) -> TestApp {
        let service = FeedbackService::new(self.store.clone(), self.publisher.clone());
        let state = AppState::builder()
            .config(ApiConfig::default())
            .service(service)
            .cache(self.cache.clone())
            .secret(TEST_SECRET)
            .token_config(self.token.clone())
            .build()
            .expect("Failed to build app state");

        let keys = Arc::new(SigningKeys::from_secret(TEST_SECRET).expect("valid secret"));

        TestApp {
            router: ApiServer::new(state).router(),
            store: self.store,
            publisher: self.publisher,
            cache: self.cache,
            issuer: TokenIssuer::from_config(keys, &self.token),
        }
    }
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TestResponse
// =============================================================================

/// A fully buffered response.
#[derive(Debug)]
pub struct TestResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Bytes,
}

impl TestResponse {
    /// The body as UTF-8 text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// The body decoded as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body)
            .unwrap_or_else(|e| panic!("body is not the expected JSON ({e}): {}", self.text()))
    }

    /// The `error` field of an error body.
    pub fn error_message(&self) -> String {
        let body: serde_json::Value = self.json();
        body["error"]
            .as_str()
            .unwrap_or_else(|| panic!("no error field in {}", self.text()))
            .to_string()
    }

    /// A header value as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
