// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Response cache middleware.
//!
//! GET requests are keyed by path and query. A hit is answered from the cache
//! with `X-Cache: Cached`; a miss runs the inner service, stores a successful
//! body, and answers with `X-Cache: None`. Other methods pass straight through.
//!
//! Entries hold the body together with the response headers a client needs
//! to keep walking (the pagination cursor), so a hit answers exactly like
//! the miss that filled it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use feedback_core::{FeedbackError, ResponseCache};
use serde::{Deserialize, Serialize};
use tower::{Layer, Service};

use crate::error::ApiError;
use crate::handlers::CURSOR_NEXT;

/// Cache marker header.
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// `X-Cache` value on a hit.
pub const CACHE_HIT: &str = "Cached";

/// `X-Cache` value on a miss.
pub const CACHE_MISS: &str = "None";

/// Response headers stored alongside a cached body.
const REPLAYED_HEADERS: [HeaderName; 1] = [CURSOR_NEXT];

// =============================================================================
// CacheLayer
// =============================================================================

/// Layer that serves GET responses from a [`ResponseCache`].
#[derive(Clone)]
pub struct CacheLayer {
    cache: Arc<dyn ResponseCache>,
}

impl CacheLayer {
    /// Creates a new cache layer.
    pub fn new(cache: Arc<dyn ResponseCache>) -> Self {
        Self { cache }
    }
}

impl<S> Layer<S> for CacheLayer {
    type Service = CacheMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CacheMiddleware {
            inner,
            cache: self.cache.clone(),
        }
    }
}

// =============================================================================
// CacheMiddleware
// =============================================================================

/// Middleware produced by [`CacheLayer`].
#[derive(Clone)]
pub struct CacheMiddleware<S> {
    inner: S,
    cache: Arc<dyn ResponseCache>,
}

impl<S> Service<Request<Body>> for CacheMiddleware<S>
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

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();

        if req.method() != Method::GET {
            return Box::pin(async move { inner.call(req).await });
        }

        let cache = self.cache.clone();
        let key = cache_key(&req);

        Box::pin(async move {
            match cache.get(&key).await {
                Ok(Some(raw)) => match CachedEntry::decode(&raw) {
                    Some(entry) => {
                        tracing::debug!(key = %key, "Cache hit");
                        return Ok(entry.into_response());
                    }
                    None => {
                        tracing::warn!(key = %key, "Discarding unreadable cache entry");
                    }
                },
                Ok(None) => {
                    tracing::debug!(key = %key, "Cache miss");
                }
                Err(e) => {
                    return Ok(ApiError::from(FeedbackError::from(e)).into_response());
                }
            }

            let response = inner.call(req).await?;
            if !response.status().is_success() {
                return Ok(mark(response, CACHE_MISS));
            }

            let (parts, body) = response.into_parts();
            let body = match axum::body::to_bytes(body, usize::MAX).await {
                Ok(body) => body,
                Err(e) => {
                    return Ok(ApiError::internal(format!("failed to read response body: {}", e))
                        .into_response())
                }
            };

            match CachedEntry::capture(&parts.headers, &body) {
                Some(entry) => {
                    if let Err(e) = cache.set(&key, entry.encode()).await {
                        tracing::warn!(key = %key, error = %e, "Failed to store cached response");
                    }
                }
                None => tracing::debug!(key = %key, "Response not cacheable"),
            }

            Ok(mark(Response::from_parts(parts, Body::from(body)), CACHE_MISS))
        })
    }
}

// =============================================================================
// CachedEntry
// =============================================================================

/// Stored form of a successful response.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct CachedEntry {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    headers: Vec<(String, String)>,
    body: String,
}

impl CachedEntry {
    /// Returns `None` when the body is not text or a replayed header is not
    /// visible ASCII.
    fn capture(headers: &HeaderMap, body: &Bytes) -> Option<Self> {
        let body = std::str::from_utf8(body).ok()?.to_string();
        let mut kept = Vec::new();
        for name in REPLAYED_HEADERS.iter() {
            if let Some(value) = headers.get(name) {
                kept.push((name.as_str().to_string(), value.to_str().ok()?.to_string()));
            }
        }
        Some(Self {
            headers: kept,
            body,
        })
    }

    fn encode(&self) -> Bytes {
        // A struct of strings always serializes.
        Bytes::from(serde_json::to_vec(self).unwrap_or_default())
    }

    fn decode(raw: &[u8]) -> Option<Self> {
        serde_json::from_slice(raw).ok()
    }

    fn into_response(self) -> Response {
        let mut response = (StatusCode::OK, self.body).into_response();
        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        for (name, value) in self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::try_from(name),
                HeaderValue::try_from(value),
            ) {
                headers.insert(name, value);
            }
        }
        mark(response, CACHE_HIT)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Path plus query string.
fn cache_key<B>(req: &Request<B>) -> String {
    req.uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string())
}

fn mark(mut response: Response, value: &'static str) -> Response {
    response
        .headers_mut()
        .insert(X_CACHE, HeaderValue::from_static(value));
    response
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use feedback_core::{CacheError, CacheResult, MemoryCache};
    use http_body_util::BodyExt;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tower::util::BoxCloneService;
    use tower::ServiceExt;

    struct BrokenCache {
        fail_get: bool,
    }

    #[async_trait]
    impl ResponseCache for BrokenCache {
        async fn get(&self, _key: &str) -> CacheResult<Option<Bytes>> {
            if self.fail_get {
                Err(CacheError::Unavailable("get refused".into()))
            } else {
                Ok(None)
            }
        }

        async fn set(&self, _key: &str, _value: Bytes) -> CacheResult<()> {
            Err(CacheError::Unavailable("set refused".into()))
        }

        fn name(&self) -> &'static str {
            "broken"
        }
    }

    fn counting_service(
        calls: Arc<AtomicUsize>,
        status: StatusCode,
    ) -> BoxCloneService<Request<Body>, Response, Infallible> {
        BoxCloneService::new(tower::service_fn(move |_req: Request<Body>| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok((status, format!("{{\"n\":{}}}", n)).into_response()) }
        }))
    }

    async fn body_of(response: Response) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_second_get_is_served_from_cache() {
        let cache = Arc::new(MemoryCache::new(Duration::from_secs(60)));
        let calls = Arc::new(AtomicUsize::new(0));
        let service = CacheLayer::new(cache.clone()).layer(counting_service(calls.clone(), StatusCode::OK));

        let first = service.clone().oneshot(get("/feedback/1")).await.unwrap();
        assert_eq!(first.headers()[X_CACHE], CACHE_MISS);
        let first_body = body_of(first).await;

        let second = service.clone().oneshot(get("/feedback/1")).await.unwrap();
        assert_eq!(second.headers()[X_CACHE], CACHE_HIT);
        assert_eq!(second.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(body_of(second).await, first_body);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_hit_replays_cursor_header() {
        let cache = Arc::new(MemoryCache::new(Duration::from_secs(60)));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let inner = BoxCloneService::new(tower::service_fn(move |_req: Request<Body>| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move {
                Ok::<_, Infallible>(
                    (
                        [(CURSOR_NEXT, "/p-feedbacks?limit=2&next=abc")],
                        "[]",
                    )
                        .into_response(),
                )
            }
        }));
        let service = CacheLayer::new(cache).layer(inner);

        let first = service.clone().oneshot(get("/p-feedbacks?limit=2")).await.unwrap();
        assert_eq!(first.headers()[X_CACHE], CACHE_MISS);
        assert_eq!(first.headers()[CURSOR_NEXT], "/p-feedbacks?limit=2&next=abc");

        let again = service.clone().oneshot(get("/p-feedbacks?limit=2")).await.unwrap();
        assert_eq!(again.headers()[X_CACHE], CACHE_HIT);
        assert_eq!(again.headers()[CURSOR_NEXT], "/p-feedbacks?limit=2&next=abc");
        assert_eq!(body_of(again).await, Bytes::from_static(b"[]"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unreadable_entry_falls_through() {
        let cache = Arc::new(MemoryCache::new(Duration::from_secs(60)));
        cache
            .set("/feedbacks", Bytes::from_static(b"not an entry"))
            .await
            .unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let service = CacheLayer::new(cache).layer(counting_service(calls.clone(), StatusCode::OK));

        let response = service.oneshot(get("/feedbacks")).await.unwrap();
        assert_eq!(response.headers()[X_CACHE], CACHE_MISS);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_entry_keeps_only_replayed_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(CURSOR_NEXT, HeaderValue::from_static("/p-feedbacks?limit=1&next=x"));
        headers.insert("x-request-id", HeaderValue::from_static("r-1"));

        let entry = CachedEntry::capture(&headers, &Bytes::from_static(b"[1]")).unwrap();
        assert_eq!(
            entry.headers,
            vec![(
                "url-cursor-next".to_string(),
                "/p-feedbacks?limit=1&next=x".to_string()
            )]
        );
        assert_eq!(CachedEntry::decode(&entry.encode()), Some(entry));
    }

    #[tokio::test]
    async fn test_query_string_is_part_of_key() {
        let cache = Arc::new(MemoryCache::new(Duration::from_secs(60)));
        let calls = Arc::new(AtomicUsize::new(0));
        let service = CacheLayer::new(cache).layer(counting_service(calls.clone(), StatusCode::OK));

        service.clone().oneshot(get("/p-feedbacks?limit=2")).await.unwrap();
        let other = service.clone().oneshot(get("/p-feedbacks?limit=3")).await.unwrap();

        assert_eq!(other.headers()[X_CACHE], CACHE_MISS);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_error_responses_are_not_stored() {
        let cache = Arc::new(MemoryCache::new(Duration::from_secs(60)));
        let calls = Arc::new(AtomicUsize::new(0));
        let service = CacheLayer::new(cache.clone())
            .layer(counting_service(calls.clone(), StatusCode::NOT_FOUND));

        service.clone().oneshot(get("/feedback/x")).await.unwrap();
        let again = service.clone().oneshot(get("/feedback/x")).await.unwrap();

        assert_eq!(again.status(), StatusCode::NOT_FOUND);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_non_get_bypasses_cache() {
        let cache = Arc::new(MemoryCache::new(Duration::from_secs(60)));
        let calls = Arc::new(AtomicUsize::new(0));
        let service = CacheLayer::new(cache.clone()).layer(counting_service(calls.clone(), StatusCode::OK));

        let req = Request::builder()
            .method("POST")
            .uri("/feedback")
            .body(Body::empty())
            .unwrap();
        let response = service.oneshot(req).await.unwrap();

        assert!(response.headers().get(X_CACHE).is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_get_failure_is_server_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = CacheLayer::new(Arc::new(BrokenCache { fail_get: true }))
            .layer(counting_service(calls.clone(), StatusCode::OK));

        let response = service.oneshot(get("/feedbacks")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_set_failure_is_swallowed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let service = CacheLayer::new(Arc::new(BrokenCache { fail_get: false }))
            .layer(counting_service(calls.clone(), StatusCode::OK));

        let response = service.oneshot(get("/feedbacks")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[X_CACHE], CACHE_MISS);
        assert_eq!(body_of(response).await, Bytes::from_static(b"{\"n\":0}"));
    }
}
