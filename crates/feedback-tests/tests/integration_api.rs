// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # API Integration Tests
//!
//! HTTP-level tests through the full router:
//!
//! - `test_token_*`: Credential issuance
//! - `test_gate_*`: Authorization gate outcomes and the role matrix
//! - `test_create_*` / `test_get_*`: Record routes
//! - `test_cache_*`: Response cache behavior

use std::sync::Arc;

use feedback_api::{CACHE_HIT, CACHE_MISS};
use feedback_config::TokenConfig;
use feedback_core::Feedback;
use feedback_tests::prelude::*;

// =============================================================================
// Status and Token Tests
// =============================================================================

#[tokio::test]
async fn test_status_is_open() {
    let app = TestApp::new();
    let response = app.get("/status", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "Ok");
}

#[tokio::test]
async fn test_token_default_is_usable() {
    let app = TestApp::new();
    let response = app.get("/token", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let credential = response.text();
    assert!(credential.starts_with("Bearer "));

    // Default role is unrestricted: both reads and writes pass.
    let read = app.get("/feedbacks", Some(&credential)).await;
    assert_eq!(read.status, StatusCode::OK);

    let body = serde_json::to_string(&FeedbackFixtures::valid()).unwrap();
    let write = app.post_json("/feedback", Some(&credential), &body).await;
    assert_eq!(write.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_token_with_role_and_minutes() {
    let app = TestApp::new();
    let response = app.get("/token?minutes=30&role=read-only", None).await;
    assert_eq!(response.status, StatusCode::OK);

    let credential = response.text();
    assert_eq!(app.get("/feedbacks", Some(&credential)).await.status, StatusCode::OK);

    let body = serde_json::to_string(&FeedbackFixtures::valid()).unwrap();
    let write = app.post_json("/feedback", Some(&credential), &body).await;
    assert_eq!(write.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_empty_params_use_defaults() {
    let app = TestApp::new();
    let response = app.get("/token?minutes=&role=", None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_token_rejects_bad_minutes() {
    let app = TestApp::new();

    for uri in ["/token?minutes=0", "/token?minutes=-5", "/token?minutes=ten"] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(!response.error_message().is_empty());
    }
}

#[tokio::test]
async fn test_token_rejects_minutes_above_max() {
    let app = TestApp::builder()
        .token_config(TokenConfig {
            default_ttl_minutes: 5,
            max_ttl_minutes: 60,
        })
        .build();

    assert_eq!(app.get("/token?minutes=60", None).await.status, StatusCode::OK);
    assert_eq!(
        app.get("/token?minutes=61", None).await.status,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_token_rejects_unknown_role() {
    let app = TestApp::new();
    let response = app.get("/token?role=admin", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Gate Tests
// =============================================================================

#[tokio::test]
async fn test_gate_missing_header() {
    let app = TestApp::new();
    let response = app.get("/feedbacks", None).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(!response.error_message().is_empty());
    assert_eq!(app.store.read_count(), 0);
}

#[tokio::test]
async fn test_gate_malformed_header() {
    let app = TestApp::new();
    let token = app.token(Role::Unrestricted);
    let raw = token.trim_start_matches("Bearer ");

    for auth in [raw.to_string(), format!("Token {raw}"), "Bearer".to_string()] {
        let response = app.get("/feedbacks", Some(&auth)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{auth}");
    }
}

#[tokio::test]
async fn test_gate_rejects_garbage_token() {
    let app = TestApp::new();
    let response = app.get("/feedbacks", Some("Bearer not.a.token")).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_gate_rejects_foreign_signature() {
    let app = TestApp::new();
    let response = app
        .get("/feedbacks", Some(&app.foreign_token(Role::Unrestricted)))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_gate_rejects_expired_token() {
    let app = TestApp::new();
    let response = app
        .get("/feedbacks", Some(&app.expired_token(Role::Unrestricted)))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.store.read_count(), 0);
}

#[tokio::test]
async fn test_gate_role_matrix() {
    let app = TestApp::new();
    let body = serde_json::to_string(&FeedbackFixtures::valid()).unwrap();

    let cases = [
        (Role::ReadOnly, StatusCode::OK, StatusCode::UNAUTHORIZED),
        (Role::WriteOnly, StatusCode::UNAUTHORIZED, StatusCode::CREATED),
        (Role::Unrestricted, StatusCode::OK, StatusCode::CREATED),
    ];

    for (role, read_status, write_status) in cases {
        let auth = app.token(role);

        let read = app.get("/feedbacks", Some(&auth)).await;
        assert_eq!(read.status, read_status, "GET as {role}");

        let write = app.post_json("/feedback", Some(&auth), &body).await;
        assert_eq!(write.status, write_status, "POST as {role}");
    }

    // Only the write-only and unrestricted creates went through.
    assert_eq!(app.store.len(), 2);
}

#[tokio::test]
async fn test_gate_rejection_skips_cache() {
    let app = TestApp::new();
    let id = app.create(&FeedbackFixtures::valid()).await;

    let response = app
        .get(&format!("/feedback/{id}"), Some(&app.token(Role::WriteOnly)))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.header("x-cache").is_none());
    assert_eq!(app.cache.get_count(), 0);
}

// =============================================================================
// Create Tests
// =============================================================================

#[tokio::test]
async fn test_create_stores_and_publishes() {
    let app = TestApp::new();
    let input = FeedbackFixtures::valid();
    let id = app.create(&input).await;

    assert_eq!(app.store.len(), 1);
    let published = app.publisher.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].id, id);
    assert_eq!(published[0].email, input.email);
    assert_eq!(published[0].source, input.source);
}

#[tokio::test]
async fn test_create_malformed_json() {
    let app = TestApp::new();
    let auth = app.token(Role::WriteOnly);

    let response = app.post_json("/feedback", Some(&auth), "{not json").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(!response.error_message().is_empty());
    assert_eq!(app.store.create_count(), 0);
    assert_eq!(app.publisher.attempts(), 0);
}

#[tokio::test]
async fn test_create_validation_errors() {
    let app = TestApp::new();
    let auth = app.token(Role::WriteOnly);

    let body = serde_json::to_string(&FeedbackFixtures::invalid_both()).unwrap();
    let response = app.post_json("/feedback", Some(&auth), &body).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let message = response.error_message();
    assert!(message.contains("email"), "{message}");
    assert!(message.contains("source"), "{message}");

    assert_eq!(app.store.create_count(), 0);
    assert_eq!(app.publisher.attempts(), 0);
}

#[tokio::test]
async fn test_create_publish_failure_keeps_record() {
    let publisher = Arc::new(MockPublisher::new());
    publisher.set_fail_publish(true);
    let app = TestApp::builder().publisher(publisher).build();

    let auth = app.token(Role::Unrestricted);
    let body = serde_json::to_string(&FeedbackFixtures::valid()).unwrap();
    let response = app.post_json("/feedback", Some(&auth), &body).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!response.error_message().is_empty());
    assert_eq!(app.store.len(), 1);
    assert!(app.publisher.published().is_empty());

    let list = app.get("/feedbacks", Some(&auth)).await;
    assert_eq!(list.json::<Vec<Feedback>>().len(), 1);
}

#[tokio::test]
async fn test_create_storage_failure() {
    let store = Arc::new(MockStore::new());
    store.set_fail_writes(true);
    let app = TestApp::builder().store(store).build();

    let auth = app.token(Role::WriteOnly);
    let body = serde_json::to_string(&FeedbackFixtures::valid()).unwrap();
    let response = app.post_json("/feedback", Some(&auth), &body).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.publisher.attempts(), 0);
}

// =============================================================================
// Read Tests
// =============================================================================

#[tokio::test]
async fn test_get_by_id() {
    let app = TestApp::new();
    let input = FeedbackFixtures::valid();
    let id = app.create(&input).await;

    let response = app
        .get(&format!("/feedback/{id}"), Some(&app.token(Role::ReadOnly)))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let record: Feedback = response.json();
    assert_eq!(record.id, id);
    assert_eq!(record.customer_name, input.customer_name);
    assert_eq!(record.feedback_text, input.feedback_text);
    assert_eq!(record.created_at, record.updated_at);
}

#[tokio::test]
async fn test_get_unknown_id() {
    let app = TestApp::new();
    let response = app
        .get(
            &format!("/feedback/{}", FeedbackId::new()),
            Some(&app.token(Role::ReadOnly)),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(!response.error_message().is_empty());
}

#[tokio::test]
async fn test_get_malformed_id() {
    let app = TestApp::new();
    let response = app
        .get("/feedback/not-a-uuid", Some(&app.token(Role::ReadOnly)))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_all_in_creation_order() {
    let app = TestApp::new();
    let mut ids = Vec::new();
    for input in FeedbackFixtures::batch(4) {
        ids.push(app.create(&input).await);
    }

    let response = app.get("/feedbacks", Some(&app.token(Role::ReadOnly))).await;
    assert_eq!(response.status, StatusCode::OK);

    let records: Vec<Feedback> = response.json();
    let listed: Vec<FeedbackId> = records.iter().map(|r| r.id).collect();
    assert_eq!(listed, ids);
}

#[tokio::test]
async fn test_get_all_empty() {
    let app = TestApp::new();
    let response = app.get("/feedbacks", Some(&app.token(Role::ReadOnly))).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.json::<Vec<Feedback>>().is_empty());
}

#[tokio::test]
async fn test_get_storage_failure() {
    let app = TestApp::new();
    let id = app.create(&FeedbackFixtures::valid()).await;
    app.store.set_fail_reads(true);

    let response = app
        .get(&format!("/feedback/{id}"), Some(&app.token(Role::ReadOnly)))
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
}

// =============================================================================
// Cache Tests
// =============================================================================

#[tokio::test]
async fn test_cache_miss_then_hit() {
    let app = TestApp::new();
    let id = app.create(&FeedbackFixtures::valid()).await;
    let auth = app.token(Role::ReadOnly);
    let uri = format!("/feedback/{id}");

    let first = app.get(&uri, Some(&auth)).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.header("x-cache"), Some(CACHE_MISS));

    let second = app.get(&uri, Some(&auth)).await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.header("x-cache"), Some(CACHE_HIT));
    assert_eq!(second.header("content-type"), Some("application/json"));
    assert_eq!(first.body, second.body);

    // The hit never reached storage.
    assert_eq!(app.store.read_count(), 1);
}

#[tokio::test]
async fn test_cache_hit_survives_storage_outage() {
    let app = TestApp::new();
    let id = app.create(&FeedbackFixtures::valid()).await;
    let auth = app.token(Role::ReadOnly);
    let uri = format!("/feedback/{id}");

    assert_eq!(app.get(&uri, Some(&auth)).await.status, StatusCode::OK);
    app.store.set_fail_reads(true);

    let cached = app.get(&uri, Some(&auth)).await;
    assert_eq!(cached.status, StatusCode::OK);
    assert_eq!(cached.header("x-cache"), Some(CACHE_HIT));
}

#[tokio::test]
async fn test_cache_errors_are_not_stored() {
    let app = TestApp::new();
    let auth = app.token(Role::ReadOnly);
    let uri = format!("/feedback/{}", FeedbackId::new());

    let response = app.get(&uri, Some(&auth)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(app.cache.set_count(), 0);
    assert!(app.cache.is_empty());
}

#[tokio::test]
async fn test_cache_get_failure_is_server_error() {
    let app = TestApp::new();
    let id = app.create(&FeedbackFixtures::valid()).await;
    app.cache.set_fail_get(true);

    let response = app
        .get(&format!("/feedback/{id}"), Some(&app.token(Role::ReadOnly)))
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.store.read_count(), 0);
}

#[tokio::test]
async fn test_cache_set_failure_still_serves() {
    let app = TestApp::new();
    let id = app.create(&FeedbackFixtures::valid()).await;
    app.cache.set_fail_set(true);
    let auth = app.token(Role::ReadOnly);
    let uri = format!("/feedback/{id}");

    let first = app.get(&uri, Some(&auth)).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.header("x-cache"), Some(CACHE_MISS));

    let second = app.get(&uri, Some(&auth)).await;
    assert_eq!(second.header("x-cache"), Some(CACHE_MISS));
    assert_eq!(app.store.read_count(), 2);
}

#[tokio::test]
async fn test_cache_not_used_for_list() {
    let app = TestApp::new();
    app.create(&FeedbackFixtures::valid()).await;

    let response = app.get("/feedbacks", Some(&app.token(Role::ReadOnly))).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.header("x-cache").is_none());
    assert_eq!(app.cache.get_count(), 0);
}
