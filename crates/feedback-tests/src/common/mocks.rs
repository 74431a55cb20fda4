// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! Capability doubles wrapping the in-memory backends. Each one counts its
//! calls and can be told to fail.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use feedback_core::{
    CacheError, CacheResult, Feedback, FeedbackId, FeedbackInput, FeedbackMessage,
    FeedbackPublisher, FeedbackStore, MemoryCache, MemoryStore, Page, PageRequest, PublishError,
    PublishResult, ResponseCache, StorageError, StorageResult,
};

// =============================================================================
// Mock Store
// =============================================================================

/// A [`MemoryStore`] with failure injection.
#[derive(Debug, Default)]
pub struct MockStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    create_count: AtomicU64,
    read_count: AtomicU64,
}

impl MockStore {
    /// Creates an empty, healthy store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every read fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every create fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of create calls, failed ones included.
    pub fn create_count(&self) -> u64 {
        self.create_count.load(Ordering::SeqCst)
    }

    /// Number of read calls of any kind.
    pub fn read_count(&self) -> u64 {
        self.read_count.load(Ordering::SeqCst)
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn check_read(&self) -> StorageResult<()> {
        self.read_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("injected read failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl FeedbackStore for MockStore {
    async fn create(&self, input: &FeedbackInput) -> StorageResult<Feedback> {
        self.create_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("injected write failure".into()));
        }
        self.inner.create(input).await
    }

    async fn get_by_id(&self, id: FeedbackId) -> StorageResult<Option<Feedback>> {
        self.check_read()?;
        self.inner.get_by_id(id).await
    }

    async fn get_all(&self) -> StorageResult<Vec<Feedback>> {
        self.check_read()?;
        self.inner.get_all().await
    }

    async fn get_page(&self, request: PageRequest) -> StorageResult<Page> {
        self.check_read()?;
        self.inner.get_page(request).await
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// =============================================================================
// Mock Publisher
// =============================================================================

/// A publisher that records every message it accepts.
#[derive(Debug)]
pub struct MockPublisher {
    topic: String,
    published: Mutex<Vec<FeedbackMessage>>,
    fail_publish: AtomicBool,
    attempts: AtomicU64,
}

impl MockPublisher {
    /// Creates a healthy publisher on the `feedbacks` topic.
    pub fn new() -> Self {
        Self {
            topic: feedback_core::DEFAULT_TOPIC.to_string(),
            published: Mutex::new(Vec::new()),
            fail_publish: AtomicBool::new(false),
            attempts: AtomicU64::new(0),
        }
    }

    /// Makes every publish fail.
    pub fn set_fail_publish(&self, fail: bool) {
        self.fail_publish.store(fail, Ordering::SeqCst);
    }

    /// Messages accepted so far, in publish order.
    pub fn published(&self) -> Vec<FeedbackMessage> {
        self.published.lock().clone()
    }

    /// Number of publish calls, failed ones included.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Default for MockPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedbackPublisher for MockPublisher {
    async fn publish(&self, message: &FeedbackMessage) -> PublishResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(PublishError::Unavailable("injected publish failure".into()));
        }
        self.published.lock().push(message.clone());
        Ok(())
    }

    fn topic(&self) -> &str {
        &self.topic
    }
}

// =============================================================================
// Mock Cache
// =============================================================================

/// A [`MemoryCache`] with failure injection.
#[derive(Debug)]
pub struct MockCache {
    inner: MemoryCache,
    fail_get: AtomicBool,
    fail_set: AtomicBool,
    get_count: AtomicU64,
    set_count: AtomicU64,
}

impl MockCache {
    /// Creates a healthy cache with a 60 second TTL.
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(60))
    }

    /// Creates a healthy cache with the given TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: MemoryCache::new(ttl),
            fail_get: AtomicBool::new(false),
            fail_set: AtomicBool::new(false),
            get_count: AtomicU64::new(0),
            set_count: AtomicU64::new(0),
        }
    }

    /// Makes every lookup fail.
    pub fn set_fail_get(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    /// Makes every store fail.
    pub fn set_fail_set(&self, fail: bool) {
        self.fail_set.store(fail, Ordering::SeqCst);
    }

    /// Number of lookups.
    pub fn get_count(&self) -> u64 {
        self.get_count.load(Ordering::SeqCst)
    }

    /// Number of store attempts.
    pub fn set_count(&self) -> u64 {
        self.set_count.load(Ordering::SeqCst)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for MockCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResponseCache for MockCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Bytes>> {
        self.get_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("injected get failure".into()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Bytes) -> CacheResult<()> {
        self.set_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_set.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("injected set failure".into()));
        }
        self.inner.set(key, value).await
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
