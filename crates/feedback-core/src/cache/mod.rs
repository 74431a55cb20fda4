// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Response cache capability.
//!
//! A key to bytes store where every entry carries the TTL configured for the
//! backend. Expiry is the backend's concern; there is no explicit
//! invalidation.

mod memory;
mod redis;

pub use self::memory::MemoryCache;
pub use self::redis::RedisCache;

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;

use crate::error::CacheResult;

/// The cache capability consumed by the response cache layer.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Returns the stored value for `key`, or `None` on a miss.
    async fn get(&self, key: &str) -> CacheResult<Option<Bytes>>;

    /// Stores `value` under `key` with the backend's TTL.
    async fn set(&self, key: &str, value: Bytes) -> CacheResult<()>;

    /// Returns the backend name for logging.
    fn name(&self) -> &'static str;
}

// =============================================================================
// Statistics
// =============================================================================

/// Snapshot of cache counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups that found a live entry.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Successful stores.
    pub writes: u64,
    /// Backend failures.
    pub errors: u64,
}

/// Lock-free counters shared by the backends.
#[derive(Debug, Default)]
pub(crate) struct AtomicCacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    errors: AtomicU64,
}

impl AtomicCacheStats {
    pub(crate) fn record_lookup(&self, hit: bool) {
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}
