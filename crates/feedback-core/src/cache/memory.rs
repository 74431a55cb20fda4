// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory response cache with per-entry TTL.
//!
//! Expired entries are dropped lazily on lookup, or in bulk through
//! [`MemoryCache::purge_expired`]. Long-running processes start a
//! background sweep with [`MemoryCache::spawn_purger`] so keys that are
//! never read again still leave the map.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::{AtomicCacheStats, CacheStats, ResponseCache};
use crate::error::CacheResult;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Bytes,
    expires_at: Instant,
}

/// A process-local cache.
#[derive(Debug)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    stats: AtomicCacheStats,
}

impl MemoryCache {
    /// Creates a cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            stats: AtomicCacheStats::default(),
        }
    }

    /// Returns the configured TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the number of entries, live or not yet purged.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    /// Spawns a task that calls [`purge_expired`](Self::purge_expired)
    /// every `every`.
    ///
    /// The task holds a weak reference and ends on the first tick after the
    /// cache is dropped. Abort the handle to stop it sooner.
    pub fn spawn_purger(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let cache: Weak<Self> = Arc::downgrade(self);
        let every = every.max(Duration::from_millis(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else {
                    break;
                };
                let removed = cache.purge_expired();
                if removed > 0 {
                    tracing::debug!(removed, remaining = cache.len(), "Purged expired cache entries");
                }
            }
        })
    }

    /// Returns current statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Bytes>> {
        let now = Instant::now();

        let found = {
            let entries = self.entries.read();
            entries.get(key).cloned()
        };

        let value = match found {
            Some(entry) if entry.expires_at > now => Some(entry.value),
            Some(_) => {
                self.entries.write().remove(key);
                None
            }
            None => None,
        };

        self.stats.record_lookup(value.is_some());
        Ok(value)
    }

    async fn set(&self, key: &str, value: Bytes) -> CacheResult<()> {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.write().insert(key.to_string(), entry);
        self.stats.record_write();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
