// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Redis response cache. Entries are written with `SET key value EX ttl`.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use redis::aio::ConnectionManager;
use redis::Client;

use super::{AtomicCacheStats, CacheStats, ResponseCache};
use crate::error::{CacheError, CacheResult};

/// A Redis-backed cache.
pub struct RedisCache {
    connection: ConnectionManager,
    ttl_secs: u64,
    key_prefix: String,
    stats: AtomicCacheStats,
}

impl RedisCache {
    /// Connects to `url`; entries live for `ttl` (rounded up to whole seconds).
    pub async fn connect(url: &str, ttl: Duration) -> CacheResult<Self> {
        let client = Client::open(url)?;
        let connection = client.get_connection_manager().await?;

        let ttl_secs = expiry_secs(ttl);
        tracing::info!(ttl_secs, "Connected to Redis response cache");

        Ok(Self {
            connection,
            ttl_secs,
            key_prefix: String::new(),
            stats: AtomicCacheStats::default(),
        })
    }

    /// Prefixes every key, so several services can share one database.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Returns current statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl ResponseCache for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Bytes>> {
        let mut conn = self.connection.clone();
        let value: Option<Vec<u8>> = redis::cmd("GET")
            .arg(self.full_key(key))
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                self.stats.record_error();
                CacheError::from(e)
            })?;

        self.stats.record_lookup(value.is_some());
        Ok(value.map(Bytes::from))
    }

    async fn set(&self, key: &str, value: Bytes) -> CacheResult<()> {
        let mut conn = self.connection.clone();
        let _: () = redis::cmd("SET")
            .arg(self.full_key(key))
            .arg(value.as_ref())
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                self.stats.record_error();
                CacheError::from(e)
            })?;

        self.stats.record_write();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("ttl_secs", &self.ttl_secs)
            .field("key_prefix", &self.key_prefix)
            .finish()
    }
}

/// `EX` argument for `ttl`: whole seconds, rounded up, never zero.
fn expiry_secs(ttl: Duration) -> u64 {
    let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    secs.max(1)
}
