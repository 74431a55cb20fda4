// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Service runtime orchestration.
//!
//! Turns a validated [`FeedbackConfig`] into running backends and an HTTP
//! server, then tears the backends down once the server has drained.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use feedback_api::{ApiConfig, ApiServer, AppState};
use feedback_config::{
    load_config, BrokerBackend, CacheBackend, FeedbackConfig, SecretValue, StorageBackend,
};
use feedback_core::{
    FeedbackPublisher, FeedbackService, FeedbackStore, MemoryCache, MemoryStore, MemoryTopic,
    PostgresStore, RedisCache, RedisPublisher, ResponseCache,
};

use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// FeedbackRuntime
// =============================================================================

/// Owns the configuration and the shutdown coordinator for one server run.
#[derive(Debug)]
pub struct FeedbackRuntime {
    config: Arc<FeedbackConfig>,
    shutdown: ShutdownCoordinator,
}

impl FeedbackRuntime {
    /// Creates a new runtime.
    pub fn new(config: FeedbackConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &FeedbackConfig {
        &self.config
    }

    /// Returns the shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Binds the configured address and serves until a termination signal.
    pub async fn run(self) -> BinResult<()> {
        let addr = self.config.server.socket_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| BinError::Bind { addr, source })?;

        let os_signal = {
            let shutdown = self.shutdown.clone();
            tokio::spawn(async move { shutdown.wait_for_os_signal().await })
        };

        let result = self.serve(listener).await;
        os_signal.abort();
        result
    }

    /// Serves on an already bound listener until shutdown is initiated.
    pub async fn serve(self, listener: TcpListener) -> BinResult<()> {
        info!("Starting feedback service v{}", feedback_core::VERSION);

        let components = self.initialize_components().await?;
        let state = self.build_state(&components)?;

        let signal = self.shutdown.shutdown_signal();
        let result = ApiServer::new(state)
            .serve(listener, signal.wait())
            .await
            .map_err(BinError::from);

        components.close().await;
        info!("Feedback service shutdown complete");

        result
    }

    /// Connects every backend named by the configuration.
    async fn initialize_components(&self) -> BinResult<Components> {
        info!("Initializing backends...");

        let (store, postgres) = build_store(&self.config).await?;
        let (cache, purger) = build_cache(&self.config).await?;
        let publisher = build_publisher(&self.config).await?;

        info!(
            storage = store.name(),
            cache = cache.name(),
            topic = publisher.topic(),
            "Backends ready"
        );

        Ok(Components {
            store,
            postgres,
            cache,
            purger,
            publisher,
        })
    }

    fn build_state(&self, components: &Components) -> BinResult<AppState> {
        let secret = self
            .config
            .security
            .secret
            .as_ref()
            .ok_or_else(|| BinError::config("security.secret is not set"))?;

        let service = FeedbackService::new(components.store.clone(), components.publisher.clone());

        AppState::builder()
            .config(ApiConfig::from_server(&self.config.server))
            .service(service)
            .cache(components.cache.clone())
            .secret(secret.expose())
            .token_config(self.config.security.token.clone())
            .build()
            .map_err(|e| BinError::from(e).with_context("building application state"))
    }
}

// =============================================================================
// Components
// =============================================================================

/// Live backends for one run.
struct Components {
    store: Arc<dyn FeedbackStore>,
    postgres: Option<Arc<PostgresStore>>,
    cache: Arc<dyn ResponseCache>,
    purger: Option<JoinHandle<()>>,
    publisher: Arc<dyn FeedbackPublisher>,
}

impl Components {
    async fn close(self) {
        if let Some(purger) = self.purger {
            purger.abort();
        }
        if let Err(e) = self.publisher.close().await {
            warn!(error = %e, "Failed to close publisher");
        }
        if let Some(postgres) = self.postgres {
            postgres.close().await;
        }
    }
}

fn required_url<'a>(field: &str, url: Option<&'a SecretValue>) -> BinResult<&'a str> {
    url.map(SecretValue::expose)
        .ok_or_else(|| BinError::config(format!("{} is not set", field)))
}

/// Builds the storage backend.
async fn build_store(
    config: &FeedbackConfig,
) -> BinResult<(Arc<dyn FeedbackStore>, Option<Arc<PostgresStore>>)> {
    match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage");
            let store: Arc<dyn FeedbackStore> = Arc::new(MemoryStore::new());
            Ok((store, None))
        }
        StorageBackend::Postgres => {
            let url = required_url("storage.url", config.storage.url.as_ref())?;
            let store = PostgresStore::connect(url, config.storage.max_connections)
                .await
                .map_err(|e| BinError::backend("storage", e))?;
            let postgres = Arc::new(store);
            let store: Arc<dyn FeedbackStore> = postgres.clone();
            Ok((store, Some(postgres)))
        }
    }
}

/// Builds the response cache backend.
///
/// The in-memory cache comes with a sweep task that runs once per TTL.
async fn build_cache(
    config: &FeedbackConfig,
) -> BinResult<(Arc<dyn ResponseCache>, Option<JoinHandle<()>>)> {
    let ttl = config.cache.ttl();
    match config.cache.backend {
        CacheBackend::Memory => {
            info!(ttl = ?ttl, "Using in-memory response cache");
            let memory = Arc::new(MemoryCache::new(ttl));
            let purger = memory.spawn_purger(ttl);
            let cache: Arc<dyn ResponseCache> = memory;
            Ok((cache, Some(purger)))
        }
        CacheBackend::Redis => {
            let url = required_url("cache.url", config.cache.url.as_ref())?;
            let cache = RedisCache::connect(url, ttl)
                .await
                .map_err(|e| BinError::backend("cache", e))?;
            Ok((Arc::new(cache), None))
        }
    }
}

/// Builds the broker backend.
async fn build_publisher(config: &FeedbackConfig) -> BinResult<Arc<dyn FeedbackPublisher>> {
    let topic = config.broker.topic.clone();
    match config.broker.backend {
        BrokerBackend::Memory => {
            info!(topic = %topic, "Using in-memory topic");
            Ok(Arc::new(MemoryTopic::new(topic, config.broker.capacity)))
        }
        BrokerBackend::Redis => {
            let url = required_url("broker.url", config.broker.url.as_ref())?;
            let publisher = RedisPublisher::connect(url, topic)
                .await
                .map_err(|e| BinError::backend("broker", e))?;
            Ok(Arc::new(publisher))
        }
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for constructing the runtime.
pub struct RuntimeBuilder {
    config_path: Option<PathBuf>,
    config: Option<FeedbackConfig>,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self {
            config_path: None,
            config: None,
        }
    }

    /// Sets the configuration file path.
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the configuration directly.
    pub fn config(mut self, config: FeedbackConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the runtime. A direct configuration wins over a path.
    pub fn build(self) -> BinResult<FeedbackRuntime> {
        let config = match (self.config, self.config_path) {
            (Some(config), _) => {
                config.validate()?;
                config
            }
            (None, Some(path)) => load_config(&path)
                .map_err(|e| BinError::from(e).with_context(path.display().to_string()))?,
            (None, None) => {
                return Err(BinError::config(
                    "No configuration provided. Use --config or set FEEDBACK_CONFIG.",
                ))
            }
        };

        Ok(FeedbackRuntime::new(config))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_config() -> FeedbackConfig {
        let mut config = FeedbackConfig::default();
        config.security.secret = Some(SecretValue::new("runtime-test-secret-0123456789abcdef"));
        config.server.shutdown_timeout = Duration::from_millis(100);
        config
    }

    #[test]
    fn test_runtime_builder() {
        let runtime = RuntimeBuilder::new().config(test_config()).build().unwrap();
        assert_eq!(runtime.config().storage.backend, StorageBackend::Memory);
        assert!(!runtime.shutdown().is_shutdown_initiated());
    }

    #[test]
    fn test_runtime_builder_requires_config() {
        let err = RuntimeBuilder::new().build().unwrap_err();
        assert!(matches!(err, BinError::Configuration(_)));
    }

    #[test]
    fn test_runtime_builder_rejects_missing_secret() {
        let err = RuntimeBuilder::new()
            .config(FeedbackConfig::default())
            .build()
            .unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_runtime_builder_missing_file() {
        let err = RuntimeBuilder::new()
            .config_path("/nonexistent/feedback.yaml")
            .build()
            .unwrap_err();
        assert!(matches!(err, BinError::WithContext { .. }));
    }

    #[tokio::test]
    async fn test_memory_backends() {
        let config = test_config();
        let (store, postgres) = build_store(&config).await.unwrap();
        assert_eq!(store.name(), "memory");
        assert!(postgres.is_none());

        let publisher = build_publisher(&config).await.unwrap();
        assert_eq!(publisher.topic(), "feedbacks");
    }

    #[tokio::test]
    async fn test_memory_cache_is_swept_until_close() {
        let config = test_config();
        let (store, postgres) = build_store(&config).await.unwrap();
        let (cache, purger) = build_cache(&config).await.unwrap();
        assert_eq!(cache.name(), "memory");
        let purger = purger.expect("memory cache has a purger");
        let abort = purger.abort_handle();
        assert!(!purger.is_finished());

        let publisher = build_publisher(&config).await.unwrap();
        let components = Components {
            store,
            postgres,
            cache,
            purger: Some(purger),
            publisher,
        };
        components.close().await;
        tokio::time::timeout(Duration::from_secs(1), async {
            while !abort.is_finished() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("purger still running after close");
    }

    #[tokio::test]
    async fn test_redis_backend_requires_url() {
        let mut config = test_config();
        config.cache.backend = CacheBackend::Redis;
        let err = build_cache(&config).await.err().unwrap();
        assert!(matches!(err, BinError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_serve_until_shutdown() {
        let runtime = RuntimeBuilder::new().config(test_config()).build().unwrap();
        let shutdown = runtime.shutdown().clone();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

        let handle = tokio::spawn(runtime.serve(listener));
        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown.initiate_shutdown();

        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("runtime did not stop")
            .unwrap();
        assert!(result.is_ok());
    }
}
