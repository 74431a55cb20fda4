// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # feedback-core
//!
//! Domain types, capability traits and backends for the feedback service.
//!
//! - **Types**: `FeedbackId`, `Feedback`, `FeedbackInput`, `FeedbackMessage`, `Page`
//! - **Validation**: mail address and source URL checks
//! - **Store**: storage capability (`MemoryStore`, `PostgresStore`)
//! - **Cache**: response cache capability (`MemoryCache`, `RedisCache`)
//! - **Broker**: publish capability (`MemoryTopic`, `RedisPublisher`)
//! - **Service**: `FeedbackService`, the create/read orchestrator
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use feedback_core::{FeedbackInput, FeedbackService, MemoryStore, MemoryTopic};
//!
//! let service = FeedbackService::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(MemoryTopic::new("feedbacks", 1024)),
//! );
//!
//! let id = service
//!     .create(FeedbackInput::new("Ada", "ada@example.com", "great", "https://example.com"))
//!     .await?;
//! let record = service.get_by_id(&id.to_string()).await?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Core Modules
// =============================================================================

pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Capability Modules
// =============================================================================

pub mod broker;
pub mod cache;
pub mod store;

// =============================================================================
// Orchestration
// =============================================================================

pub mod service;

// =============================================================================
// Re-exports for convenience
// =============================================================================

pub use error::*;
pub use types::*;

pub use broker::{FeedbackPublisher, MemoryTopic, RedisPublisher, DEFAULT_TOPIC};
pub use cache::{CacheStats, MemoryCache, RedisCache, ResponseCache};
pub use service::{parse_id, parse_page_request, FeedbackService};
pub use store::{FeedbackStore, MemoryStore, PostgresStore};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
