// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Storage capability.
//!
//! A durable table of feedback records keyed by identifier and ordered by
//! `(created_at, id)`. Two backends are provided:
//!
//! - [`MemoryStore`]: ordered in-process table, for tests and local runs
//! - [`PostgresStore`]: `sqlx` connection pool over a `feedbacks` table

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::types::{Feedback, FeedbackId, FeedbackInput, PageRequest, Page};

/// The storage capability consumed by the feedback service.
///
/// Implementations must be safe for concurrent use; the service issues one
/// call per operation and awaits it before proceeding.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Persists a new record, assigning its identifier and timestamps.
    async fn create(&self, input: &FeedbackInput) -> StorageResult<Feedback>;

    /// Fetches a record by identifier.
    async fn get_by_id(&self, id: FeedbackId) -> StorageResult<Option<Feedback>>;

    /// Returns every record in `(created_at, id)` order.
    async fn get_all(&self) -> StorageResult<Vec<Feedback>>;

    /// Returns up to `request.limit` records strictly after the cursor record.
    ///
    /// An unknown cursor yields an empty page.
    async fn get_page(&self, request: PageRequest) -> StorageResult<Page>;

    /// Returns the backend name for logging.
    fn name(&self) -> &'static str;
}
