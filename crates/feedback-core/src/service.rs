// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Feedback orchestration.
//!
//! [`FeedbackService`] coordinates the storage and broker capabilities:
//!
//! ```text
//! create:  validate ──► store.create ──► publisher.publish ──► id
//!             │              │                   │
//!         Validation      Storage             Publish (record stays stored)
//! ```
//!
//! Reads go straight to storage. Identifier and limit parsing happen here so
//! every front end reports the same `InvalidParameter` errors.

use std::sync::Arc;

use crate::broker::FeedbackPublisher;
use crate::error::{FeedbackError, FeedbackResult};
use crate::store::FeedbackStore;
use crate::types::{
    Feedback, FeedbackId, FeedbackInput, FeedbackMessage, Page, PageRequest, DEFAULT_PAGE_LIMIT,
};
use crate::validation::validate_input;

/// Coordinates feedback operations across storage and broker.
#[derive(Clone)]
pub struct FeedbackService {
    store: Arc<dyn FeedbackStore>,
    publisher: Arc<dyn FeedbackPublisher>,
}

impl FeedbackService {
    /// Creates a service over the given capabilities.
    pub fn new(store: Arc<dyn FeedbackStore>, publisher: Arc<dyn FeedbackPublisher>) -> Self {
        Self { store, publisher }
    }

    /// Returns the storage capability.
    pub fn store(&self) -> &Arc<dyn FeedbackStore> {
        &self.store
    }

    /// Returns the publish capability.
    pub fn publisher(&self) -> &Arc<dyn FeedbackPublisher> {
        &self.publisher
    }

    /// Validates, persists and publishes a new record.
    ///
    /// A publish failure is reported, but the record stays stored.
    pub async fn create(&self, input: FeedbackInput) -> FeedbackResult<FeedbackId> {
        validate_input(&input)?;

        let record = self.store.create(&input).await?;

        let message = FeedbackMessage::from(&record);
        if let Err(e) = self.publisher.publish(&message).await {
            tracing::error!(
                feedback_id = %record.id,
                topic = %self.publisher.topic(),
                error = %e,
                "Feedback stored but not published"
            );
            return Err(e.into());
        }

        tracing::info!(feedback_id = %record.id, "Feedback created");
        Ok(record.id)
    }

    /// Fetches a record by its string identifier.
    pub async fn get_by_id(&self, id: &str) -> FeedbackResult<Feedback> {
        let id = parse_id(id)?;
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| FeedbackError::not_found(id))
    }

    /// Returns every record in creation order.
    pub async fn get_all(&self) -> FeedbackResult<Vec<Feedback>> {
        let records = self.store.get_all().await?;
        tracing::debug!(count = records.len(), "Listed all feedback");
        Ok(records)
    }

    /// Returns one forward page.
    pub async fn get_page(&self, request: PageRequest) -> FeedbackResult<Page> {
        if request.limit == 0 {
            return Err(FeedbackError::invalid_parameter(
                "limit must be a positive integer",
            ));
        }

        let page = self.store.get_page(request).await?;
        tracing::debug!(
            limit = request.limit,
            cursor = ?request.cursor,
            count = page.len(),
            "Fetched feedback page"
        );
        Ok(page)
    }
}

impl std::fmt::Debug for FeedbackService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedbackService")
            .field("store", &self.store.name())
            .field("topic", &self.publisher.topic())
            .finish()
    }
}

// =============================================================================
// Parameter Parsing
// =============================================================================

/// Parses a record identifier.
pub fn parse_id(raw: &str) -> FeedbackResult<FeedbackId> {
    if raw.trim().is_empty() {
        return Err(FeedbackError::invalid_parameter("missing id"));
    }
    FeedbackId::parse(raw)
        .map_err(|_| FeedbackError::invalid_parameter(format!("'{raw}' is not a valid id")))
}

/// Builds a page request from raw `limit` and `next` query values.
///
/// An absent limit defaults to 10; a present one must be a positive integer.
/// An absent or empty cursor starts from the beginning.
pub fn parse_page_request(limit: Option<&str>, next: Option<&str>) -> FeedbackResult<PageRequest> {
    let limit = match limit {
        None => DEFAULT_PAGE_LIMIT,
        Some(raw) => match raw.trim().parse::<usize>() {
            Ok(n) if n > 0 => n,
            _ => {
                return Err(FeedbackError::invalid_parameter(format!(
                    "limit must be a positive integer, got '{raw}'"
                )))
            }
        },
    };

    let cursor = match next.map(str::trim).filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => Some(FeedbackId::parse(raw).map_err(|_| {
            FeedbackError::invalid_parameter(format!("next must be a valid id, got '{raw}'"))
        })?),
    };

    Ok(PageRequest { limit, cursor })
}
