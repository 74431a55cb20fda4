// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core data types for the feedback service.
//!
//! Wire names follow the public JSON contract (`customerName`, `feedbackText`,
//! `createdAt`, ...), so every record type serializes in camelCase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Page size used when the caller does not supply one.
pub const DEFAULT_PAGE_LIMIT: usize = 10;

// =============================================================================
// Identifiers
// =============================================================================

/// A unique identifier for a feedback record.
///
/// Identifiers are assigned by the storage layer at creation and are never
/// reused. They are time-ordered (UUIDv7), so their natural ordering agrees
/// with creation order and serves as the pagination tie-break.
///
/// # Examples
///
/// ```
/// use feedback_core::types::FeedbackId;
///
/// let id = FeedbackId::new();
/// let parsed: FeedbackId = id.to_string().parse().unwrap();
/// assert_eq!(id, parsed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedbackId(Uuid);

impl FeedbackId {
    /// Generates a fresh identifier.
    #[inline]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wraps an existing UUID.
    #[inline]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[inline]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Parses an identifier from its canonical string form.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl Default for FeedbackId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FeedbackId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Uuid> for FeedbackId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<FeedbackId> for Uuid {
    fn from(id: FeedbackId) -> Self {
        id.0
    }
}

// =============================================================================
// Records
// =============================================================================

/// The submission payload for a new feedback record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackInput {
    /// Customer display name.
    pub customer_name: String,
    /// Contact address; must be a valid mail address.
    pub email: String,
    /// Free-form feedback body.
    pub feedback_text: String,
    /// Where the feedback came from; must be an absolute URL.
    pub source: String,
}

impl FeedbackInput {
    /// Creates a new input.
    pub fn new(
        customer_name: impl Into<String>,
        email: impl Into<String>,
        feedback_text: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            customer_name: customer_name.into(),
            email: email.into(),
            feedback_text: feedback_text.into(),
            source: source.into(),
        }
    }
}

/// A stored feedback record. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    /// Record identifier.
    pub id: FeedbackId,
    /// Customer display name.
    pub customer_name: String,
    /// Contact address.
    pub email: String,
    /// Free-form feedback body.
    pub feedback_text: String,
    /// Origin URL.
    pub source: String,
    /// Creation instant, assigned by storage.
    pub created_at: DateTime<Utc>,
    /// Last update instant, assigned by storage.
    pub updated_at: DateTime<Utc>,
}

impl Feedback {
    /// Builds a record from an input with the given identity and timestamp.
    pub fn from_input(id: FeedbackId, input: &FeedbackInput, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            customer_name: input.customer_name.clone(),
            email: input.email.clone(),
            feedback_text: input.feedback_text.clone(),
            source: input.source.clone(),
            created_at,
            updated_at: created_at,
        }
    }

    /// Composite ordering key: creation time, then identifier.
    #[inline]
    pub fn order_key(&self) -> (DateTime<Utc>, FeedbackId) {
        (self.created_at, self.id)
    }
}

/// The copy of a record published to the broker.
///
/// Timestamps are storage-owned and deliberately left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackMessage {
    /// Record identifier.
    pub id: FeedbackId,
    /// Customer display name.
    pub customer_name: String,
    /// Contact address.
    pub email: String,
    /// Free-form feedback body.
    pub feedback_text: String,
    /// Origin URL.
    pub source: String,
}

impl From<&Feedback> for FeedbackMessage {
    fn from(record: &Feedback) -> Self {
        Self {
            id: record.id,
            customer_name: record.customer_name.clone(),
            email: record.email.clone(),
            feedback_text: record.feedback_text.clone(),
            source: record.source.clone(),
        }
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// A forward-only page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Maximum number of records to return. Always positive.
    pub limit: usize,
    /// Identifier of the last record of the previous page.
    pub cursor: Option<FeedbackId>,
}

impl PageRequest {
    /// Creates a request for the first page.
    pub fn first(limit: usize) -> Self {
        Self { limit, cursor: None }
    }

    /// Creates a request resuming after `cursor`.
    pub fn after(limit: usize, cursor: FeedbackId) -> Self {
        Self {
            limit,
            cursor: Some(cursor),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_LIMIT)
    }
}

/// One page of records in `(created_at, id)` order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    /// Records on this page.
    pub items: Vec<Feedback>,
    /// Identifier of the last record on this page; `None` when empty.
    pub next_cursor: Option<FeedbackId>,
}

impl Page {
    /// Builds a page, deriving the cursor from the last item.
    pub fn new(items: Vec<Feedback>) -> Self {
        let next_cursor = items.last().map(|f| f.id);
        Self { items, next_cursor }
    }

    /// Returns `true` if the page holds no records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of records on the page.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> FeedbackInput {
        FeedbackInput::new("Ada", "ada@example.com", "great", "https://example.com/form")
    }

    #[test]
    fn test_feedback_id_parse_roundtrip() {
        let id = FeedbackId::new();
        assert_eq!(FeedbackId::parse(&id.to_string()).unwrap(), id);
        assert!(FeedbackId::parse("not-a-uuid").is_err());
        assert!(FeedbackId::parse("").is_err());
    }

    #[test]
    fn test_feedback_id_time_ordered() {
        let a = FeedbackId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = FeedbackId::new();
        assert!(a < b);
    }

    #[test]
    fn test_input_wire_names() {
        let json = serde_json::to_value(sample_input()).unwrap();
        assert_eq!(json["customerName"], "Ada");
        assert_eq!(json["feedbackText"], "great");
        assert!(json.get("customer_name").is_none());
    }

    #[test]
    fn test_message_has_no_timestamps() {
        let record = Feedback::from_input(FeedbackId::new(), &sample_input(), Utc::now());
        let json = serde_json::to_value(FeedbackMessage::from(&record)).unwrap();
        assert_eq!(json["id"], record.id.to_string());
        assert!(json.get("createdAt").is_none());
        assert!(json.get("updatedAt").is_none());
    }

    #[test]
    fn test_page_cursor_from_last_item() {
        assert_eq!(Page::new(vec![]).next_cursor, None);

        let now = Utc::now();
        let first = Feedback::from_input(FeedbackId::new(), &sample_input(), now);
        let second = Feedback::from_input(FeedbackId::new(), &sample_input(), now);
        let page = Page::new(vec![first, second.clone()]);
        assert_eq!(page.next_cursor, Some(second.id));
        assert_eq!(page.len(), 2);
    }

    #[test]
    fn test_default_page_request() {
        let req = PageRequest::default();
        assert_eq!(req.limit, DEFAULT_PAGE_LIMIT);
        assert!(req.cursor.is_none());
    }
}
