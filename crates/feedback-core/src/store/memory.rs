// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory storage backend.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

use super::FeedbackStore;
use crate::error::StorageResult;
use crate::types::{Feedback, FeedbackId, FeedbackInput, Page, PageRequest};

type OrderKey = (DateTime<Utc>, FeedbackId);

#[derive(Default)]
struct Inner {
    ordered: BTreeMap<OrderKey, Feedback>,
    index: HashMap<FeedbackId, OrderKey>,
    last_created: Option<DateTime<Utc>>,
}

/// Ordered in-process table.
///
/// Creation timestamps are strictly increasing within one store, so
/// insertion order and page order always agree.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.inner.read().ordered.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts a fully-formed record, keeping its timestamps.
    pub fn insert(&self, record: Feedback) {
        let mut inner = self.inner.write();
        let key = record.order_key();
        if let Some(old) = inner.index.insert(record.id, key) {
            inner.ordered.remove(&old);
        }
        inner.last_created = inner.last_created.max(Some(record.created_at));
        inner.ordered.insert(key, record);
    }
}

#[async_trait]
impl FeedbackStore for MemoryStore {
    async fn create(&self, input: &FeedbackInput) -> StorageResult<Feedback> {
        let mut inner = self.inner.write();

        let mut created_at = Utc::now();
        if let Some(last) = inner.last_created {
            if created_at <= last {
                created_at = last + Duration::microseconds(1);
            }
        }

        let record = Feedback::from_input(FeedbackId::new(), input, created_at);
        let key = record.order_key();
        inner.last_created = Some(created_at);
        inner.index.insert(record.id, key);
        inner.ordered.insert(key, record.clone());

        tracing::debug!(feedback_id = %record.id, "Stored feedback in memory");
        Ok(record)
    }

    async fn get_by_id(&self, id: FeedbackId) -> StorageResult<Option<Feedback>> {
        let inner = self.inner.read();
        Ok(inner
            .index
            .get(&id)
            .and_then(|key| inner.ordered.get(key))
            .cloned())
    }

    async fn get_all(&self) -> StorageResult<Vec<Feedback>> {
        Ok(self.inner.read().ordered.values().cloned().collect())
    }

    async fn get_page(&self, request: PageRequest) -> StorageResult<Page> {
        let inner = self.inner.read();

        let lower = match request.cursor {
            None => Bound::Unbounded,
            Some(cursor) => match inner.index.get(&cursor) {
                Some(key) => Bound::Excluded(*key),
                None => return Ok(Page::default()),
            },
        };

        let items = inner
            .ordered
            .range((lower, Bound::Unbounded))
            .take(request.limit)
            .map(|(_, record)| record.clone())
            .collect();

        Ok(Page::new(items))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("records", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(n: usize) -> FeedbackInput {
        FeedbackInput::new(
            format!("customer-{n}"),
            format!("c{n}@example.com"),
            format!("feedback {n}"),
            "https://example.com",
        )
    }

    async fn seeded(n: usize) -> (MemoryStore, Vec<Feedback>) {
        let store = MemoryStore::new();
        let mut created = Vec::new();
        for i in 0..n {
            created.push(store.create(&input(i)).await.unwrap());
        }
        (store, created)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemoryStore::new();
        let record = store.create(&input(1)).await.unwrap();

        let fetched = store.get_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(fetched, record);
        assert_eq!(fetched.created_at, fetched.updated_at);
        assert!(store.get_by_id(FeedbackId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_created_at_strictly_increasing() {
        let (_, created) = seeded(50).await;
        for pair in created.windows(2) {
            assert!(pair[0].created_at < pair[1].created_at);
        }
    }

    #[tokio::test]
    async fn test_get_all_in_creation_order() {
        let (store, created) = seeded(5).await;
        assert_eq!(store.get_all().await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_page_walk_visits_every_record_once() {
        let (store, created) = seeded(7).await;

        let mut seen = Vec::new();
        let mut request = PageRequest::first(3);
        loop {
            let page = store.get_page(request).await.unwrap();
            if page.is_empty() {
                assert!(page.next_cursor.is_none());
                break;
            }
            let cursor = page.next_cursor.unwrap();
            seen.extend(page.items);
            request = PageRequest::after(3, cursor);
        }

        assert_eq!(seen, created);
    }

    #[tokio::test]
    async fn test_unknown_cursor_yields_empty_page() {
        let (store, _) = seeded(3).await;
        let page = store
            .get_page(PageRequest::after(10, FeedbackId::new()))
            .await
            .unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_last_cursor_yields_empty_page() {
        let (store, created) = seeded(3).await;
        let page = store
            .get_page(PageRequest::after(10, created[2].id))
            .await
            .unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_identical_timestamps_tie_break_on_id() {
        let store = MemoryStore::new();
        let at = Utc::now();
        let mut ids: Vec<FeedbackId> = (0..4).map(|_| FeedbackId::new()).collect();
        for id in ids.iter().rev() {
            store.insert(Feedback::from_input(*id, &input(0), at));
        }
        ids.sort();

        let first = store.get_page(PageRequest::first(2)).await.unwrap();
        assert_eq!(first.items.iter().map(|f| f.id).collect::<Vec<_>>(), ids[..2]);

        let second = store
            .get_page(PageRequest::after(2, ids[1]))
            .await
            .unwrap();
        assert_eq!(second.items.iter().map(|f| f.id).collect::<Vec<_>>(), ids[2..]);
    }
}
