// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-process topic built on `tokio::sync::broadcast`.
//!
//! Publishing with no subscribers succeeds; the message is simply not
//! retained. Slow subscribers lose the oldest messages once the channel
//! capacity is exceeded.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::broadcast;

use super::FeedbackPublisher;
use crate::error::{PublishError, PublishResult};
use crate::types::FeedbackMessage;

/// Topic statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TopicStats {
    /// Messages accepted by the topic.
    pub messages_published: u64,
    /// Messages lost by lagging subscribers.
    pub messages_dropped: u64,
    /// Current number of subscribers.
    pub subscriber_count: u64,
}

#[derive(Debug, Default)]
struct AtomicTopicStats {
    messages_published: AtomicU64,
    messages_dropped: AtomicU64,
}

/// A broadcast topic for created feedback.
pub struct MemoryTopic {
    name: String,
    sender: broadcast::Sender<FeedbackMessage>,
    capacity: usize,
    closed: AtomicBool,
    stats: Arc<AtomicTopicStats>,
}

impl MemoryTopic {
    /// Creates a topic buffering up to `capacity` messages per subscriber.
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            name: name.into(),
            sender,
            capacity: capacity.max(1),
            closed: AtomicBool::new(false),
            stats: Arc::new(AtomicTopicStats::default()),
        }
    }

    /// Creates a new subscriber that sees messages published from now on.
    pub fn subscribe(&self) -> TopicSubscriber {
        TopicSubscriber {
            receiver: self.sender.subscribe(),
            stats: self.stats.clone(),
        }
    }

    /// Returns the current number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Returns the channel capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` once [`FeedbackPublisher::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Returns current statistics.
    pub fn stats(&self) -> TopicStats {
        TopicStats {
            messages_published: self.stats.messages_published.load(Ordering::Relaxed),
            messages_dropped: self.stats.messages_dropped.load(Ordering::Relaxed),
            subscriber_count: self.subscriber_count() as u64,
        }
    }
}

#[async_trait]
impl FeedbackPublisher for MemoryTopic {
    async fn publish(&self, message: &FeedbackMessage) -> PublishResult<()> {
        if self.is_closed() {
            return Err(PublishError::Closed {
                topic: self.name.clone(),
            });
        }

        // No receivers is not an error for a fire-and-forget topic.
        let receivers = self.sender.send(message.clone()).unwrap_or(0);
        self.stats.messages_published.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            topic = %self.name,
            feedback_id = %message.id,
            receivers,
            "Published feedback"
        );
        Ok(())
    }

    fn topic(&self) -> &str {
        &self.name
    }

    async fn close(&self) -> PublishResult<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

impl std::fmt::Debug for MemoryTopic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTopic")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

/// A subscriber to a [`MemoryTopic`].
pub struct TopicSubscriber {
    receiver: broadcast::Receiver<FeedbackMessage>,
    stats: Arc<AtomicTopicStats>,
}

impl TopicSubscriber {
    /// Receives the next message, or `None` once the topic is dropped.
    pub async fn recv(&mut self) -> Option<FeedbackMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(msg) => return Some(msg),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    self.stats.messages_dropped.fetch_add(count, Ordering::Relaxed);
                    tracing::warn!(count, "Topic subscriber lagged, messages dropped");
                }
            }
        }
    }

    /// Receives a message without waiting.
    pub fn try_recv(&mut self) -> Option<FeedbackMessage> {
        loop {
            match self.receiver.try_recv() {
                Ok(msg) => return Some(msg),
                Err(broadcast::error::TryRecvError::Lagged(count)) => {
                    self.stats.messages_dropped.fetch_add(count, Ordering::Relaxed);
                }
                Err(_) => return None,
            }
        }
    }
}
