// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Broker capability.
//!
//! Every created record is published once to a named topic as JSON. Delivery
//! guarantees belong to the backend:
//!
//! - [`MemoryTopic`]: in-process `tokio::sync::broadcast` fan-out
//! - [`RedisPublisher`]: `PUBLISH <topic> <json>` on a Redis channel

mod memory;
mod redis;

pub use self::memory::{MemoryTopic, TopicStats, TopicSubscriber};
pub use self::redis::RedisPublisher;

use async_trait::async_trait;

use crate::error::PublishResult;
use crate::types::FeedbackMessage;

/// Default topic name for created feedback.
pub const DEFAULT_TOPIC: &str = "feedbacks";

/// The publish capability consumed by the feedback service.
#[async_trait]
pub trait FeedbackPublisher: Send + Sync {
    /// Publishes one message.
    async fn publish(&self, message: &FeedbackMessage) -> PublishResult<()>;

    /// Returns the topic name messages go to.
    fn topic(&self) -> &str;

    /// Releases backend resources. Further publishes may fail.
    async fn close(&self) -> PublishResult<()> {
        Ok(())
    }
}
