// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Redis pub/sub publisher.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::Client;

use super::FeedbackPublisher;
use crate::error::PublishResult;
use crate::types::FeedbackMessage;

/// Publishes JSON-encoded messages to a Redis channel.
pub struct RedisPublisher {
    connection: ConnectionManager,
    topic: String,
}

impl RedisPublisher {
    /// Connects to `url`, publishing to `topic`.
    pub async fn connect(url: &str, topic: impl Into<String>) -> PublishResult<Self> {
        let client = Client::open(url)?;
        let connection = client.get_connection_manager().await?;
        let topic = topic.into();

        tracing::info!(topic = %topic, "Connected to Redis broker");
        Ok(Self { connection, topic })
    }
}

#[async_trait]
impl FeedbackPublisher for RedisPublisher {
    async fn publish(&self, message: &FeedbackMessage) -> PublishResult<()> {
        let payload = serde_json::to_vec(message)?;

        let mut conn = self.connection.clone();
        let receivers: i64 = redis::cmd("PUBLISH")
            .arg(&self.topic)
            .arg(payload)
            .query_async(&mut conn)
            .await?;

        tracing::debug!(
            topic = %self.topic,
            feedback_id = %message.id,
            receivers,
            "Published feedback"
        );
        Ok(())
    }

    fn topic(&self) -> &str {
        &self.topic
    }
}

impl std::fmt::Debug for RedisPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPublisher")
            .field("topic", &self.topic)
            .finish()
    }
}
