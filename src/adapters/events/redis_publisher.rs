//! Redis-backed event publisher for production deployments.
//!
//! Publishes event envelopes as JSON on a single pub/sub channel. The
//! platform's realtime gateway subscribes and fans events out to
//! connected clients; nothing in this service consumes them.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::EventPublisher;

/// Default pub/sub channel for billing events.
const DEFAULT_CHANNEL: &str = "tillflow.events";

/// Redis pub/sub implementation of the EventPublisher port.
#[derive(Clone)]
pub struct RedisEventPublisher {
    conn: MultiplexedConnection,
    channel: String,
}

impl RedisEventPublisher {
    /// Create a publisher on the default channel.
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            channel: DEFAULT_CHANNEL.to_string(),
        }
    }

    /// Set a custom channel name.
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }
}

#[async_trait]
impl EventPublisher for RedisEventPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let payload = serde_json::to_string(&event).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Failed to serialize event: {}", e),
            )
        })?;

        // MultiplexedConnection is a cheap handle; commands need &mut.
        let mut conn = self.conn.clone();
        let _: i64 = conn.publish(&self.channel, payload).await.map_err(|e| {
            DomainError::new(
                ErrorCode::CacheError,
                format!("Failed to publish event: {}", e),
            )
        })?;

        tracing::debug!(
            event_type = %event.event_type,
            aggregate_id = %event.aggregate_id,
            "Event published"
        );

        Ok(())
    }

    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}
