//! Event transport types for domain event publishing.
//!
//! `EventEnvelope` wraps a serialized domain event with routing and
//! correlation context so transport adapters can publish without
//! knowing concrete event types.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::Timestamp;

/// Transport wrapper for domain events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique ID for this event instance, used for deduplication.
    pub event_id: Uuid,

    /// Event type string used for routing (e.g. "subscription.activated").
    pub event_type: String,

    /// ID of the aggregate that emitted this event.
    pub aggregate_id: String,

    /// When the event occurred.
    pub occurred_at: Timestamp,

    /// Serialized event payload.
    pub payload: JsonValue,
}

impl EventEnvelope {
    /// Creates an envelope with a fresh event ID.
    pub fn new(
        event_type: impl Into<String>,
        aggregate_id: impl Into<String>,
        occurred_at: Timestamp,
        payload: JsonValue,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type: event_type.into(),
            aggregate_id: aggregate_id.into(),
            occurred_at,
            payload,
        }
    }
}
