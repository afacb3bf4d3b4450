//! Subscription domain events.
//!
//! Events emitted during billing lifecycle changes, consumed by the
//! real-time channel and the notification collaborator. Delivery is
//! best-effort everywhere: a lost event never rolls back a transition.
//!
//! # Event Naming Convention
//!
//! Events are named in past tense to indicate something that has already
//! happened: `Activated` not `Activate`.

use crate::domain::foundation::{AccountId, EventEnvelope, SubscriptionId, Timestamp};
use serde::{Deserialize, Serialize};

use super::{PaymentMethod, PlanDuration};

/// Events that occur during the subscription lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionEvent {
    /// A trial was bootstrapped for a first-seen owner.
    TrialStarted {
        subscription_id: SubscriptionId,
        account_id: AccountId,
        ends_at: Timestamp,
        occurred_at: Timestamp,
    },

    /// A paid plan was activated.
    ///
    /// Trigger: payment webhook confirmation, or operator activation.
    Activated {
        subscription_id: SubscriptionId,
        account_id: AccountId,
        duration: PlanDuration,
        expires_at: Timestamp,
        method: PaymentMethod,
        occurred_at: Timestamp,
    },

    /// An unexpired paid plan was extended.
    ///
    /// Trigger: operator activation on a non-expired ACTIVE row.
    Renewed {
        subscription_id: SubscriptionId,
        account_id: AccountId,
        duration: PlanDuration,
        new_expires_at: Timestamp,
        method: PaymentMethod,
        occurred_at: Timestamp,
    },
}

impl SubscriptionEvent {
    /// Returns the event type string for routing and filtering.
    pub fn event_type(&self) -> &'static str {
        match self {
            SubscriptionEvent::TrialStarted { .. } => "subscription.trial_started",
            SubscriptionEvent::Activated { .. } => "subscription.activated",
            SubscriptionEvent::Renewed { .. } => "subscription.renewed",
        }
    }

    /// Returns the account this event concerns.
    pub fn account_id(&self) -> AccountId {
        match self {
            SubscriptionEvent::TrialStarted { account_id, .. }
            | SubscriptionEvent::Activated { account_id, .. }
            | SubscriptionEvent::Renewed { account_id, .. } => *account_id,
        }
    }

    /// Returns when this event occurred.
    pub fn occurred_at(&self) -> Timestamp {
        match self {
            SubscriptionEvent::TrialStarted { occurred_at, .. }
            | SubscriptionEvent::Activated { occurred_at, .. }
            | SubscriptionEvent::Renewed { occurred_at, .. } => *occurred_at,
        }
    }

    /// Wraps this event in a transport envelope.
    pub fn to_envelope(&self) -> EventEnvelope {
        EventEnvelope::new(
            self.event_type(),
            self.account_id().to_string(),
            self.occurred_at(),
            serde_json::to_value(self)
                .expect("event serialization never fails for well-formed events"),
        )
    }
}
