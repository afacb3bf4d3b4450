//! Trial bootstrap command handler.
//!
//! Creates the 14-day trial an owner receives on first contact with a
//! gated route. Safe under concurrent first-requests for the same new
//! owner: the conditional insert is atomic and every caller receives
//! the one surviving row.

use std::sync::Arc;

use crate::domain::foundation::{AccountId, DomainError, SubscriptionId, Timestamp};
use crate::domain::subscription::{Subscription, SubscriptionEvent};
use crate::ports::{EventPublisher, SubscriptionRepository};

/// Command to ensure an owner account holds a subscription row.
#[derive(Debug, Clone)]
pub struct BootstrapTrialCommand {
    pub account_id: AccountId,
}

/// Result of a trial bootstrap.
#[derive(Debug, Clone)]
pub struct BootstrapTrialResult {
    /// The surviving row, freshly inserted or already present.
    pub subscription: Subscription,

    /// Whether this call inserted the row.
    pub created: bool,
}

/// Handler for lazy trial creation.
pub struct BootstrapTrialHandler {
    subscription_repository: Arc<dyn SubscriptionRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl BootstrapTrialHandler {
    pub fn new(
        subscription_repository: Arc<dyn SubscriptionRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            subscription_repository,
            event_publisher,
        }
    }

    /// Ensures the account holds a subscription row, inserting a fresh
    /// trial when none exists. An existing row comes back untouched, so
    /// a lapsed account cannot re-enter a trial here.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` if the conditional insert fails
    pub async fn handle(
        &self,
        command: BootstrapTrialCommand,
    ) -> Result<BootstrapTrialResult, DomainError> {
        // 1. Build the candidate trial row
        let candidate = Subscription::create_trial(SubscriptionId::new(), command.account_id);

        // 2. Atomic insert-if-absent: first writer wins
        let subscription = self
            .subscription_repository
            .insert_trial_if_absent(&candidate)
            .await?;
        let created = subscription.id == candidate.id;

        // 3. Announce the new trial (best effort, the row is already durable)
        if created {
            if let Some(ends_at) = subscription.trial_ends_at {
                let event = SubscriptionEvent::TrialStarted {
                    subscription_id: subscription.id,
                    account_id: subscription.account_id,
                    ends_at,
                    occurred_at: Timestamp::now(),
                };
                if let Err(e) = self.event_publisher.publish(event.to_envelope()).await {
                    tracing::warn!(
                        account_id = %subscription.account_id,
                        error = %e,
                        "Failed to publish trial started event"
                    );
                }
            }
        }

        Ok(BootstrapTrialResult {
            subscription,
            created,
        })
    }
}
