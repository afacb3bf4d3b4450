//! Operator activation command handler.
//!
//! Records a payment collected outside the gateway (bank transfer,
//! cash, a support credit) against an external transaction id. A
//! non-expired ACTIVE subscription is renewed by stacking months onto
//! its current expiry; anything else becomes a fresh activation. Both
//! branches land in the payment ledger and flip the premium mirror.
//!
//! Idempotent only at the ledger level: a double submit extends twice
//! and writes two ledger rows.

use std::sync::Arc;

use crate::domain::foundation::{AccountId, DomainError, SubscriptionId, Timestamp};
use crate::domain::subscription::{
    ActivationKind, PaymentHistoryRecord, PaymentMethod, PlanDuration, Subscription,
    SubscriptionError, SubscriptionEvent, SubscriptionStatus,
};
use crate::ports::{
    AccountDirectory, EventPublisher, PaymentHistoryRepository, SubscriptionRepository,
};

/// Command to activate or renew a subscription by operator entry.
#[derive(Debug, Clone)]
pub struct ActivateSubscriptionCommand {
    pub account_id: AccountId,

    /// Plan length in months, validated against the catalog.
    pub duration_months: u32,

    /// Amount collected, in VND.
    pub amount: i64,

    /// External transaction reference supplied by the operator.
    pub transaction_id: String,
}

/// Result of an operator activation.
#[derive(Debug, Clone)]
pub struct ActivateSubscriptionResult {
    pub subscription: Subscription,

    /// The ledger row this activation appended.
    pub record: PaymentHistoryRecord,

    /// Whether the payment renewed a running plan or started one.
    pub kind: ActivationKind,
}

/// Handler for operator-entered activations.
pub struct ActivateSubscriptionHandler {
    subscription_repository: Arc<dyn SubscriptionRepository>,
    payment_history: Arc<dyn PaymentHistoryRepository>,
    account_directory: Arc<dyn AccountDirectory>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl ActivateSubscriptionHandler {
    pub fn new(
        subscription_repository: Arc<dyn SubscriptionRepository>,
        payment_history: Arc<dyn PaymentHistoryRepository>,
        account_directory: Arc<dyn AccountDirectory>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            subscription_repository,
            payment_history,
            account_directory,
            event_publisher,
        }
    }

    /// Applies the payment: renewal on a running plan, fresh activation
    /// otherwise, ledger row either way.
    ///
    /// # Errors
    ///
    /// - `PLAN_INVALID` if the duration is not in the catalog
    /// - `VALIDATION_FAILED` on a blank transaction id or non-positive
    ///   amount
    /// - `DatabaseError` if the row or ledger write fails
    pub async fn handle(
        &self,
        command: ActivateSubscriptionCommand,
    ) -> Result<ActivateSubscriptionResult, DomainError> {
        // 1. Validate inputs
        let duration = PlanDuration::from_months(command.duration_months)
            .map_err(|_| SubscriptionError::invalid_plan(command.duration_months))?;
        let transaction_id = command.transaction_id.trim();
        if transaction_id.is_empty() {
            return Err(DomainError::validation(
                "transaction_id",
                "Transaction id must not be empty",
            ));
        }
        if command.amount <= 0 {
            return Err(DomainError::validation(
                "amount",
                "Amount must be positive",
            ));
        }

        // 2. Renewal stacks onto a running plan, anything else activates fresh
        let existing = self
            .subscription_repository
            .find_latest_by_account(&command.account_id)
            .await?;
        let is_renewal = existing
            .as_ref()
            .is_some_and(|row| row.status == SubscriptionStatus::Active && !row.is_expired());

        let (mut subscription, is_new_row) = match existing {
            Some(row) => (row, false),
            None => (
                Subscription::materialize(SubscriptionId::new(), command.account_id),
                true,
            ),
        };
        let kind = if is_renewal {
            subscription.extend(duration)?;
            ActivationKind::Renewal
        } else {
            subscription.activate(duration)?;
            ActivationKind::NewActivation
        };

        // 3. Persist the row
        if is_new_row {
            self.subscription_repository.save(&subscription).await?;
        } else {
            self.subscription_repository.update(&subscription).await?;
        }

        // 4. Append the ledger row
        let record = PaymentHistoryRecord::success(
            command.account_id,
            subscription.id,
            command.amount,
            duration,
            PaymentMethod::Manual,
            transaction_id,
            kind,
        );
        self.payment_history.append(&record).await?;

        // 5. Mirror the premium flag (best effort, the row is the source of truth)
        if let Err(e) = self
            .account_directory
            .set_premium(&command.account_id, true)
            .await
        {
            tracing::warn!(
                account_id = %command.account_id,
                error = %e,
                "Failed to mirror premium flag after operator activation"
            );
        }

        // 6. Announce the activation (best effort)
        self.publish_event(&subscription, duration, kind).await;

        Ok(ActivateSubscriptionResult {
            subscription,
            record,
            kind,
        })
    }

    async fn publish_event(
        &self,
        subscription: &Subscription,
        duration: PlanDuration,
        kind: ActivationKind,
    ) {
        let Some(expires_at) = subscription.expires_at else {
            return;
        };
        let event = match kind {
            ActivationKind::NewActivation => SubscriptionEvent::Activated {
                subscription_id: subscription.id,
                account_id: subscription.account_id,
                duration,
                expires_at,
                method: PaymentMethod::Manual,
                occurred_at: Timestamp::now(),
            },
            ActivationKind::Renewal => SubscriptionEvent::Renewed {
                subscription_id: subscription.id,
                account_id: subscription.account_id,
                duration,
                new_expires_at: expires_at,
                method: PaymentMethod::Manual,
                occurred_at: Timestamp::now(),
            },
        };
        if let Err(e) = self.event_publisher.publish(event.to_envelope()).await {
            tracing::warn!(
                account_id = %subscription.account_id,
                error = %e,
                "Failed to publish activation event"
            );
        }
    }
}
