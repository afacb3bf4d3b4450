//! Payment webhook command handler.
//!
//! Consumes the signed confirmation the payment provider posts after a
//! checkout settles. Every step up to persistence is a hard gate with
//! no partial effect: signature over the raw bytes, order-code shape,
//! then the PENDING row lookup. Replays are absorbed because a consumed
//! order finds no PENDING row. Only the tail (premium mirror, realtime
//! event, notification) is best effort.

use std::sync::Arc;

use crate::domain::foundation::Timestamp;
use crate::domain::subscription::{
    ActivationKind, OrderCode, PaymentHistoryRecord, PaymentMethod, PayosWebhookVerifier,
    PlanDuration, Subscription, SubscriptionEvent, WebhookError,
};
use crate::ports::{
    AccountDirectory, EventPublisher, Notice, NotificationStore, PaymentHistoryRepository,
    SubscriptionRepository,
};

/// Command carrying one webhook delivery exactly as received.
#[derive(Debug, Clone)]
pub struct ProcessPaymentWebhookCommand {
    /// Raw request body bytes, verbatim. The signature covers these
    /// bytes, never a re-serialized copy.
    pub raw_body: Vec<u8>,

    /// Value of the provider signature header, if present.
    pub signature: Option<String>,
}

/// Result of a consumed webhook.
#[derive(Debug, Clone)]
pub struct ProcessPaymentWebhookResult {
    pub subscription: Subscription,
    pub order_code: String,
    pub duration: PlanDuration,
}

/// Handler for provider payment confirmations.
pub struct ProcessPaymentWebhookHandler {
    /// Absent when no webhook secret is configured; every delivery is
    /// then rejected before any work happens.
    verifier: Option<PayosWebhookVerifier>,
    subscription_repository: Arc<dyn SubscriptionRepository>,
    payment_history: Arc<dyn PaymentHistoryRepository>,
    account_directory: Arc<dyn AccountDirectory>,
    event_publisher: Arc<dyn EventPublisher>,
    notification_store: Arc<dyn NotificationStore>,
}

impl ProcessPaymentWebhookHandler {
    pub fn new(
        verifier: Option<PayosWebhookVerifier>,
        subscription_repository: Arc<dyn SubscriptionRepository>,
        payment_history: Arc<dyn PaymentHistoryRepository>,
        account_directory: Arc<dyn AccountDirectory>,
        event_publisher: Arc<dyn EventPublisher>,
        notification_store: Arc<dyn NotificationStore>,
    ) -> Self {
        Self {
            verifier,
            subscription_repository,
            payment_history,
            account_directory,
            event_publisher,
            notification_store,
        }
    }

    /// Verifies and applies one delivery.
    ///
    /// # Errors
    ///
    /// - `MissingSecret` when no secret is configured
    /// - `MissingSignature` / `InvalidSignature` on a failed signature
    ///   check
    /// - `ParseError` when the body is not the provider's JSON shape
    /// - `ForeignOrderCode` when the order code is not one of ours
    ///   (acknowledged upstream, not retried)
    /// - `PendingNotFound` when the order was already consumed or never
    ///   issued
    /// - `Database` when a durable write fails
    pub async fn handle(
        &self,
        command: ProcessPaymentWebhookCommand,
    ) -> Result<ProcessPaymentWebhookResult, WebhookError> {
        // 1. A server without a configured secret can trust nothing
        let verifier = self.verifier.as_ref().ok_or(WebhookError::MissingSecret)?;

        // 2. Signature over the raw bytes
        let signature = command
            .signature
            .as_deref()
            .ok_or(WebhookError::MissingSignature)?;
        let event = verifier.verify_and_parse(&command.raw_body, signature)?;

        // 3. Only order codes of our fixed shape are ours to consume
        let order_code = OrderCode::parse(event.order_code())
            .map_err(|_| WebhookError::ForeignOrderCode(event.order_code().to_string()))?;
        let account_id = order_code.account_id();
        let duration = order_code.duration();

        // 4. A consumed or never-issued order finds no PENDING row
        let mut subscription = self
            .subscription_repository
            .find_pending_for_order(&account_id, duration)
            .await
            .map_err(|e| WebhookError::Database(e.to_string()))?
            .ok_or(WebhookError::PendingNotFound)?;

        if let Some(block) = &subscription.pending {
            if block.amount != event.amount() {
                tracing::warn!(
                    order_code = %order_code,
                    expected = block.amount,
                    received = event.amount(),
                    "Webhook amount differs from the checkout amount"
                );
            }
        }

        // 5. Activate and persist; this consumes the pending block
        subscription
            .activate(duration)
            .map_err(|e| WebhookError::InvalidTransition(e.to_string()))?;
        self.subscription_repository
            .update(&subscription)
            .await
            .map_err(|e| WebhookError::Database(e.to_string()))?;

        // 6. Ledger row for the settled payment
        let record = PaymentHistoryRecord::success(
            account_id,
            subscription.id,
            event.amount(),
            duration,
            PaymentMethod::Gateway,
            order_code.to_string(),
            ActivationKind::NewActivation,
        );
        self.payment_history
            .append(&record)
            .await
            .map_err(|e| WebhookError::Database(e.to_string()))?;

        // 7. Best-effort tail: mirror, realtime event, notification
        self.finish_best_effort(&subscription, duration).await;

        Ok(ProcessPaymentWebhookResult {
            subscription,
            order_code: order_code.to_string(),
            duration,
        })
    }

    /// Everything here may fail without rolling back the activation.
    /// The side paths are independent of each other, so they run joined.
    async fn finish_best_effort(&self, subscription: &Subscription, duration: PlanDuration) {
        let account_id = subscription.account_id;

        let mirror_premium = async {
            if let Err(e) = self.account_directory.set_premium(&account_id, true).await {
                tracing::warn!(
                    account_id = %account_id,
                    error = %e,
                    "Failed to mirror premium flag after webhook activation"
                );
            }
        };

        let announce = async {
            let Some(expires_at) = subscription.expires_at else {
                return;
            };

            let event = SubscriptionEvent::Activated {
                subscription_id: subscription.id,
                account_id,
                duration,
                expires_at,
                method: PaymentMethod::Gateway,
                occurred_at: Timestamp::now(),
            };
            let publish = async {
                if let Err(e) = self.event_publisher.publish(event.to_envelope()).await {
                    tracing::warn!(
                        account_id = %account_id,
                        error = %e,
                        "Failed to publish activation event"
                    );
                }
            };

            let notice = Notice::new(
                account_id,
                "Subscription activated",
                format!(
                    "Your {} plan is active until {}.",
                    duration.display_name(),
                    expires_at.as_datetime().format("%Y-%m-%d")
                ),
            );
            let notify = async {
                if let Err(e) = self.notification_store.record(&notice).await {
                    tracing::warn!(
                        account_id = %account_id,
                        error = %e,
                        "Failed to record activation notification"
                    );
                }
            };

            futures::future::join(publish, notify).await;
        };

        futures::future::join(mirror_premium, announce).await;
    }
}
