//! Checkout initiation command handler.
//!
//! Turns a plan choice into an external payment link. The subscription
//! row moves to PENDING with the order reference recorded, so the
//! webhook can later match the payment back. No entitlement changes
//! until the provider confirms.

use std::sync::Arc;

use crate::domain::foundation::{AccountId, DomainError, SubscriptionId};
use crate::domain::subscription::{
    OrderCode, PendingCheckout, PlanDuration, PlanOffer, Subscription, SubscriptionError,
    SubscriptionStatus,
};
use crate::ports::{CheckoutRequest, PaymentGateway, SubscriptionRepository};

/// Command to start a checkout for a plan.
#[derive(Debug, Clone)]
pub struct StartCheckoutCommand {
    pub account_id: AccountId,

    /// Requested plan length in months, validated against the catalog.
    pub duration_months: u32,
}

/// Result of a started checkout.
#[derive(Debug, Clone)]
pub struct StartCheckoutResult {
    pub checkout_url: String,
    pub qr_data_url: String,
    pub amount: i64,

    /// Order reference the webhook will echo back.
    pub order_code: String,
}

/// Handler for checkout initiation.
pub struct StartCheckoutHandler {
    subscription_repository: Arc<dyn SubscriptionRepository>,
    payment_gateway: Arc<dyn PaymentGateway>,
}

impl StartCheckoutHandler {
    pub fn new(
        subscription_repository: Arc<dyn SubscriptionRepository>,
        payment_gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            subscription_repository,
            payment_gateway,
        }
    }

    /// Starts a checkout: validates the plan, requests a payment link,
    /// and parks the subscription in PENDING with the order reference.
    ///
    /// # Errors
    ///
    /// - `PLAN_INVALID` if the duration is not in the catalog
    /// - `ALREADY_ACTIVE` if the account holds an unexpired ACTIVE row
    ///   (renewals go through operator activation, not a new checkout)
    /// - `PAYMENT_GATEWAY_ERROR` if the provider call fails
    /// - `DatabaseError` if persistence fails
    pub async fn handle(
        &self,
        command: StartCheckoutCommand,
    ) -> Result<StartCheckoutResult, DomainError> {
        // 1. Validate the plan against the fixed catalog
        let duration = PlanDuration::from_months(command.duration_months)
            .map_err(|_| SubscriptionError::invalid_plan(command.duration_months))?;
        let offer = PlanOffer::for_duration(duration);

        // 2. An unexpired ACTIVE row cannot start a new checkout
        let existing = self
            .subscription_repository
            .find_latest_by_account(&command.account_id)
            .await?;
        if let Some(row) = &existing {
            if row.status == SubscriptionStatus::Active && !row.is_expired() {
                return Err(SubscriptionError::already_active(command.account_id).into());
            }
        }

        // 3. Request the payment link with a fresh order reference
        let order_code = OrderCode::issue(command.account_id, duration);
        let link = self
            .payment_gateway
            .create_checkout(CheckoutRequest {
                order_code: order_code.to_string(),
                amount: offer.amount,
                description: format!("Tillflow subscription, {}", offer.display_name),
            })
            .await?;

        // 4. Park the row in PENDING with the order reference recorded
        let pending = PendingCheckout::new(
            order_code.to_string(),
            offer.amount,
            duration,
            link.checkout_url.clone(),
            link.qr_data_url.clone(),
        );
        match existing {
            Some(mut row) => {
                row.mark_pending_payment(pending)?;
                self.subscription_repository.update(&row).await?;
            }
            None => {
                let row =
                    Subscription::create_pending(SubscriptionId::new(), command.account_id, pending);
                self.subscription_repository.save(&row).await?;
            }
        }

        Ok(StartCheckoutResult {
            checkout_url: link.checkout_url,
            qr_data_url: link.qr_data_url,
            amount: offer.amount,
            order_code: order_code.to_string(),
        })
    }
}
