//! Auto-renew cancellation command handler.
//!
//! The only cancellation this subsystem offers is soft: renewal stops
//! at period end, access runs until the clock does.

use std::sync::Arc;

use crate::domain::foundation::{AccountId, DomainError};
use crate::domain::subscription::{Subscription, SubscriptionError};
use crate::ports::SubscriptionRepository;

/// Command to stop renewing at period end.
#[derive(Debug, Clone)]
pub struct CancelAutoRenewCommand {
    pub account_id: AccountId,
}

/// Result of a cancellation.
#[derive(Debug, Clone)]
pub struct CancelAutoRenewResult {
    pub subscription: Subscription,
}

/// Handler for soft cancellation.
pub struct CancelAutoRenewHandler {
    subscription_repository: Arc<dyn SubscriptionRepository>,
}

impl CancelAutoRenewHandler {
    pub fn new(subscription_repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self {
            subscription_repository,
        }
    }

    /// # Errors
    ///
    /// - `SUBSCRIPTION_NOT_FOUND` when the account holds no row
    /// - `DatabaseError` if the lookup or write fails
    pub async fn handle(
        &self,
        command: CancelAutoRenewCommand,
    ) -> Result<CancelAutoRenewResult, DomainError> {
        let mut subscription = self
            .subscription_repository
            .find_latest_by_account(&command.account_id)
            .await?
            .ok_or_else(|| SubscriptionError::not_found_for_account(command.account_id))?;

        subscription.cancel_auto_renew();
        self.subscription_repository.update(&subscription).await?;

        Ok(CancelAutoRenewResult { subscription })
    }
}
