//! Current subscription query handler.
//!
//! Backs the billing self-service "what plan am I on" read. Never
//! mutates: an account with no row gets the `None` summary rather than
//! a lazily created trial, which keeps this endpoint safe to poll.

use std::sync::Arc;

use crate::domain::foundation::{AccountId, DomainError};
use crate::domain::subscription::SubscriptionSummary;
use crate::ports::SubscriptionRepository;

/// Query for the caller's current subscription.
#[derive(Debug, Clone)]
pub struct GetSubscriptionQuery {
    pub account_id: AccountId,
}

/// Result of a current-subscription query.
#[derive(Debug, Clone)]
pub struct GetSubscriptionResult {
    pub summary: SubscriptionSummary,

    /// Whole days left on the status-appropriate clock, zero when no
    /// clock applies.
    pub days_remaining: u32,
}

/// Handler for the current-subscription read.
pub struct GetSubscriptionHandler {
    subscription_repository: Arc<dyn SubscriptionRepository>,
}

impl GetSubscriptionHandler {
    pub fn new(subscription_repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self {
            subscription_repository,
        }
    }

    /// # Errors
    ///
    /// - `DatabaseError` if the lookup fails
    pub async fn handle(
        &self,
        query: GetSubscriptionQuery,
    ) -> Result<GetSubscriptionResult, DomainError> {
        let subscription = self
            .subscription_repository
            .find_latest_by_account(&query.account_id)
            .await?;

        Ok(GetSubscriptionResult {
            summary: SubscriptionSummary::from_subscription(subscription.as_ref()),
            days_remaining: subscription.map(|s| s.days_remaining()).unwrap_or(0),
        })
    }
}
