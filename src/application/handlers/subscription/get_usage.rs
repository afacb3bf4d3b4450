//! Usage overview query handler.
//!
//! Informational counts for the billing screen: plan clock, store and
//! staff headcounts, ledger totals. Non-gating, and deliberately
//! forgiving: the directory and ledger reads degrade to zero when
//! unavailable rather than failing the whole read.

use std::sync::Arc;

use crate::domain::foundation::{AccountId, DomainError};
use crate::domain::subscription::SubscriptionStatus;
use crate::ports::{AccountDirectory, PaymentHistoryRepository, SubscriptionRepository};

/// Query for an account's usage overview.
#[derive(Debug, Clone)]
pub struct GetUsageQuery {
    pub account_id: AccountId,
}

/// Result of a usage read.
#[derive(Debug, Clone)]
pub struct GetUsageResult {
    /// Current status, `None` when the account holds no row.
    pub status: Option<SubscriptionStatus>,
    pub days_remaining: u32,
    pub store_count: u64,
    pub staff_count: u64,
    pub payment_count: u64,
    pub total_paid: i64,
}

/// Handler for the usage overview.
pub struct GetUsageHandler {
    subscription_repository: Arc<dyn SubscriptionRepository>,
    account_directory: Arc<dyn AccountDirectory>,
    payment_history: Arc<dyn PaymentHistoryRepository>,
}

impl GetUsageHandler {
    pub fn new(
        subscription_repository: Arc<dyn SubscriptionRepository>,
        account_directory: Arc<dyn AccountDirectory>,
        payment_history: Arc<dyn PaymentHistoryRepository>,
    ) -> Self {
        Self {
            subscription_repository,
            account_directory,
            payment_history,
        }
    }

    /// # Errors
    ///
    /// - `DatabaseError` if the subscription read fails; the count
    ///   reads never error
    pub async fn handle(&self, query: GetUsageQuery) -> Result<GetUsageResult, DomainError> {
        let subscription = self
            .subscription_repository
            .find_latest_by_account(&query.account_id)
            .await?;

        let store_count = degrade_to_zero(
            "store count",
            self.account_directory.count_stores(&query.account_id).await,
        );
        let staff_count = degrade_to_zero(
            "staff count",
            self.account_directory.count_staff(&query.account_id).await,
        );
        let payment_count = degrade_to_zero(
            "payment count",
            self.payment_history.count_by_account(&query.account_id).await,
        );
        let total_paid = degrade_to_zero(
            "total paid",
            self.payment_history
                .total_paid_by_account(&query.account_id)
                .await,
        );

        Ok(GetUsageResult {
            status: subscription.as_ref().map(|s| s.status),
            days_remaining: subscription.map(|s| s.days_remaining()).unwrap_or(0),
            store_count,
            staff_count,
            payment_count,
            total_paid,
        })
    }
}

fn degrade_to_zero<T: Default>(what: &str, result: Result<T, DomainError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "Usage {what} unavailable, reading as zero");
            T::default()
        }
    }
}
