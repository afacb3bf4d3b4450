//! Payment history query handler.

use std::sync::Arc;

use crate::domain::foundation::{AccountId, DomainError};
use crate::domain::subscription::PaymentHistoryRecord;
use crate::ports::PaymentHistoryRepository;

/// Query for an account's payment ledger.
#[derive(Debug, Clone)]
pub struct GetPaymentHistoryQuery {
    pub account_id: AccountId,
}

/// Result of a ledger read, newest first.
#[derive(Debug, Clone)]
pub struct GetPaymentHistoryResult {
    pub records: Vec<PaymentHistoryRecord>,
}

/// Handler for the ledger read.
pub struct GetPaymentHistoryHandler {
    payment_history: Arc<dyn PaymentHistoryRepository>,
}

impl GetPaymentHistoryHandler {
    pub fn new(payment_history: Arc<dyn PaymentHistoryRepository>) -> Self {
        Self { payment_history }
    }

    /// # Errors
    ///
    /// - `DatabaseError` if the read fails
    pub async fn handle(
        &self,
        query: GetPaymentHistoryQuery,
    ) -> Result<GetPaymentHistoryResult, DomainError> {
        let records = self
            .payment_history
            .list_by_account(&query.account_id)
            .await?;
        Ok(GetPaymentHistoryResult { records })
    }
}
