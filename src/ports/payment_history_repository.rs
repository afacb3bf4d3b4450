//! Payment history repository port.
//!
//! Defines the contract for the append-only payment ledger. Rows are
//! written on every successful activation and read back for audit and
//! usage reporting, never fed into the state machine.

use async_trait::async_trait;

use crate::domain::foundation::{AccountId, DomainError};
use crate::domain::subscription::PaymentHistoryRecord;

/// Repository port for the payment ledger.
#[async_trait]
pub trait PaymentHistoryRepository: Send + Sync {
    /// Append a ledger row.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn append(&self, record: &PaymentHistoryRecord) -> Result<(), DomainError>;

    /// List ledger rows for an account, newest first.
    async fn list_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<PaymentHistoryRecord>, DomainError>;

    /// Sum of successful payment amounts for an account.
    async fn total_paid_by_account(&self, account_id: &AccountId) -> Result<i64, DomainError>;

    /// Number of successful payments for an account.
    async fn count_by_account(&self, account_id: &AccountId) -> Result<u64, DomainError>;
}
