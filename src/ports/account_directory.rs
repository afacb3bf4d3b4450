//! Account directory port.
//!
//! Defines the contract against the platform's account and store
//! services: staff-to-owner resolution for the entitlement gate, the
//! denormalized premium mirror, and headcounts for usage reporting.
//!
//! # Design
//!
//! - **Mirror, not source of truth**: `set_premium` writes a denormalized
//!   boolean other platform services read cheaply. The Subscription row
//!   remains authoritative and the mirror is independently retryable.
//! - **Resolution can dead-end**: a staff account between assignments has
//!   no current store; callers decide what that means.

use async_trait::async_trait;

use crate::domain::foundation::{AccountId, DomainError, StoreId};

/// Port for account and store directory lookups.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Store a staff account is currently assigned to.
    ///
    /// Returns `None` when the staff member has no current assignment.
    async fn current_store_of(&self, staff_id: &AccountId)
        -> Result<Option<StoreId>, DomainError>;

    /// Account owning a store.
    ///
    /// Returns `None` when the store doesn't exist or is orphaned.
    async fn owner_of_store(&self, store_id: &StoreId) -> Result<Option<AccountId>, DomainError>;

    /// Write the denormalized premium flag on an account.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if the account doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn set_premium(&self, account_id: &AccountId, is_premium: bool)
        -> Result<(), DomainError>;

    /// Number of stores the owner operates.
    async fn count_stores(&self, owner_id: &AccountId) -> Result<u64, DomainError>;

    /// Number of staff across the owner's stores.
    async fn count_staff(&self, owner_id: &AccountId) -> Result<u64, DomainError>;
}
