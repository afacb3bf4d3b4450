//! Subscription repository port.
//!
//! Defines the contract for persisting and retrieving Subscription rows.
//! Implementations handle the actual database operations.
//!
//! # Design
//!
//! - **One row per account**: the row is created once and mutated through
//!   its lifecycle, never replaced. The conditional insert enforces this,
//!   `find_latest_by_account` reads it back.
//! - **Race-safe bootstrap**: `insert_trial_if_absent` must be a single
//!   atomic operation, never a read followed by a write
//! - **Sweeper scans**: lapsed-row queries evaluate the clock in the
//!   store so the batch size stays bounded by what actually expired

use async_trait::async_trait;

use crate::domain::foundation::{AccountId, DomainError, SubscriptionId, Timestamp};
use crate::domain::subscription::{PlanDuration, Subscription};

/// Repository port for Subscription persistence.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert a fresh trial unless the account already holds any row.
    ///
    /// First writer wins: every concurrent caller receives the one
    /// surviving row, whether it inserted it or lost the race. An
    /// existing row is returned untouched regardless of status, so a
    /// lapsed account can never re-enter a trial through this path.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn insert_trial_if_absent(
        &self,
        trial: &Subscription,
    ) -> Result<Subscription, DomainError>;

    /// Save a new subscription row.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError>;

    /// Update an existing subscription row.
    ///
    /// # Errors
    ///
    /// - `SubscriptionNotFound` if the row doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError>;

    /// Find a subscription by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &SubscriptionId)
        -> Result<Option<Subscription>, DomainError>;

    /// Find the most recent subscription for an account, any status.
    async fn find_latest_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<Subscription>, DomainError>;

    /// Find the most recent pending subscription matching a paid order.
    ///
    /// Returns `None` when the order was already consumed or never
    /// existed, which is how webhook replays are absorbed.
    async fn find_pending_for_order(
        &self,
        account_id: &AccountId,
        duration: PlanDuration,
    ) -> Result<Option<Subscription>, DomainError>;

    /// Find trial rows whose window elapsed as of `now`.
    ///
    /// Used by the expiry sweeper.
    async fn find_lapsed_trials(&self, now: Timestamp)
        -> Result<Vec<Subscription>, DomainError>;

    /// Find active rows whose paid window elapsed as of `now`.
    ///
    /// Used by the expiry sweeper.
    async fn find_lapsed_actives(
        &self,
        now: Timestamp,
    ) -> Result<Vec<Subscription>, DomainError>;
}
