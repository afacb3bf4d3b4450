//! Subscription aggregate entity.
//!
//! The Subscription aggregate represents an owner account's billing state.
//! Each owner has at most one live Subscription (TRIAL, PENDING or ACTIVE);
//! historical EXPIRED/CANCELLED rows accumulate and are never deleted.
//!
//! # Design Decisions
//!
//! - **One live row per owner**: partial unique index on account_id over
//!   live statuses, enforced at database level
//! - **Money in VND**: all monetary values stored as i64 (VND has no minor
//!   units)
//! - **Fail-secure**: no subscription and no trial left = no access
//! - **No in-memory state**: every transition is persisted before it counts

use crate::domain::foundation::{
    AccountId, DomainError, ErrorCode, SubscriptionId, Timestamp,
};
use serde::{Deserialize, Serialize};

use super::{PlanDuration, SubscriptionStatus};

/// Length of the free trial granted on first touch.
pub const TRIAL_PERIOD_DAYS: i64 = 14;

/// The outstanding-checkout block carried by a PENDING subscription.
///
/// Populated by checkout initiation, consumed by the payment webhook,
/// erased when an abandoned checkout is voided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCheckout {
    /// Order reference handed to the payment provider.
    pub order_code: String,

    /// Amount the provider was asked to collect, in VND.
    pub amount: i64,

    /// Plan duration being purchased.
    pub plan_duration: PlanDuration,

    /// Hosted checkout page URL.
    pub checkout_url: String,

    /// QR payload URL for in-person payment.
    pub qr_code_url: String,

    /// When the checkout was initiated.
    pub created_at: Timestamp,
}

impl PendingCheckout {
    /// Creates a pending block for a freshly initiated checkout.
    pub fn new(
        order_code: impl Into<String>,
        amount: i64,
        plan_duration: PlanDuration,
        checkout_url: impl Into<String>,
        qr_code_url: impl Into<String>,
    ) -> Self {
        Self {
            order_code: order_code.into(),
            amount,
            plan_duration,
            checkout_url: checkout_url.into(),
            qr_code_url: qr_code_url.into(),
            created_at: Timestamp::now(),
        }
    }
}

/// Subscription aggregate - an owner account's billing state.
///
/// # Invariants
///
/// - `id` is globally unique; at most one live row per `account_id`
/// - Status transitions follow state machine rules
/// - Exactly one expiry clock is authoritative, selected by `status`
///   (`trial_ends_at` for TRIAL, `expires_at` for ACTIVE)
/// - `pending` is Some only between checkout initiation and
///   webhook/abandon resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Unique identifier for this subscription row.
    pub id: SubscriptionId,

    /// Owner account this subscription bills.
    pub account_id: AccountId,

    /// Current status in the billing lifecycle.
    pub status: SubscriptionStatus,

    /// When the trial window opened (set once, on trial creation).
    pub trial_started_at: Option<Timestamp>,

    /// When the trial window closes. Authoritative clock while TRIAL.
    pub trial_ends_at: Option<Timestamp>,

    /// Most recently purchased plan duration.
    pub plan_duration: Option<PlanDuration>,

    /// When the current paid period started.
    pub started_at: Option<Timestamp>,

    /// When the paid period ends. Authoritative clock while ACTIVE.
    pub expires_at: Option<Timestamp>,

    /// Whether the owner wants the plan renewed at period end.
    pub auto_renew: bool,

    /// Outstanding unconfirmed checkout, if any.
    pub pending: Option<PendingCheckout>,

    /// When this row was created.
    pub created_at: Timestamp,

    /// When this row was last updated.
    pub updated_at: Timestamp,
}

impl Subscription {
    /// Create a fresh 14-day trial for a first-seen owner.
    pub fn create_trial(id: SubscriptionId, account_id: AccountId) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            account_id,
            status: SubscriptionStatus::Trial,
            trial_started_at: Some(now),
            trial_ends_at: Some(now.add_days(TRIAL_PERIOD_DAYS)),
            plan_duration: None,
            started_at: None,
            expires_at: None,
            auto_renew: true,
            pending: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Materialize an empty shell row for flows that activate an owner
    /// who never held a row, such as operator activation for a
    /// first-seen account. No trial window is granted; the caller is
    /// expected to activate immediately.
    pub fn materialize(id: SubscriptionId, account_id: AccountId) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            account_id,
            status: SubscriptionStatus::Trial,
            trial_started_at: None,
            trial_ends_at: None,
            plan_duration: None,
            started_at: None,
            expires_at: None,
            auto_renew: true,
            pending: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a PENDING row for an owner with no live subscription,
    /// carrying the given outstanding checkout.
    pub fn create_pending(
        id: SubscriptionId,
        account_id: AccountId,
        pending: PendingCheckout,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            account_id,
            status: SubscriptionStatus::Pending,
            trial_started_at: None,
            trial_ends_at: None,
            plan_duration: None,
            started_at: None,
            expires_at: None,
            auto_renew: true,
            pending: Some(pending),
            created_at: now,
            updated_at: now,
        }
    }

    /// True when the status-appropriate clock has run out.
    ///
    /// TRIAL checks `trial_ends_at`, ACTIVE checks `expires_at`; every
    /// other status (and a missing clock) reads as expired.
    pub fn is_expired(&self) -> bool {
        let now = Timestamp::now();
        match self.status {
            SubscriptionStatus::Trial => self
                .trial_ends_at
                .map(|ends| now >= ends)
                .unwrap_or(true),
            SubscriptionStatus::Active => self
                .expires_at
                .map(|ends| now >= ends)
                .unwrap_or(true),
            _ => true,
        }
    }

    /// True while the trial window is open.
    pub fn is_trial_active(&self) -> bool {
        self.status == SubscriptionStatus::Trial && !self.is_expired()
    }

    /// True while a paid period is running.
    pub fn is_premium_active(&self) -> bool {
        self.status == SubscriptionStatus::Active && !self.is_expired()
    }

    /// Activate a paid plan starting now.
    ///
    /// Sets `started_at = now`, computes `expires_at` by calendar-month
    /// addition, and consumes any outstanding pending block.
    ///
    /// # Errors
    ///
    /// Returns error if transition from current status is not allowed.
    pub fn activate(&mut self, duration: PlanDuration) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::Active)?;
        let now = Timestamp::now();
        self.started_at = Some(now);
        self.expires_at = Some(now.add_months(duration.months()));
        self.plan_duration = Some(duration);
        self.pending = None;
        self.updated_at = now;
        Ok(())
    }

    /// Extend the paid period by `duration` months.
    ///
    /// Stacks onto a currently-unexpired `expires_at`; with no expiry set
    /// or a lapsed one, this is a fresh activation.
    ///
    /// # Errors
    ///
    /// Returns error if transition from current status is not allowed.
    pub fn extend(&mut self, duration: PlanDuration) -> Result<(), DomainError> {
        let current_end = match self.expires_at {
            Some(end) if !self.is_expired() => end,
            _ => return self.activate(duration),
        };

        self.transition_to(SubscriptionStatus::Active)?;
        let now = Timestamp::now();
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
        self.expires_at = Some(current_end.add_months(duration.months()));
        self.plan_duration = Some(duration);
        self.pending = None;
        self.updated_at = now;
        Ok(())
    }

    /// Days remaining on the status-appropriate clock.
    ///
    /// Both ends are truncated to day granularity before subtraction and
    /// the result is clamped to >= 0, so a plan expiring today reads 0.
    /// Statuses without an authoritative clock read 0.
    pub fn days_remaining(&self) -> u32 {
        let clock = match self.status {
            SubscriptionStatus::Trial => self.trial_ends_at,
            SubscriptionStatus::Active => self.expires_at,
            _ => None,
        };
        let Some(clock) = clock else {
            return 0;
        };
        Timestamp::now().whole_days_until(&clock).max(0) as u32
    }

    /// Record an initiated checkout: status PENDING plus the pending block.
    ///
    /// # Errors
    ///
    /// Returns error if transition from current status is not allowed.
    pub fn mark_pending_payment(&mut self, pending: PendingCheckout) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::Pending)?;
        self.pending = Some(pending);
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Void an abandoned or cancelled checkout by erasing the pending block.
    pub fn clear_pending_payment(&mut self) {
        self.pending = None;
        self.updated_at = Timestamp::now();
    }

    /// Soft cancel: stop renewing at period end. Status is untouched, so
    /// access continues until the clock runs out.
    pub fn cancel_auto_renew(&mut self) {
        self.auto_renew = false;
        self.updated_at = Timestamp::now();
    }

    /// Converge a lapsed row to EXPIRED.
    ///
    /// # Errors
    ///
    /// Returns error if transition from current status is not allowed.
    pub fn expire(&mut self) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::Expired)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Transition to a new status using the state machine.
    fn transition_to(&mut self, target: SubscriptionStatus) -> Result<(), DomainError> {
        use crate::domain::foundation::StateMachine;

        self.status = self.status.transition_to(target).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Cannot transition subscription from {:?} to {:?}",
                    self.status, target
                ),
            )
        })?;
        Ok(())
    }
}
