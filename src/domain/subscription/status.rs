//! Subscription status state machine.
//!
//! Defines all possible subscription states and valid transitions
//! according to the billing lifecycle.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Subscription status.
///
/// Represents the current state of an owner's subscription in the
/// billing lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Initial state granted on first touch. Access until the 14-day
    /// trial window ends.
    Trial,

    /// Checkout initiated, awaiting payment confirmation.
    /// The pending block carries the outstanding order.
    Pending,

    /// Paid subscription with full access until `expires_at`.
    Active,

    /// Past its clock. No access until re-subscription.
    Expired,

    /// Soft-cancelled by explicit request. No access.
    Cancelled,
}

impl SubscriptionStatus {
    /// Returns true for statuses that occupy the single live slot per
    /// owner (at most one of these exists per account).
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Trial | SubscriptionStatus::Pending | SubscriptionStatus::Active
        )
    }

    /// Returns true for rows kept only as history.
    pub fn is_historical(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Expired | SubscriptionStatus::Cancelled
        )
    }
}

impl StateMachine for SubscriptionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SubscriptionStatus::*;
        matches!(
            (self, target),
            // From TRIAL
            (Trial, Pending)
                | (Trial, Active)
                | (Trial, Expired)
                | (Trial, Cancelled)
            // From PENDING
                | (Pending, Pending) // Re-checkout replaces the pending block
                | (Pending, Active)
                | (Pending, Expired)
                | (Pending, Cancelled)
            // From ACTIVE
                | (Active, Active) // Renewal
                | (Active, Pending) // Checkout after the paid window lapsed
                | (Active, Expired)
                | (Active, Cancelled)
            // From EXPIRED
                | (Expired, Pending)
                | (Expired, Active) // Manual re-subscribe
            // From CANCELLED
                | (Cancelled, Pending)
                | (Cancelled, Active)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SubscriptionStatus::*;
        match self {
            Trial => vec![Pending, Active, Expired, Cancelled],
            Pending => vec![Pending, Active, Expired, Cancelled],
            Active => vec![Active, Pending, Expired, Cancelled],
            Expired => vec![Pending, Active],
            Cancelled => vec![Pending, Active],
        }
    }
}
