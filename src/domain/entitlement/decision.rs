//! Entitlement decision types.
//!
//! The gate evaluates every business request against the caller's
//! subscription and produces either an allow or a structured rejection
//! that clients use for redirect routing.

use serde::{Deserialize, Serialize};

use crate::domain::subscription::SubscriptionStatus;

/// Structured reason attached to every entitlement rejection.
///
/// Serialized in kebab-case to match the reason strings clients
/// switch on (`trial-ended`, `premium-ended`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DenyReason {
    /// Trial window has elapsed.
    TrialEnded,
    /// Paid subscription has elapsed.
    PremiumEnded,
    /// Staff caller whose owning account lacks a live subscription.
    ManagerExpired,
    /// Subscription exists but is in no grantable state.
    PlanInvalid,
}

impl DenyReason {
    /// Returns the wire representation of this reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::TrialEnded => "trial-ended",
            DenyReason::PremiumEnded => "premium-ended",
            DenyReason::ManagerExpired => "manager-expired",
            DenyReason::PlanInvalid => "plan-invalid",
        }
    }
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of an entitlement evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntitlementDecision {
    /// Request may proceed.
    Allowed,
    /// Request must be rejected with the attached reason.
    Denied(DenyReason),
}

impl EntitlementDecision {
    /// Returns true when the request may proceed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, EntitlementDecision::Allowed)
    }

    /// Returns the rejection reason, if any.
    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            EntitlementDecision::Allowed => None,
            EntitlementDecision::Denied(reason) => Some(*reason),
        }
    }
}

/// Subscription info attached to requests for client display.
///
/// Computed on a non-blocking side pass. Failures while computing it
/// never affect the gate's primary decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementInfo {
    /// Current subscription status.
    pub status: SubscriptionStatus,
    /// Whole days until the status-appropriate clock runs out.
    pub days_remaining: u32,
}

impl EntitlementInfo {
    /// Creates a new info snapshot.
    pub fn new(status: SubscriptionStatus, days_remaining: u32) -> Self {
        Self {
            status,
            days_remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ══════════════════════════════════════════════════════════════
    // DenyReason Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn deny_reasons_use_kebab_case_strings() {
        assert_eq!(DenyReason::TrialEnded.as_str(), "trial-ended");
        assert_eq!(DenyReason::PremiumEnded.as_str(), "premium-ended");
        assert_eq!(DenyReason::ManagerExpired.as_str(), "manager-expired");
        assert_eq!(DenyReason::PlanInvalid.as_str(), "plan-invalid");
    }

    #[test]
    fn deny_reason_serializes_to_kebab_case() {
        let json = serde_json::to_string(&DenyReason::ManagerExpired).unwrap();
        assert_eq!(json, "\"manager-expired\"");
    }

    #[test]
    fn deny_reason_deserializes_from_kebab_case() {
        let reason: DenyReason = serde_json::from_str("\"trial-ended\"").unwrap();
        assert_eq!(reason, DenyReason::TrialEnded);
    }

    #[test]
    fn deny_reason_display_matches_as_str() {
        assert_eq!(
            format!("{}", DenyReason::PremiumEnded),
            DenyReason::PremiumEnded.as_str()
        );
    }

    // ══════════════════════════════════════════════════════════════
    // Decision Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn allowed_decision_is_allowed() {
        let decision = EntitlementDecision::Allowed;
        assert!(decision.is_allowed());
        assert!(decision.deny_reason().is_none());
    }

    #[test]
    fn denied_decision_carries_reason() {
        let decision = EntitlementDecision::Denied(DenyReason::TrialEnded);
        assert!(!decision.is_allowed());
        assert_eq!(decision.deny_reason(), Some(DenyReason::TrialEnded));
    }

    // ══════════════════════════════════════════════════════════════
    // EntitlementInfo Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn info_round_trips_through_json() {
        let info = EntitlementInfo::new(SubscriptionStatus::Trial, 9);

        let json = serde_json::to_string(&info).unwrap();
        let back: EntitlementInfo = serde_json::from_str(&json).unwrap();

        assert_eq!(back, info);
    }

    #[test]
    fn info_serializes_status_in_snake_case() {
        let info = EntitlementInfo::new(SubscriptionStatus::Active, 30);
        let json = serde_json::to_value(&info).unwrap();

        assert_eq!(json["status"], "active");
        assert_eq!(json["days_remaining"], 30);
    }
}
