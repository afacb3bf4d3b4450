//! Client-facing subscription summary.
//!
//! A closed tagged union per status so client and server agree on shape
//! without runtime shape-sniffing. Anything that is neither an open trial
//! nor a paid plan collapses to `None`.

use crate::domain::foundation::Timestamp;
use serde::{Deserialize, Serialize};

use super::{PlanDuration, Subscription, SubscriptionStatus};

/// Summary of an owner's billing state, shaped for clients.
///
/// The `ends_at`/`expires_at` clocks are reported as stored; a row the
/// sweeper has not converged yet may carry a clock in the past, which
/// clients render as "ended".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubscriptionSummary {
    /// An open (or not-yet-converged) trial window.
    Trial { ends_at: Timestamp },

    /// A paid plan.
    Premium {
        duration: PlanDuration,
        started_at: Timestamp,
        expires_at: Timestamp,
        auto_renew: bool,
    },

    /// No current entitlement: no row, a pending checkout, or a
    /// historical row.
    None,
}

impl SubscriptionSummary {
    /// Builds the summary for an owner's most recent row, if any.
    pub fn from_subscription(subscription: Option<&Subscription>) -> Self {
        let Some(sub) = subscription else {
            return SubscriptionSummary::None;
        };

        match sub.status {
            SubscriptionStatus::Trial => match sub.trial_ends_at {
                Some(ends_at) => SubscriptionSummary::Trial { ends_at },
                None => SubscriptionSummary::None,
            },
            SubscriptionStatus::Active => {
                match (sub.plan_duration, sub.started_at, sub.expires_at) {
                    (Some(duration), Some(started_at), Some(expires_at)) => {
                        SubscriptionSummary::Premium {
                            duration,
                            started_at,
                            expires_at,
                            auto_renew: sub.auto_renew,
                        }
                    }
                    _ => SubscriptionSummary::None,
                }
            }
            _ => SubscriptionSummary::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{AccountId, SubscriptionId};
    use crate::domain::subscription::PendingCheckout;

    fn trial() -> Subscription {
        Subscription::create_trial(SubscriptionId::new(), AccountId::new())
    }

    #[test]
    fn no_row_summarizes_to_none() {
        assert_eq!(
            SubscriptionSummary::from_subscription(None),
            SubscriptionSummary::None
        );
    }

    #[test]
    fn trial_row_summarizes_to_trial() {
        let sub = trial();
        let summary = SubscriptionSummary::from_subscription(Some(&sub));

        assert_eq!(
            summary,
            SubscriptionSummary::Trial {
                ends_at: sub.trial_ends_at.unwrap()
            }
        );
    }

    #[test]
    fn active_row_summarizes_to_premium() {
        let mut sub = trial();
        sub.activate(PlanDuration::SixMonths).unwrap();

        let summary = SubscriptionSummary::from_subscription(Some(&sub));
        assert_eq!(
            summary,
            SubscriptionSummary::Premium {
                duration: PlanDuration::SixMonths,
                started_at: sub.started_at.unwrap(),
                expires_at: sub.expires_at.unwrap(),
                auto_renew: true,
            }
        );
    }

    #[test]
    fn soft_cancelled_premium_reports_auto_renew_off() {
        let mut sub = trial();
        sub.activate(PlanDuration::OneMonth).unwrap();
        sub.cancel_auto_renew();

        match SubscriptionSummary::from_subscription(Some(&sub)) {
            SubscriptionSummary::Premium { auto_renew, .. } => assert!(!auto_renew),
            other => panic!("expected premium summary, got {:?}", other),
        }
    }

    #[test]
    fn pending_row_summarizes_to_none() {
        let mut sub = trial();
        sub.mark_pending_payment(PendingCheckout::new(
            "SUB_x_1_1",
            299_000,
            PlanDuration::OneMonth,
            "https://pay.example/c",
            "https://pay.example/q",
        ))
        .unwrap();

        assert_eq!(
            SubscriptionSummary::from_subscription(Some(&sub)),
            SubscriptionSummary::None
        );
    }

    #[test]
    fn expired_row_summarizes_to_none() {
        let mut sub = trial();
        sub.expire().unwrap();

        assert_eq!(
            SubscriptionSummary::from_subscription(Some(&sub)),
            SubscriptionSummary::None
        );
    }

    #[test]
    fn summary_serializes_with_type_tag() {
        let sub = trial();
        let summary = SubscriptionSummary::from_subscription(Some(&sub));
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["type"], "trial");
        assert!(json["ends_at"].is_string());
    }

    #[test]
    fn none_serializes_as_bare_tag() {
        let json = serde_json::to_value(SubscriptionSummary::None).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "none" }));
    }
}
