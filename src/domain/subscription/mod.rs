//! Subscription domain module.
//!
//! Handles the subscription lifecycle, plan catalog, payment ledger,
//! and webhook verification for the billing subsystem.
//!
//! # Module Structure
//!
//! - `aggregate` - Subscription aggregate entity
//! - `status` - SubscriptionStatus state machine
//! - `plan` - Plan catalog and durations
//! - `order_code` - Checkout order references
//! - `summary` - Client-facing subscription summary
//! - `payment_record` - Append-only payment ledger rows
//! - `events` - Domain events published on lifecycle changes
//! - `errors` - Subscription-specific errors
//! - `webhook_*` - Payment webhook payloads and verification

mod aggregate;
mod errors;
mod events;
mod order_code;
mod payment_record;
mod plan;
mod status;
mod summary;
mod webhook_errors;
mod webhook_event;
mod webhook_verifier;

pub use aggregate::{PendingCheckout, Subscription, TRIAL_PERIOD_DAYS};
pub use errors::SubscriptionError;
pub use events::SubscriptionEvent;
pub use order_code::OrderCode;
pub use payment_record::{ActivationKind, PaymentHistoryRecord, PaymentMethod, PaymentStatus};
pub use plan::{PlanDuration, PlanOffer, PLAN_CURRENCY};
pub use status::SubscriptionStatus;
pub use summary::SubscriptionSummary;
pub use webhook_errors::WebhookError;
pub use webhook_event::{PaymentWebhookData, PaymentWebhookEvent};
pub use webhook_verifier::PayosWebhookVerifier;

#[cfg(test)]
pub use webhook_verifier::compute_test_signature;
