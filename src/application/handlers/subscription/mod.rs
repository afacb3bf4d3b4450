//! Subscription command and query handlers.
//!
//! Handlers for the billing lifecycle: trial bootstrap, checkout,
//! payment settlement, operator activation, entitlement checks, and
//! the daily expiry sweep.

// Command handlers
mod activate_subscription;
mod bootstrap_trial;
mod cancel_auto_renew;
mod process_payment_webhook;
mod start_checkout;
mod sweep_expired;

// Query handlers
mod attach_subscription_info;
mod check_entitlement;
mod get_payment_history;
mod get_subscription;
mod get_usage;

#[cfg(test)]
pub(crate) mod test_support;

pub use activate_subscription::{
    ActivateSubscriptionCommand, ActivateSubscriptionHandler, ActivateSubscriptionResult,
};
pub use attach_subscription_info::{AttachSubscriptionInfoHandler, AttachSubscriptionInfoQuery};
pub use bootstrap_trial::{BootstrapTrialCommand, BootstrapTrialHandler, BootstrapTrialResult};
pub use cancel_auto_renew::{CancelAutoRenewCommand, CancelAutoRenewHandler, CancelAutoRenewResult};
pub use check_entitlement::{
    CheckEntitlementCommand, CheckEntitlementHandler, CheckEntitlementResult, GateMode,
};
pub use get_payment_history::{
    GetPaymentHistoryHandler, GetPaymentHistoryQuery, GetPaymentHistoryResult,
};
pub use get_subscription::{GetSubscriptionHandler, GetSubscriptionQuery, GetSubscriptionResult};
pub use get_usage::{GetUsageHandler, GetUsageQuery, GetUsageResult};
pub use process_payment_webhook::{
    ProcessPaymentWebhookCommand, ProcessPaymentWebhookHandler, ProcessPaymentWebhookResult,
};
pub use start_checkout::{StartCheckoutCommand, StartCheckoutHandler, StartCheckoutResult};
pub use sweep_expired::{SweepExpiredHandler, SweepExpiredResult};
