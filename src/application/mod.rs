//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, it separates command handlers (write) from query handlers (read).

pub mod handlers;

pub use handlers::subscription::{
    // Entitlement gate
    CheckEntitlementCommand, CheckEntitlementHandler, CheckEntitlementResult, GateMode,
    // Lifecycle commands
    ActivateSubscriptionCommand, ActivateSubscriptionHandler, ActivateSubscriptionResult,
    BootstrapTrialCommand, BootstrapTrialHandler, BootstrapTrialResult,
    CancelAutoRenewCommand, CancelAutoRenewHandler, CancelAutoRenewResult,
    ProcessPaymentWebhookCommand, ProcessPaymentWebhookHandler, ProcessPaymentWebhookResult,
    StartCheckoutCommand, StartCheckoutHandler, StartCheckoutResult,
    SweepExpiredHandler, SweepExpiredResult,
    // Queries
    AttachSubscriptionInfoHandler, AttachSubscriptionInfoQuery,
    GetPaymentHistoryHandler, GetPaymentHistoryQuery, GetPaymentHistoryResult,
    GetSubscriptionHandler, GetSubscriptionQuery, GetSubscriptionResult,
    GetUsageHandler, GetUsageQuery, GetUsageResult,
};
