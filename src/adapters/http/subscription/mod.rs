//! HTTP adapter for subscription and payment endpoints.
//!
//! Exposes the billing lifecycle via REST API:
//! - `GET /api/subscriptions/plans` - List the purchasable plan catalog
//! - `GET /api/subscriptions/current` - Current subscription summary
//! - `POST /api/subscriptions/checkout` - Start a hosted checkout
//! - `POST /api/subscriptions/activate` - Record an operator-confirmed payment
//! - `POST /api/subscriptions/cancel` - Switch off auto-renew
//! - `GET /api/subscriptions/history` - Payment ledger
//! - `GET /api/subscriptions/usage` - Usage counters
//! - `POST /api/payments/webhook` - Settle gateway payment confirmations

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ActivateSubscriptionRequest, ActivationResponse, CheckoutResponse,
    CurrentSubscriptionResponse, ErrorResponse, PaymentHistoryResponse, PaymentRecordResponse,
    PlanCatalogResponse, PlanOfferResponse, StartCheckoutRequest, UsageResponse,
};
pub use handlers::{ApiError, SubscriptionAppState, WebhookApiError, PAYOS_SIGNATURE_HEADER};
pub use routes::{subscription_router, subscription_routes, webhook_routes};
