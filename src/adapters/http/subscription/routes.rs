//! Axum router configuration for subscription and payment endpoints.
//!
//! This module defines the route structure for the billing API and wires
//! it to the corresponding handlers.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    activate_subscription, cancel_auto_renew, get_current_subscription, get_payment_history,
    get_plans, get_usage, handle_payment_webhook, start_checkout, SubscriptionAppState,
};

/// Create the subscription API router.
///
/// # Routes
///
/// ## Public Endpoints
/// - `GET /plans` - List the purchasable plan catalog
///
/// ## Owner Endpoints (require an owner session)
/// - `GET /current` - Current subscription summary for the caller
/// - `POST /checkout` - Start a hosted checkout for a paid plan
/// - `POST /activate` - Record an operator-confirmed payment
/// - `POST /cancel` - Switch off auto-renew at period end
/// - `GET /history` - Payment ledger, newest first
/// - `GET /usage` - Usage counters for the caller's tenancy
pub fn subscription_routes() -> Router<SubscriptionAppState> {
    Router::new()
        // Public endpoints
        .route("/plans", get(get_plans))
        // Owner endpoints
        .route("/current", get(get_current_subscription))
        .route("/checkout", post(start_checkout))
        .route("/activate", post(activate_subscription))
        .route("/cancel", post(cancel_auto_renew))
        .route("/history", get(get_payment_history))
        .route("/usage", get(get_usage))
}

/// Create the payment webhook router.
///
/// This is separate from the subscription routes because webhook
/// deliveries carry no session; trust comes from the HMAC signature
/// over the raw body instead.
///
/// # Routes
/// - `POST /webhook` - Settle a gateway payment confirmation
pub fn webhook_routes() -> Router<SubscriptionAppState> {
    Router::new().route("/webhook", post(handle_payment_webhook))
}

/// Create the complete billing module router.
///
/// Combines owner routes and webhook routes into a single router
/// suitable for mounting under `/api`.
///
/// # Example
///
/// ```ignore
/// use axum::Router;
/// use crate::adapters::http::subscription::{subscription_router, SubscriptionAppState};
///
/// let app_state = SubscriptionAppState { /* ... */ };
/// let app = Router::new()
///     .nest("/api", subscription_router())
///     .with_state(app_state);
/// ```
pub fn subscription_router() -> Router<SubscriptionAppState> {
    Router::new()
        .nest("/subscriptions", subscription_routes())
        .nest("/payments", webhook_routes())
}
