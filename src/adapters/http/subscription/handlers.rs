//! HTTP handlers for the subscription and payment endpoints.
//!
//! These handlers connect Axum routes to application layer command/query
//! handlers. Business rejections come back with stable error codes and
//! their real status; infrastructure failures collapse to a generic 500
//! after being logged here, so internals never leak to clients.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::{
    ActivateSubscriptionCommand, ActivateSubscriptionHandler, CancelAutoRenewCommand,
    CancelAutoRenewHandler, GetPaymentHistoryHandler, GetPaymentHistoryQuery,
    GetSubscriptionHandler, GetSubscriptionQuery, GetUsageHandler, GetUsageQuery,
    ProcessPaymentWebhookCommand, ProcessPaymentWebhookHandler, StartCheckoutCommand,
    StartCheckoutHandler,
};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::subscription::{
    PayosWebhookVerifier, PlanOffer, SubscriptionSummary, WebhookError,
};
use crate::ports::{
    AccountDirectory, EventPublisher, NotificationStore, PaymentGateway, PaymentHistoryRepository,
    SubscriptionRepository,
};

use super::super::middleware::RequireOwner;
use super::dto::{
    ActivateSubscriptionRequest, ActivationResponse, CheckoutResponse,
    CurrentSubscriptionResponse, ErrorResponse, PaymentHistoryResponse, PaymentRecordResponse,
    PlanCatalogResponse, PlanOfferResponse, StartCheckoutRequest, UsageResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// This struct is cloned for each request and contains Arc-wrapped dependencies
/// for efficient sharing across handlers.
#[derive(Clone)]
pub struct SubscriptionAppState {
    pub subscription_repository: Arc<dyn SubscriptionRepository>,
    pub payment_history: Arc<dyn PaymentHistoryRepository>,
    pub account_directory: Arc<dyn AccountDirectory>,
    pub payment_gateway: Arc<dyn PaymentGateway>,
    pub event_publisher: Arc<dyn EventPublisher>,
    pub notification_store: Arc<dyn NotificationStore>,
    /// Absent when no webhook secret is configured. Deliveries are then
    /// rejected as unverifiable rather than trusted blindly.
    pub webhook_verifier: Option<PayosWebhookVerifier>,
}

impl SubscriptionAppState {
    /// Create handlers on demand from the shared state.
    pub fn current_subscription_handler(&self) -> GetSubscriptionHandler {
        GetSubscriptionHandler::new(self.subscription_repository.clone())
    }

    pub fn start_checkout_handler(&self) -> StartCheckoutHandler {
        StartCheckoutHandler::new(
            self.subscription_repository.clone(),
            self.payment_gateway.clone(),
        )
    }

    pub fn activate_subscription_handler(&self) -> ActivateSubscriptionHandler {
        ActivateSubscriptionHandler::new(
            self.subscription_repository.clone(),
            self.payment_history.clone(),
            self.account_directory.clone(),
            self.event_publisher.clone(),
        )
    }

    pub fn cancel_auto_renew_handler(&self) -> CancelAutoRenewHandler {
        CancelAutoRenewHandler::new(self.subscription_repository.clone())
    }

    pub fn payment_history_handler(&self) -> GetPaymentHistoryHandler {
        GetPaymentHistoryHandler::new(self.payment_history.clone())
    }

    pub fn usage_handler(&self) -> GetUsageHandler {
        GetUsageHandler::new(
            self.subscription_repository.clone(),
            self.account_directory.clone(),
            self.payment_history.clone(),
        )
    }

    pub fn webhook_handler(&self) -> ProcessPaymentWebhookHandler {
        ProcessPaymentWebhookHandler::new(
            self.webhook_verifier.clone(),
            self.subscription_repository.clone(),
            self.payment_history.clone(),
            self.account_directory.clone(),
            self.event_publisher.clone(),
            self.notification_store.clone(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/subscriptions/plans - List the purchasable plan catalog
///
/// Public. Pricing is shown on the upgrade screen before any session
/// exists, so this endpoint takes no caller identity at all.
pub async fn get_plans() -> impl IntoResponse {
    let plans = PlanOffer::catalog()
        .into_iter()
        .map(PlanOfferResponse::from)
        .collect();

    Json(PlanCatalogResponse { plans })
}

/// GET /api/subscriptions/current - Current subscription for the calling owner
pub async fn get_current_subscription(
    State(state): State<SubscriptionAppState>,
    RequireOwner(account): RequireOwner,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.current_subscription_handler();
    let query = GetSubscriptionQuery {
        account_id: account.account_id,
    };

    let result = handler.handle(query).await?;

    Ok(Json(CurrentSubscriptionResponse::from(result)))
}

/// GET /api/subscriptions/history - The caller's payment ledger, newest first
pub async fn get_payment_history(
    State(state): State<SubscriptionAppState>,
    RequireOwner(account): RequireOwner,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.payment_history_handler();
    let query = GetPaymentHistoryQuery {
        account_id: account.account_id,
    };

    let result = handler.handle(query).await?;

    let payments = result
        .records
        .into_iter()
        .map(PaymentRecordResponse::from)
        .collect();

    Ok(Json(PaymentHistoryResponse { payments }))
}

/// GET /api/subscriptions/usage - Usage counters for the caller's tenancy
pub async fn get_usage(
    State(state): State<SubscriptionAppState>,
    RequireOwner(account): RequireOwner,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.usage_handler();
    let query = GetUsageQuery {
        account_id: account.account_id,
    };

    let result = handler.handle(query).await?;

    Ok(Json(UsageResponse::from(result)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/subscriptions/checkout - Create a hosted checkout for a paid plan
pub async fn start_checkout(
    State(state): State<SubscriptionAppState>,
    RequireOwner(account): RequireOwner,
    Json(request): Json<StartCheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.start_checkout_handler();
    let command = StartCheckoutCommand {
        account_id: account.account_id,
        duration_months: request.plan_duration,
    };

    let result = handler.handle(command).await?;

    Ok((StatusCode::CREATED, Json(CheckoutResponse::from(result))))
}

/// POST /api/subscriptions/activate - Record an operator-confirmed payment
///
/// Used when payment happened outside the gateway, for example a bank
/// transfer reconciled by support staff.
pub async fn activate_subscription(
    State(state): State<SubscriptionAppState>,
    RequireOwner(account): RequireOwner,
    Json(request): Json<ActivateSubscriptionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.activate_subscription_handler();
    let command = ActivateSubscriptionCommand {
        account_id: account.account_id,
        duration_months: request.plan_duration,
        amount: request.amount,
        transaction_id: request.transaction_id,
    };

    let result = handler.handle(command).await?;

    let response = ActivationResponse {
        summary: SubscriptionSummary::from_subscription(Some(&result.subscription)),
        days_remaining: result.subscription.days_remaining(),
        note: result.kind.note(),
    };

    Ok(Json(response))
}

/// POST /api/subscriptions/cancel - Switch off auto-renew at period end
///
/// Access continues until the already-paid period runs out, so there is
/// nothing to report back.
pub async fn cancel_auto_renew(
    State(state): State<SubscriptionAppState>,
    RequireOwner(account): RequireOwner,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.cancel_auto_renew_handler();
    let command = CancelAutoRenewCommand {
        account_id: account.account_id,
    };

    handler.handle(command).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook Handler
// ════════════════════════════════════════════════════════════════════════════════

/// Header carrying the gateway's HMAC-SHA256 signature over the raw body.
pub const PAYOS_SIGNATURE_HEADER: &str = "x-payos-signature";

/// POST /api/payments/webhook - Settle a gateway payment confirmation
///
/// Unauthenticated. Trust comes from the signature over the raw bytes,
/// not from a session. The gateway retries on 5xx, so every rejection
/// is mapped to the status its retry loop expects and logged here with
/// delivery context.
pub async fn handle_payment_webhook(
    State(state): State<SubscriptionAppState>,
    headers: axum::http::HeaderMap,
    body: axum::body::Bytes,
) -> axum::response::Response {
    let signature = headers
        .get(PAYOS_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let handler = state.webhook_handler();
    let command = ProcessPaymentWebhookCommand {
        raw_body: body.to_vec(),
        signature,
    };

    match handler.handle(command).await {
        Ok(result) => {
            tracing::info!(
                order_code = %result.order_code,
                duration_months = result.duration.months(),
                "Payment webhook settled"
            );
            StatusCode::OK.into_response()
        }
        Err(error) => {
            log_webhook_rejection(&error);
            WebhookApiError(error).into_response()
        }
    }
}

/// Unverifiable or malformed deliveries are warnings with enough context
/// to investigate a misbehaving sender. Broken plumbing is an error.
fn log_webhook_rejection(error: &WebhookError) {
    match error {
        WebhookError::MissingSignature | WebhookError::InvalidSignature => {
            tracing::warn!(error = %error, "Rejected unverifiable webhook delivery");
        }
        WebhookError::ParseError(_) => {
            tracing::warn!(error = %error, "Rejected malformed webhook payload");
        }
        WebhookError::ForeignOrderCode(order_code) => {
            tracing::warn!(order_code = %order_code, "Ignored webhook for foreign order code");
        }
        WebhookError::PendingNotFound => {
            tracing::warn!(error = %error, "Webhook order has no pending checkout");
        }
        WebhookError::MissingSecret
        | WebhookError::InvalidTransition(_)
        | WebhookError::Database(_) => {
            tracing::error!(error = %error, "Webhook processing failed");
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts domain errors to HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let DomainError {
            code,
            message,
            details,
        } = self.0;

        let status = match code {
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat
            | ErrorCode::PlanInvalid
            | ErrorCode::InvalidPayload => StatusCode::BAD_REQUEST,
            ErrorCode::SubscriptionNotFound
            | ErrorCode::PendingOrderNotFound
            | ErrorCode::AccountNotFound
            | ErrorCode::StoreNotFound => StatusCode::NOT_FOUND,
            ErrorCode::InvalidStateTransition | ErrorCode::AlreadyActive => StatusCode::CONFLICT,
            ErrorCode::TrialEnded
            | ErrorCode::PremiumEnded
            | ErrorCode::ManagerExpired
            | ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::Unauthorized | ErrorCode::InvalidSignature => StatusCode::UNAUTHORIZED,
            ErrorCode::PaymentGatewayError => StatusCode::BAD_GATEWAY,
            ErrorCode::DatabaseError
            | ErrorCode::CacheError
            | ErrorCode::ConfigurationError
            | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Internal failures keep their detail in the logs, not the body.
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error_code = %code, error = %message, "Request failed on an internal error");
            let body = ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred");
            return (status, Json(body)).into_response();
        }

        let body = if details.is_empty() {
            ErrorResponse::new(code.to_string(), message)
        } else {
            let details = serde_json::Value::Object(
                details
                    .into_iter()
                    .map(|(k, v)| (k, serde_json::Value::String(v)))
                    .collect(),
            );
            ErrorResponse::with_details(code.to_string(), message, details)
        };

        (status, Json(body)).into_response()
    }
}

/// API error type for webhook deliveries.
///
/// The status side of the mapping lives on `WebhookError` itself since
/// it encodes the gateway's retry contract.
#[derive(Debug)]
pub struct WebhookApiError(pub WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.status_code();

        let (error_code, message) = match &self.0 {
            WebhookError::MissingSignature => ("MISSING_SIGNATURE", self.0.to_string()),
            WebhookError::InvalidSignature => ("INVALID_SIGNATURE", self.0.to_string()),
            WebhookError::ParseError(_) => ("INVALID_PAYLOAD", self.0.to_string()),
            WebhookError::ForeignOrderCode(_) => (
                "ORDER_IGNORED",
                "Order code was not issued by this service".to_string(),
            ),
            WebhookError::PendingNotFound => ("PENDING_ORDER_NOT_FOUND", self.0.to_string()),
            WebhookError::MissingSecret
            | WebhookError::InvalidTransition(_)
            | WebhookError::Database(_) => {
                ("INTERNAL_ERROR", "An internal error occurred".to_string())
            }
        };

        let body = ErrorResponse::new(error_code, message);
        (status, Json(body)).into_response()
    }
}
