//! Entitlement gate middleware for axum.
//!
//! This module provides:
//! - `entitlement_middleware` - Standard gate for the platform's feature routes
//! - `premium_middleware` - Hard gate for premium-only routes
//! - `attach_info_middleware` - Annotates responses with the caller's subscription state
//!
//! The gates sit behind `auth_middleware` and read the account it placed
//! in request extensions. A denial is an expected business outcome and
//! comes back as 403 with a routable reason; only a gate that could not
//! run at all produces a 500.
//!
//! ```text
//! Request → auth_middleware → entitlement_middleware → handler
//!                                   ↓ denied
//!                         403 {error_code, details.reason}
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::{
    AttachSubscriptionInfoHandler, AttachSubscriptionInfoQuery, CheckEntitlementCommand,
    CheckEntitlementHandler, GateMode,
};
use crate::domain::entitlement::{DenyReason, EntitlementDecision, EntitlementInfo};
use crate::domain::foundation::{AuthenticatedAccount, ErrorCode};

/// Response header carrying the caller's subscription state as compact JSON.
pub const SUBSCRIPTION_INFO_HEADER: &str = "x-subscription-info";

/// Shared state for the entitlement middlewares.
#[derive(Clone)]
pub struct EntitlementState {
    pub gate: Arc<CheckEntitlementHandler>,
    pub attach_info: Arc<AttachSubscriptionInfoHandler>,
}

/// Standard entitlement gate.
///
/// Applies the full decision sequence: always-allowed paths, staff
/// grace for reads, trial bootstrap for first-time owners, and lapsed
/// state self-healing.
pub async fn entitlement_middleware(
    State(state): State<EntitlementState>,
    request: Request,
    next: Next,
) -> Response {
    gate_request(state, request, next, GateMode::Standard).await
}

/// Hard premium gate.
///
/// Requires an unexpired ACTIVE subscription. No path carve-outs and no
/// trial bootstrap, so trial tenants are denied here even on day one.
pub async fn premium_middleware(
    State(state): State<EntitlementState>,
    request: Request,
    next: Next,
) -> Response {
    gate_request(state, request, next, GateMode::PremiumOnly).await
}

async fn gate_request(
    state: EntitlementState,
    request: Request,
    next: Next,
    mode: GateMode,
) -> Response {
    let Some(account) = request.extensions().get::<AuthenticatedAccount>().cloned() else {
        return unauthenticated_response();
    };

    let command = CheckEntitlementCommand {
        account,
        method: request.method().clone(),
        path: request.uri().path().to_string(),
        mode,
    };

    match state.gate.handle(command).await {
        Ok(result) => match result.decision {
            EntitlementDecision::Allowed => next.run(request).await,
            EntitlementDecision::Denied(reason) => {
                tracing::debug!(reason = %reason, path = %request.uri().path(), "Request denied by entitlement gate");
                deny_response(reason)
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "Entitlement gate could not run");
            let body = serde_json::json!({
                "error_code": "INTERNAL_ERROR",
                "message": "An internal error occurred"
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

/// Annotates responses with the caller's subscription state.
///
/// Purely informational for client UIs (banners, day counters). Any
/// failure on this path leaves the response untouched.
pub async fn attach_info_middleware(
    State(state): State<EntitlementState>,
    request: Request,
    next: Next,
) -> Response {
    let account = request.extensions().get::<AuthenticatedAccount>().cloned();

    let mut response = next.run(request).await;

    if let Some(account) = account {
        let query = AttachSubscriptionInfoQuery { account };
        if let Some(info) = state.attach_info.handle(query).await {
            if let Some(value) = info_header_value(&info) {
                response
                    .headers_mut()
                    .insert(SUBSCRIPTION_INFO_HEADER, value);
            }
        }
    }

    response
}

fn unauthenticated_response() -> Response {
    let body = serde_json::json!({
        "error_code": "UNAUTHENTICATED",
        "message": "Authentication required"
    });
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

/// Maps a gate denial to its stable error envelope.
fn deny_response(reason: DenyReason) -> Response {
    let (error_code, message) = match reason {
        DenyReason::TrialEnded => (ErrorCode::TrialEnded, "Trial period has ended"),
        DenyReason::PremiumEnded => (ErrorCode::PremiumEnded, "Subscription has expired"),
        DenyReason::ManagerExpired => {
            (ErrorCode::ManagerExpired, "The owner's subscription has expired")
        }
        DenyReason::PlanInvalid => (ErrorCode::PlanInvalid, "Subscription is not in a usable state"),
    };

    let body = serde_json::json!({
        "error_code": error_code.to_string(),
        "message": message,
        "details": { "reason": reason.as_str() }
    });

    (StatusCode::FORBIDDEN, Json(body)).into_response()
}

/// Serializes subscription info for the response header. Returns `None`
/// if the JSON cannot be carried in a header value.
fn info_header_value(info: &EntitlementInfo) -> Option<HeaderValue> {
    let json = serde_json::to_string(info).ok()?;
    HeaderValue::from_str(&json).ok()
}
