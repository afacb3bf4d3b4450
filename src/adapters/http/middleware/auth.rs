//! Authentication middleware and extractors for axum.
//!
//! This module provides:
//! - `auth_middleware` - Layer that validates Bearer tokens and injects the account into extensions
//! - `RequireAccount` - Extractor that requires an authenticated account
//! - `RequireOwner` - Extractor that additionally requires an owner-equivalent role
//!
//! # Architecture
//!
//! The middleware uses the `TokenVerifier` port, keeping it provider-agnostic.
//! Whether tokens come from the platform's identity service or a static map
//! in tests, the middleware doesn't change.
//!
//! ```text
//! Request → auth_middleware → injects AuthenticatedAccount into extensions
//!                                      ↓
//!                              Handler → RequireOwner extractor reads from extensions
//! ```
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get, middleware};
//! use std::sync::Arc;
//!
//! let verifier: Arc<dyn TokenVerifier> = Arc::new(StaticTokenVerifier::new());
//!
//! let app = Router::new()
//!     .route("/api/protected", get(protected_handler))
//!     .layer(middleware::from_fn_with_state(verifier.clone(), auth_middleware));
//!
//! async fn protected_handler(RequireAccount(account): RequireAccount) -> String {
//!     format!("Hello, {}!", account.account_id)
//! }
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::foundation::{AuthError, AuthenticatedAccount};
use crate::ports::TokenVerifier;

/// Auth middleware state - wraps the token verifier.
pub type AuthState = Arc<dyn TokenVerifier>;

/// Authentication middleware that validates Bearer tokens.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates the token using the `TokenVerifier` port
/// 3. On success, injects `AuthenticatedAccount` into request extensions
/// 4. On missing token, continues without injecting (for public routes)
/// 5. On invalid token, returns 401 Unauthorized
///
/// # Token Extraction
///
/// Expects the token in the `Authorization` header with `Bearer` prefix:
/// ```text
/// Authorization: Bearer <token>
/// ```
pub async fn auth_middleware(
    State(verifier): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    // Extract Bearer token from Authorization header
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    match token {
        Some(token) => {
            match verifier.verify(token).await {
                Ok(account) => {
                    // Inject authenticated account into request extensions
                    request.extensions_mut().insert(account);
                    next.run(request).await
                }
                Err(e) => {
                    let (status, error_code, message) = match &e {
                        AuthError::TokenExpired => {
                            (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED", "Token expired")
                        }
                        AuthError::InvalidToken | AuthError::MissingClaims => {
                            (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", "Invalid token")
                        }
                        AuthError::ServiceUnavailable(msg) => {
                            tracing::error!(error = %msg, "Auth service unavailable");
                            (
                                StatusCode::SERVICE_UNAVAILABLE,
                                "AUTH_UNAVAILABLE",
                                "Authentication service unavailable",
                            )
                        }
                    };

                    (
                        status,
                        Json(serde_json::json!({
                            "error_code": error_code,
                            "message": message
                        })),
                    )
                        .into_response()
                }
            }
        }
        None => {
            // No token provided - continue without auth
            // Handlers can use RequireAccount / RequireOwner to enforce it
            next.run(request).await
        }
    }
}

/// Extractor that requires an authenticated account.
///
/// Use this extractor in handlers that require any signed-in caller.
/// If no account is in the request extensions (i.e., auth middleware
/// didn't successfully validate a token), returns 401 Unauthorized.
///
/// # Example
///
/// ```ignore
/// async fn my_handler(RequireAccount(account): RequireAccount) -> impl IntoResponse {
///     format!("Hello, {}!", account.account_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAccount(pub AuthenticatedAccount);

impl<S> axum::extract::FromRequestParts<S> for RequireAccount
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            parts
                .extensions
                .get::<AuthenticatedAccount>()
                .cloned()
                .map(RequireAccount)
                .ok_or(AuthRejection::Unauthenticated)
        })
    }
}

/// Extractor that requires an owner-equivalent caller.
///
/// Billing endpoints change what the whole tenancy pays for, so staff
/// sessions are rejected even when their token is perfectly valid.
#[derive(Debug, Clone)]
pub struct RequireOwner(pub AuthenticatedAccount);

impl<S> axum::extract::FromRequestParts<S> for RequireOwner
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let account = parts
                .extensions
                .get::<AuthenticatedAccount>()
                .cloned()
                .ok_or(AuthRejection::Unauthenticated)?;

            if !account.is_owner_equivalent() {
                return Err(AuthRejection::OwnerRequired);
            }

            Ok(RequireOwner(account))
        })
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone)]
pub enum AuthRejection {
    /// No valid authentication token was provided.
    Unauthenticated,
    /// The caller is authenticated but not an owner-equivalent account.
    OwnerRequired,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            AuthRejection::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                "Authentication required",
            ),
            AuthRejection::OwnerRequired => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Owner account required",
            ),
        };

        (
            status,
            Json(serde_json::json!({
                "error_code": error_code,
                "message": message
            })),
        )
            .into_response()
    }
}
