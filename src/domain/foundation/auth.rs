//! Authentication types for the domain layer.
//!
//! These types represent an authenticated account extracted from a bearer
//! token. They have **no provider dependencies** - any token issuer can
//! populate them via the `TokenVerifier` port.
//!
//! # Example
//!
//! ```ignore
//! // In HTTP middleware, after JWT validation:
//! let account = AuthenticatedAccount::new(account_id, AccountRole::Owner);
//!
//! // Inject into request extensions for handlers to use
//! request.extensions_mut().insert(account);
//! ```

use super::AccountId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of an authenticated account within a tenancy.
///
/// Owners carry the billing relationship; staff operate under an owner's
/// store and inherit entitlement from that owner's subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    Owner,
    Staff,
}

impl AccountRole {
    /// True for roles that hold their own subscription.
    pub fn is_owner_equivalent(&self) -> bool {
        matches!(self, AccountRole::Owner)
    }

    /// Parses a role from its wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "owner" => Some(AccountRole::Owner),
            "staff" => Some(AccountRole::Staff),
            _ => None,
        }
    }

    /// Returns the wire representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::Owner => "owner",
            AccountRole::Staff => "staff",
        }
    }
}

/// Authenticated account extracted from a validated bearer token.
///
/// This is a **domain type** with no provider dependencies; the
/// `TokenVerifier` port populates it in HTTP middleware.
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount {
    /// The unique account identifier from the token subject.
    pub account_id: AccountId,

    /// The account's role within its tenancy.
    pub role: AccountRole,
}

impl AuthenticatedAccount {
    /// Creates a new authenticated account.
    ///
    /// Typically called by the `TokenVerifier` adapter after successfully
    /// validating a token.
    pub fn new(account_id: AccountId, role: AccountRole) -> Self {
        Self { account_id, role }
    }

    /// True when the account holds its own subscription.
    pub fn is_owner_equivalent(&self) -> bool {
        self.role.is_owner_equivalent()
    }
}

/// Authentication errors that can occur during token validation.
///
/// These errors are **domain-centric** - they describe what went wrong
/// from the application's perspective, not the token issuer's.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The token is missing, malformed, or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The token has expired (separate from InvalidToken for specific handling).
    #[error("Token expired")]
    TokenExpired,

    /// Token is valid but carries no usable identity claims.
    #[error("Token missing required claims")]
    MissingClaims,

    /// The authentication service is unavailable (network, config, etc.).
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Creates a service unavailable error with a message.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this error indicates the caller should re-authenticate.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidToken | AuthError::TokenExpired | AuthError::MissingClaims
        )
    }

    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::ServiceUnavailable(_))
    }
}
