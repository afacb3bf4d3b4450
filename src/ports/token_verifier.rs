//! Token verifier port for request authentication.
//!
//! Validates bearer tokens minted by the platform's identity service and
//! extracts the calling account. Every request entering the billing
//! surface passes through this port before any entitlement evaluation.
//!
//! # Contract
//!
//! Implementations must:
//! - Verify the token signature and expiry
//! - Extract the account ID and role claims
//! - Return `AuthError::ServiceUnavailable` for transient errors only

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedAccount};

/// Validates bearer tokens and resolves the calling account.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify a bearer token.
    ///
    /// # Returns
    ///
    /// * `Ok(AuthenticatedAccount)` - Token valid, claims extracted
    /// * `Err(AuthError::InvalidToken)` - Signature or claims invalid
    /// * `Err(AuthError::TokenExpired)` - Token past its expiry
    /// * `Err(AuthError::ServiceUnavailable)` - Verification dependency down
    async fn verify(&self, token: &str) -> Result<AuthenticatedAccount, AuthError>;
}
