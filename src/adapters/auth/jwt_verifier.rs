//! JWT adapter for bearer token validation.
//!
//! Implements the `TokenVerifier` port against the platform's identity
//! service, which mints HS256 tokens under a shared secret. Validation
//! covers:
//!
//! 1. Signature against the shared secret
//! 2. Expiry claim
//! 3. Issuer and audience claims, when configured
//! 4. Mapping `sub` and `role` claims to `AuthenticatedAccount`
//!
//! # Example
//!
//! ```ignore
//! let config = JwtConfig::new("shared-secret").with_issuer("tillflow-identity");
//! let verifier = JwtTokenVerifier::new(config);
//! let account = verifier.verify("eyJ...").await?;
//! ```

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AccountId, AccountRole, AuthError, AuthenticatedAccount};
use crate::ports::TokenVerifier;

/// Configuration for the JWT verifier.
#[derive(Clone)]
pub struct JwtConfig {
    /// Shared HMAC secret the identity service signs with.
    secret: SecretString,

    /// Expected issuer claim. Unchecked when absent.
    issuer: Option<String>,

    /// Expected audience claim. Unchecked when absent.
    audience: Option<String>,
}

impl JwtConfig {
    /// Create a configuration with the shared signing secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::new(secret.into()),
            issuer: None,
            audience: None,
        }
    }

    /// Require a specific issuer claim.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Require a specific audience claim.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }
}

/// Claims carried by platform identity tokens.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject, the account id.
    sub: String,

    /// Account role within its tenancy, "owner" or "staff".
    role: String,

    /// Expiry timestamp (Unix epoch seconds).
    exp: i64,

    /// Issuer URL or name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iss: Option<String>,

    /// Audience this token was minted for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    aud: Option<String>,
}

/// JWT implementation of the TokenVerifier port.
pub struct JwtTokenVerifier {
    config: JwtConfig,
    validation: Validation,
}

impl JwtTokenVerifier {
    /// Create a verifier from configuration.
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            // Without this, tokens carrying any aud claim would be
            // rejected outright.
            None => validation.validate_aud = false,
        }

        Self { config, validation }
    }
}

#[async_trait]
impl TokenVerifier for JwtTokenVerifier {
    async fn verify(&self, token: &str) -> Result<AuthenticatedAccount, AuthError> {
        let key = DecodingKey::from_secret(self.config.secret.expose_secret().as_bytes());

        let data = decode::<Claims>(token, &key, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            }
        })?;

        let account_id = data
            .claims
            .sub
            .parse::<AccountId>()
            .map_err(|_| AuthError::MissingClaims)?;
        let role = AccountRole::parse(&data.claims.role).ok_or(AuthError::MissingClaims)?;

        Ok(AuthenticatedAccount::new(account_id, role))
    }
}
