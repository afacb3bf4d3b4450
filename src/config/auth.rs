//! Authentication configuration

use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Authentication configuration (first-party HS256 tokens)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared secret used to verify session token signatures
    pub jwt_secret: String,

    /// Expected token issuer (skipped when unset)
    #[serde(default)]
    pub jwt_issuer: Option<String>,

    /// Expected token audience (skipped when unset)
    #[serde(default)]
    pub jwt_audience: Option<String>,
}

impl AuthConfig {
    /// Validate authentication configuration
    ///
    /// In production, requires a secret of at least 32 bytes.
    /// In development, any non-empty secret is accepted.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.jwt_secret.is_empty() {
            return Err(ValidationError::MissingRequired("TILLFLOW__AUTH__JWT_SECRET"));
        }

        if *environment == Environment::Production && self.jwt_secret.len() < 32 {
            return Err(ValidationError::JwtSecretTooShort);
        }

        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_issuer: None,
            jwt_audience: None,
        }
    }
}
