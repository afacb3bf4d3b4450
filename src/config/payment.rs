//! Payment configuration

use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Payment configuration (PayOS)
///
/// All credentials may be left unset in development, in which case the
/// application falls back to a stub gateway and rejects webhook deliveries
/// as unverifiable. Production requires the full set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentConfig {
    /// PayOS client id
    #[serde(default)]
    pub payos_client_id: String,

    /// PayOS API key
    #[serde(default)]
    pub payos_api_key: String,

    /// Checksum key, used both to sign checkout requests and to verify
    /// webhook signatures
    #[serde(default)]
    pub payos_checksum_key: String,

    /// Override for the PayOS API base URL (sandbox testing)
    #[serde(default)]
    pub payos_base_url: Option<String>,

    /// URL the gateway redirects to after a successful payment
    #[serde(default)]
    pub return_url: String,

    /// URL the gateway redirects to after a cancelled payment
    #[serde(default)]
    pub cancel_url: String,
}

impl PaymentConfig {
    /// Check whether the full PayOS credential set is present
    pub fn is_configured(&self) -> bool {
        !self.payos_client_id.is_empty()
            && !self.payos_api_key.is_empty()
            && !self.payos_checksum_key.is_empty()
    }

    /// Secret used to verify webhook signatures, when configured
    pub fn webhook_secret(&self) -> Option<&str> {
        if self.payos_checksum_key.is_empty() {
            None
        } else {
            Some(&self.payos_checksum_key)
        }
    }

    /// Validate payment configuration
    ///
    /// A partially-set credential trio is always an error (it means a
    /// deployment typo, not a deliberate stub setup). Production requires
    /// the full set plus redirect URLs.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let any_set = !self.payos_client_id.is_empty()
            || !self.payos_api_key.is_empty()
            || !self.payos_checksum_key.is_empty();

        if any_set && !self.is_configured() {
            return Err(ValidationError::PaymentConfigIncomplete);
        }

        if *environment == Environment::Production && !self.is_configured() {
            return Err(ValidationError::PaymentConfigIncomplete);
        }

        if self.is_configured() {
            if !is_http_url(&self.return_url) || !is_http_url(&self.cancel_url) {
                return Err(ValidationError::InvalidPaymentUrl);
            }
        }

        Ok(())
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}
