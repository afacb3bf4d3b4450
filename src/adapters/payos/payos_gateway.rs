//! PayOS payment gateway adapter.
//!
//! Implements the `PaymentGateway` trait against the PayOS
//! payment-request API. Only checkout creation goes through this
//! adapter; settlement arrives on the signed webhook, verified in the
//! domain layer.
//!
//! # Security
//!
//! - Outgoing requests are signed with HMAC-SHA256 over the canonical
//!   field string, keyed by the checksum secret
//! - Secrets handled via `secrecy::SecretString`
//!
//! # Configuration
//!
//! ```ignore
//! let config = PayosConfig::new(client_id, api_key, checksum_key, return_url, cancel_url);
//! let gateway = PayosPaymentGateway::new(config);
//! ```

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::ports::{CheckoutLink, CheckoutRequest, PaymentError, PaymentGateway};

type HmacSha256 = Hmac<Sha256>;

/// Response code PayOS uses for a successful request.
const PAYOS_SUCCESS_CODE: &str = "00";

/// PayOS API configuration.
#[derive(Clone)]
pub struct PayosConfig {
    /// Merchant client id, sent as `x-client-id`.
    client_id: String,

    /// API key, sent as `x-api-key`.
    api_key: SecretString,

    /// Checksum secret used to sign requests and webhooks.
    checksum_key: SecretString,

    /// Base URL for the PayOS API.
    api_base_url: String,

    /// Where the buyer lands after completing payment.
    return_url: String,

    /// Where the buyer lands after abandoning payment.
    cancel_url: String,
}

impl PayosConfig {
    /// Create a new PayOS configuration.
    pub fn new(
        client_id: impl Into<String>,
        api_key: impl Into<String>,
        checksum_key: impl Into<String>,
        return_url: impl Into<String>,
        cancel_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            api_key: SecretString::new(api_key.into()),
            checksum_key: SecretString::new(checksum_key.into()),
            api_base_url: "https://api-merchant.payos.vn".to_string(),
            return_url: return_url.into(),
            cancel_url: cancel_url.into(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// PayOS payment gateway adapter.
pub struct PayosPaymentGateway {
    config: PayosConfig,
    http_client: reqwest::Client,
}

impl PayosPaymentGateway {
    /// Create a new PayOS gateway with the given configuration.
    pub fn new(config: PayosConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Sign a checkout request the way PayOS expects.
    ///
    /// The canonical string lists the signed fields in alphabetical
    /// order; the signature is hex-encoded HMAC-SHA256 under the
    /// checksum secret.
    fn sign_checkout(&self, request: &CheckoutRequest) -> String {
        let canonical = format!(
            "amount={}&cancelUrl={}&description={}&orderCode={}&returnUrl={}",
            request.amount,
            self.config.cancel_url,
            request.description,
            request.order_code,
            self.config.return_url
        );

        let mut mac =
            HmacSha256::new_from_slice(self.config.checksum_key.expose_secret().as_bytes())
                .expect("HMAC can take key of any size");
        mac.update(canonical.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

/// Outgoing payment-request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PayosCheckoutBody<'a> {
    order_code: &'a str,
    amount: i64,
    description: &'a str,
    return_url: &'a str,
    cancel_url: &'a str,
    signature: String,
}

/// Envelope PayOS wraps every response in.
#[derive(Debug, Deserialize)]
struct PayosResponse {
    code: String,
    desc: String,
    data: Option<PayosCheckoutData>,
}

/// Payload of a successful payment-request response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayosCheckoutData {
    checkout_url: String,
    qr_code: String,
    payment_link_id: Option<String>,
}

/// Decode a payment-request response body into a checkout link.
fn decode_checkout_response(body: &[u8]) -> Result<CheckoutLink, PaymentError> {
    let response: PayosResponse = serde_json::from_slice(body)
        .map_err(|e| PaymentError::provider(format!("Unparseable PayOS response: {}", e)))?;

    if response.code != PAYOS_SUCCESS_CODE {
        return Err(
            PaymentError::provider(format!("PayOS rejected the order: {}", response.desc))
                .with_provider_code(response.code),
        );
    }

    let data = response
        .data
        .ok_or_else(|| PaymentError::provider("PayOS success response carried no data"))?;

    Ok(CheckoutLink {
        checkout_url: data.checkout_url,
        qr_data_url: data.qr_code,
        payment_link_id: data.payment_link_id,
    })
}

#[async_trait]
impl PaymentGateway for PayosPaymentGateway {
    async fn create_checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutLink, PaymentError> {
        let url = format!("{}/v2/payment-requests", self.config.api_base_url);
        let body = PayosCheckoutBody {
            order_code: &request.order_code,
            amount: request.amount,
            description: &request.description,
            return_url: &self.config.return_url,
            cancel_url: &self.config.cancel_url,
            signature: self.sign_checkout(&request),
        };

        let response = self
            .http_client
            .post(&url)
            .header("x-client-id", &self.config.client_id)
            .header("x-api-key", self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(PaymentError::authentication(
                "PayOS rejected the merchant credentials",
            ));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, error = %error_text, "PayOS create_checkout failed");
            return Err(PaymentError::provider(format!(
                "PayOS API error: {}",
                error_text
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        decode_checkout_response(&bytes)
    }
}
