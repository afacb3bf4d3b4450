//! Payment webhook payload types.
//!
//! Defines the structures for parsing PayOS webhook payloads.
//! Only fields relevant to our processing are captured.

use serde::{Deserialize, Serialize};

/// Payment confirmation event delivered by the payment provider.
///
/// Contains the essential fields needed for webhook processing.
/// Additional fields from the provider's full schema are ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentWebhookEvent {
    /// Provider result code ("00" indicates success).
    #[serde(default)]
    pub code: Option<String>,

    /// Human-readable result description.
    #[serde(default)]
    pub desc: Option<String>,

    /// Overall success flag.
    #[serde(default)]
    pub success: Option<bool>,

    /// Transaction details for the completed payment.
    pub data: PaymentWebhookData,
}

/// Transaction details carried inside the webhook envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentWebhookData {
    /// Order reference issued at checkout time.
    pub order_code: String,

    /// Paid amount in VND.
    pub amount: i64,

    /// Provider-side bank transaction reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Provider-side payment link identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_link_id: Option<String>,

    /// Settlement time as reported by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_date_time: Option<String>,
}

impl PaymentWebhookEvent {
    /// Returns the order reference carried by the event.
    pub fn order_code(&self) -> &str {
        &self.data.order_code
    }

    /// Returns the paid amount.
    pub fn amount(&self) -> i64 {
        self.data.amount
    }

    /// Returns the provider transaction reference, if present.
    pub fn reference(&self) -> Option<&str> {
        self.data.reference.as_deref()
    }
}
