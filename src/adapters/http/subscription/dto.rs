//! HTTP DTOs (Data Transfer Objects) for subscription endpoints.
//!
//! These types define the JSON request/response structure for the billing
//! API. They serve as the boundary between HTTP and the application layer.

use serde::{Deserialize, Serialize};

use crate::application::{GetSubscriptionResult, GetUsageResult, StartCheckoutResult};
use crate::domain::subscription::{
    PaymentHistoryRecord, PlanOffer, SubscriptionStatus, SubscriptionSummary,
};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to start a paid checkout.
#[derive(Debug, Clone, Deserialize)]
pub struct StartCheckoutRequest {
    /// Plan length in months. Must be one of the catalog durations.
    pub plan_duration: u32,
}

/// Request to record an operator-confirmed payment.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivateSubscriptionRequest {
    /// Plan length in months. Must be one of the catalog durations.
    pub plan_duration: u32,
    /// Amount collected, in VND.
    pub amount: i64,
    /// External transaction reference from the payment terminal or bank.
    pub transaction_id: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// One purchasable plan.
#[derive(Debug, Clone, Serialize)]
pub struct PlanOfferResponse {
    /// Plan length in months.
    pub duration_months: u32,
    /// Full price in VND.
    pub amount: i64,
    /// Effective per-month price in VND.
    pub amount_per_month: i64,
    /// Display name for plan pickers.
    pub display_name: &'static str,
}

impl From<PlanOffer> for PlanOfferResponse {
    fn from(offer: PlanOffer) -> Self {
        Self {
            duration_months: offer.duration.months(),
            amount: offer.amount,
            amount_per_month: offer.amount_per_month,
            display_name: offer.display_name,
        }
    }
}

/// The public plan catalog, shortest plan first.
#[derive(Debug, Clone, Serialize)]
pub struct PlanCatalogResponse {
    pub plans: Vec<PlanOfferResponse>,
}

/// The caller's current subscription.
///
/// The summary flattens to `{"type": "trial" | "premium" | "none", ...}`
/// so clients can switch on one field.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentSubscriptionResponse {
    #[serde(flatten)]
    pub summary: SubscriptionSummary,
    /// Whole days left on the status-appropriate clock.
    pub days_remaining: u32,
}

impl From<GetSubscriptionResult> for CurrentSubscriptionResponse {
    fn from(result: GetSubscriptionResult) -> Self {
        Self {
            summary: result.summary,
            days_remaining: result.days_remaining,
        }
    }
}

/// Response for a started checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    /// Hosted payment page URL.
    pub checkout_url: String,
    /// Inline QR code for bank transfer apps.
    pub qr_code_url: String,
    /// Full price in VND.
    pub amount: i64,
    /// Order reference the webhook will echo back.
    pub order_code: String,
}

impl From<StartCheckoutResult> for CheckoutResponse {
    fn from(result: StartCheckoutResult) -> Self {
        Self {
            checkout_url: result.checkout_url,
            qr_code_url: result.qr_data_url,
            amount: result.amount,
            order_code: result.order_code,
        }
    }
}

/// Response for a completed manual activation.
#[derive(Debug, Clone, Serialize)]
pub struct ActivationResponse {
    #[serde(flatten)]
    pub summary: SubscriptionSummary,
    pub days_remaining: u32,
    /// "new activation" or "renewal", matching the ledger note.
    pub note: &'static str,
}

/// One payment ledger row.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRecordResponse {
    pub id: String,
    /// Amount in VND.
    pub amount: i64,
    /// Plan length the payment covered, in months.
    pub plan_duration: u32,
    /// Payment channel, `gateway` or `manual`.
    pub method: &'static str,
    pub status: &'static str,
    /// Provider or operator transaction reference.
    pub transaction_id: String,
    /// "new activation" or "renewal".
    pub note: &'static str,
    /// When the payment settled (ISO 8601).
    pub paid_at: String,
    /// When the row was written (ISO 8601).
    pub created_at: String,
}

impl From<PaymentHistoryRecord> for PaymentRecordResponse {
    fn from(record: PaymentHistoryRecord) -> Self {
        Self {
            id: record.id.to_string(),
            amount: record.amount,
            plan_duration: record.plan_duration.months(),
            method: record.method.as_str(),
            status: record.status.as_str(),
            transaction_id: record.transaction_id,
            note: record.kind.note(),
            paid_at: record.paid_at.as_datetime().to_rfc3339(),
            created_at: record.created_at.as_datetime().to_rfc3339(),
        }
    }
}

/// The caller's payment ledger, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentHistoryResponse {
    pub payments: Vec<PaymentRecordResponse>,
}

/// Informational usage counts for the caller's tenancy.
#[derive(Debug, Clone, Serialize)]
pub struct UsageResponse {
    /// Current subscription status, null when no row exists.
    pub status: Option<SubscriptionStatus>,
    pub days_remaining: u32,
    pub store_count: u64,
    pub staff_count: u64,
    /// Number of settled payments.
    pub payment_count: u64,
    /// Lifetime paid total in VND.
    pub total_paid: i64,
}

impl From<GetUsageResult> for UsageResponse {
    fn from(result: GetUsageResult) -> Self {
        Self {
            status: result.status,
            days_remaining: result.days_remaining,
            store_count: result.store_count,
            staff_count: result.staff_count,
            payment_count: result.payment_count,
            total_paid: result.total_paid,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Response DTO
// ════════════════════════════════════════════════════════════════════════════════

/// Standard error response for API errors.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Stable error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Create an error response with details.
    pub fn with_details(
        error_code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{AccountId, SubscriptionId, Timestamp};
    use crate::domain::subscription::{ActivationKind, PaymentMethod, PlanDuration};

    // ════════════════════════════════════════════════════════════════════════════
    // Request DTO Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn start_checkout_request_deserializes() {
        let json = r#"{"plan_duration": 3}"#;
        let request: StartCheckoutRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.plan_duration, 3);
    }

    #[test]
    fn activate_request_deserializes() {
        let json = r#"{
            "plan_duration": 6,
            "amount": 1499000,
            "transaction_id": "FT-2026-0042"
        }"#;
        let request: ActivateSubscriptionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.plan_duration, 6);
        assert_eq!(request.amount, 1_499_000);
        assert_eq!(request.transaction_id, "FT-2026-0042");
    }

    #[test]
    fn activate_request_rejects_missing_transaction_id() {
        let json = r#"{"plan_duration": 1, "amount": 299000}"#;
        let result: Result<ActivateSubscriptionRequest, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Response DTO Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn plan_offer_response_carries_catalog_prices() {
        let response = PlanOfferResponse::from(PlanOffer::for_duration(PlanDuration::ThreeMonths));

        assert_eq!(response.duration_months, 3);
        assert_eq!(response.amount, 799_000);
        assert_eq!(response.amount_per_month, 266_333);
        assert_eq!(response.display_name, "3 Months");
    }

    #[test]
    fn current_subscription_response_flattens_the_summary_tag() {
        let response = CurrentSubscriptionResponse {
            summary: SubscriptionSummary::Trial {
                ends_at: Timestamp::now().add_days(10),
            },
            days_remaining: 10,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""type":"trial""#));
        assert!(json.contains(r#""days_remaining":10"#));
    }

    #[test]
    fn none_summary_serializes_with_type_only() {
        let response = CurrentSubscriptionResponse {
            summary: SubscriptionSummary::None,
            days_remaining: 0,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""type":"none""#));
    }

    #[test]
    fn premium_summary_serializes_duration_as_months() {
        let response = CurrentSubscriptionResponse {
            summary: SubscriptionSummary::Premium {
                duration: PlanDuration::SixMonths,
                started_at: Timestamp::now(),
                expires_at: Timestamp::now().add_months(6),
                auto_renew: true,
            },
            days_remaining: 180,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""type":"premium""#));
        assert!(json.contains(r#""duration":6"#));
        assert!(json.contains(r#""auto_renew":true"#));
    }

    #[test]
    fn payment_record_response_from_record() {
        let record = PaymentHistoryRecord::success(
            AccountId::new(),
            SubscriptionId::new(),
            799_000,
            PlanDuration::ThreeMonths,
            PaymentMethod::Manual,
            "FT-1",
            ActivationKind::Renewal,
        );

        let response = PaymentRecordResponse::from(record.clone());
        assert_eq!(response.id, record.id.to_string());
        assert_eq!(response.plan_duration, 3);
        assert_eq!(response.method, "manual");
        assert_eq!(response.status, "success");
        assert_eq!(response.note, "renewal");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Error Response Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn error_response_new_creates_response() {
        let response = ErrorResponse::new("PLAN_INVALID", "Unknown plan duration");
        assert_eq!(response.error_code, "PLAN_INVALID");
        assert_eq!(response.message, "Unknown plan duration");
        assert!(response.details.is_none());
    }

    #[test]
    fn error_response_serializes_without_details_when_none() {
        let response = ErrorResponse::new("TRIAL_ENDED", "Trial has ended");
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("details"));
    }

    #[test]
    fn error_response_serializes_with_details_when_present() {
        let details = serde_json::json!({"reason": "trial-ended"});
        let response = ErrorResponse::with_details("TRIAL_ENDED", "Trial has ended", details);
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""reason":"trial-ended""#));
    }
}
