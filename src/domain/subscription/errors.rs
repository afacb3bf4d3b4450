//! Subscription-specific error types.
//!
//! Errors related to subscription lifecycle, checkout, payment processing,
//! and entitlement evaluation.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFound | 404 |
//! | NotFoundForAccount | 404 |
//! | PendingOrderNotFound | 404 |
//! | AlreadyActive | 409 |
//! | InvalidPlan | 400 |
//! | InvalidState | 409 |
//! | AccountNotFound | 404 |
//! | StoreNotFound | 404 |
//! | GatewayFailed | 502 |
//! | InvalidWebhookSignature | 401 |
//! | ValidationFailed | 400 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{AccountId, DomainError, ErrorCode, StoreId, SubscriptionId};

use super::plan::PlanDuration;

/// Subscription-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// Subscription was not found.
    NotFound(SubscriptionId),

    /// No subscription exists for this account.
    NotFoundForAccount(AccountId),

    /// No pending subscription matches the paid order.
    PendingOrderNotFound {
        account_id: AccountId,
        duration: PlanDuration,
    },

    /// Account already has an active paid subscription.
    AlreadyActive(AccountId),

    /// Requested plan duration is not in the catalog.
    InvalidPlan(u32),

    /// Invalid state for the requested operation.
    InvalidState {
        current: String,
        attempted: String,
    },

    /// Account was not found in the directory.
    AccountNotFound(AccountId),

    /// Store was not found in the directory.
    StoreNotFound(StoreId),

    /// Payment gateway call failed.
    GatewayFailed {
        reason: String,
    },

    /// Webhook signature verification failed.
    InvalidWebhookSignature,

    /// Validation failed.
    ValidationFailed {
        field: String,
        message: String,
    },

    /// Infrastructure error.
    Infrastructure(String),
}

impl SubscriptionError {
    // Constructor functions for cleaner error creation

    pub fn not_found(id: SubscriptionId) -> Self {
        SubscriptionError::NotFound(id)
    }

    pub fn not_found_for_account(account_id: AccountId) -> Self {
        SubscriptionError::NotFoundForAccount(account_id)
    }

    pub fn pending_order_not_found(account_id: AccountId, duration: PlanDuration) -> Self {
        SubscriptionError::PendingOrderNotFound {
            account_id,
            duration,
        }
    }

    pub fn already_active(account_id: AccountId) -> Self {
        SubscriptionError::AlreadyActive(account_id)
    }

    pub fn invalid_plan(months: u32) -> Self {
        SubscriptionError::InvalidPlan(months)
    }

    pub fn invalid_state(current: impl Into<String>, attempted: impl Into<String>) -> Self {
        SubscriptionError::InvalidState {
            current: current.into(),
            attempted: attempted.into(),
        }
    }

    pub fn account_not_found(account_id: AccountId) -> Self {
        SubscriptionError::AccountNotFound(account_id)
    }

    pub fn store_not_found(store_id: StoreId) -> Self {
        SubscriptionError::StoreNotFound(store_id)
    }

    pub fn gateway_failed(reason: impl Into<String>) -> Self {
        SubscriptionError::GatewayFailed {
            reason: reason.into(),
        }
    }

    pub fn invalid_webhook_signature() -> Self {
        SubscriptionError::InvalidWebhookSignature
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SubscriptionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        SubscriptionError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            SubscriptionError::NotFound(_) | SubscriptionError::NotFoundForAccount(_) => {
                ErrorCode::SubscriptionNotFound
            }
            SubscriptionError::PendingOrderNotFound { .. } => ErrorCode::PendingOrderNotFound,
            SubscriptionError::AlreadyActive(_) => ErrorCode::AlreadyActive,
            SubscriptionError::InvalidPlan(_) => ErrorCode::PlanInvalid,
            SubscriptionError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            SubscriptionError::AccountNotFound(_) => ErrorCode::AccountNotFound,
            SubscriptionError::StoreNotFound(_) => ErrorCode::StoreNotFound,
            SubscriptionError::GatewayFailed { .. } => ErrorCode::PaymentGatewayError,
            SubscriptionError::InvalidWebhookSignature => ErrorCode::InvalidSignature,
            SubscriptionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SubscriptionError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            SubscriptionError::NotFound(id) => format!("Subscription not found: {}", id),
            SubscriptionError::NotFoundForAccount(account_id) => {
                format!("No subscription found for account: {}", account_id)
            }
            SubscriptionError::PendingOrderNotFound {
                account_id,
                duration,
            } => format!(
                "No pending subscription for account {} with a {}-month plan",
                account_id,
                duration.months()
            ),
            SubscriptionError::AlreadyActive(account_id) => {
                format!("Account {} already has an active subscription", account_id)
            }
            SubscriptionError::InvalidPlan(months) => {
                format!("No subscription plan lasts {} months", months)
            }
            SubscriptionError::InvalidState { current, attempted } => {
                format!("Cannot {} subscription in {} state", attempted, current)
            }
            SubscriptionError::AccountNotFound(account_id) => {
                format!("Account not found: {}", account_id)
            }
            SubscriptionError::StoreNotFound(store_id) => {
                format!("Store not found: {}", store_id)
            }
            SubscriptionError::GatewayFailed { reason } => {
                format!("Payment gateway request failed: {}", reason)
            }
            SubscriptionError::InvalidWebhookSignature => {
                "Invalid webhook signature".to_string()
            }
            SubscriptionError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            SubscriptionError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Returns true if this error should trigger a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SubscriptionError::Infrastructure(_) | SubscriptionError::GatewayFailed { .. }
        )
    }
}

impl std::fmt::Display for SubscriptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for SubscriptionError {}

impl From<DomainError> for SubscriptionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::AlreadyActive => {
                SubscriptionError::Infrastructure(err.to_string())
            }
            ErrorCode::PlanInvalid => SubscriptionError::ValidationFailed {
                field: "plan".to_string(),
                message: err.to_string(),
            },
            ErrorCode::InvalidStateTransition => SubscriptionError::InvalidState {
                current: "unknown".to_string(),
                attempted: err.to_string(),
            },
            ErrorCode::ValidationFailed => SubscriptionError::ValidationFailed {
                field: "unknown".to_string(),
                message: err.to_string(),
            },
            ErrorCode::InvalidSignature => SubscriptionError::InvalidWebhookSignature,
            ErrorCode::PaymentGatewayError => SubscriptionError::GatewayFailed {
                reason: err.to_string(),
            },
            _ => SubscriptionError::Infrastructure(err.to_string()),
        }
    }
}

impl From<SubscriptionError> for DomainError {
    fn from(err: SubscriptionError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
