//! Payment history ledger entries.
//!
//! Append-only audit rows written on every successful activation. The
//! ledger is read for display and audit only; it never feeds back into
//! the subscription state machine.

use crate::domain::foundation::{AccountId, PaymentRecordId, SubscriptionId, Timestamp};
use serde::{Deserialize, Serialize};

use super::PlanDuration;

/// How a payment reached us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Confirmed by the payment provider's webhook.
    Gateway,

    /// Recorded by an operator against an external transaction.
    Manual,
}

impl PaymentMethod {
    /// Returns the wire representation of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Gateway => "gateway",
            PaymentMethod::Manual => "manual",
        }
    }

    /// Parses a method from its wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "gateway" => Some(PaymentMethod::Gateway),
            "manual" => Some(PaymentMethod::Manual),
            _ => None,
        }
    }
}

/// Outcome recorded on a ledger row.
///
/// This subsystem only ever appends `Success` rows; `Failed` exists for
/// rows written by reconciliation tooling against the same table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Success,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(PaymentStatus::Success),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

/// Whether an activation opened a new paid period or stacked onto one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationKind {
    NewActivation,
    Renewal,
}

impl ActivationKind {
    /// The human-readable note stored on the ledger row.
    pub fn note(&self) -> &'static str {
        match self {
            ActivationKind::NewActivation => "new activation",
            ActivationKind::Renewal => "renewal",
        }
    }

    /// Parses a kind back from its stored note.
    pub fn parse_note(s: &str) -> Option<Self> {
        match s {
            "new activation" => Some(ActivationKind::NewActivation),
            "renewal" => Some(ActivationKind::Renewal),
            _ => None,
        }
    }
}

/// One append-only payment ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentHistoryRecord {
    /// Unique identifier for this ledger row.
    pub id: PaymentRecordId,

    /// Owner account that paid.
    pub account_id: AccountId,

    /// Subscription row the payment activated or extended.
    pub subscription_id: SubscriptionId,

    /// Amount collected, in VND.
    pub amount: i64,

    /// Plan duration purchased.
    pub plan_duration: PlanDuration,

    /// How the payment reached us.
    pub method: PaymentMethod,

    /// Outcome of the payment.
    pub status: PaymentStatus,

    /// External transaction reference (order code or operator-supplied id).
    pub transaction_id: String,

    /// Renewal-vs-new note.
    pub kind: ActivationKind,

    /// When the payment settled.
    pub paid_at: Timestamp,

    /// When this row was written.
    pub created_at: Timestamp,
}

impl PaymentHistoryRecord {
    /// Appends a successful activation to the ledger, settled now.
    pub fn success(
        account_id: AccountId,
        subscription_id: SubscriptionId,
        amount: i64,
        plan_duration: PlanDuration,
        method: PaymentMethod,
        transaction_id: impl Into<String>,
        kind: ActivationKind,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: PaymentRecordId::new(),
            account_id,
            subscription_id,
            amount,
            plan_duration,
            method,
            status: PaymentStatus::Success,
            transaction_id: transaction_id.into(),
            kind,
            paid_at: now,
            created_at: now,
        }
    }
}
