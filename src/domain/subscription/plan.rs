//! Plan catalog definitions.
//!
//! The fixed set of paid plan durations and their pricing.

use crate::domain::foundation::ValidationError;
use serde::{Deserialize, Serialize};

/// Currency every plan is priced in. VND has no minor units.
pub const PLAN_CURRENCY: &str = "VND";

/// Paid plan duration in calendar months.
///
/// The catalog is closed: checkout and activation only accept these
/// three durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum PlanDuration {
    OneMonth,
    ThreeMonths,
    SixMonths,
}

impl PlanDuration {
    /// All durations in the catalog, shortest first.
    pub fn all() -> [PlanDuration; 3] {
        [
            PlanDuration::OneMonth,
            PlanDuration::ThreeMonths,
            PlanDuration::SixMonths,
        ]
    }

    /// Parses a duration from a month count.
    pub fn from_months(months: u32) -> Result<Self, ValidationError> {
        match months {
            1 => Ok(PlanDuration::OneMonth),
            3 => Ok(PlanDuration::ThreeMonths),
            6 => Ok(PlanDuration::SixMonths),
            other => Err(ValidationError::out_of_range(
                "plan_duration",
                1,
                6,
                other as i32,
            )),
        }
    }

    /// Returns the duration as a month count.
    pub fn months(&self) -> u32 {
        match self {
            PlanDuration::OneMonth => 1,
            PlanDuration::ThreeMonths => 3,
            PlanDuration::SixMonths => 6,
        }
    }

    /// Returns the display name for this plan.
    pub fn display_name(&self) -> &'static str {
        match self {
            PlanDuration::OneMonth => "1 Month",
            PlanDuration::ThreeMonths => "3 Months",
            PlanDuration::SixMonths => "6 Months",
        }
    }
}

impl From<PlanDuration> for u32 {
    fn from(duration: PlanDuration) -> Self {
        duration.months()
    }
}

impl TryFrom<u32> for PlanDuration {
    type Error = ValidationError;

    fn try_from(months: u32) -> Result<Self, Self::Error> {
        PlanDuration::from_months(months)
    }
}

impl std::fmt::Display for PlanDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A purchasable plan offer from the fixed catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanOffer {
    /// The plan duration this offer applies to.
    pub duration: PlanDuration,
    /// Full price in VND.
    pub amount: i64,
    /// Effective per-month price in VND, rounded down.
    pub amount_per_month: i64,
    /// Display name for plan pickers.
    pub display_name: &'static str,
}

impl PlanOffer {
    /// Get the offer for a specific duration.
    ///
    /// # Catalog
    ///
    /// | Duration | Price (VND) |
    /// |----------|-------------|
    /// | 1 month  | 299,000     |
    /// | 3 months | 799,000     |
    /// | 6 months | 1,499,000   |
    pub fn for_duration(duration: PlanDuration) -> Self {
        let amount = match duration {
            PlanDuration::OneMonth => 299_000,
            PlanDuration::ThreeMonths => 799_000,
            PlanDuration::SixMonths => 1_499_000,
        };
        Self {
            duration,
            amount,
            amount_per_month: amount / duration.months() as i64,
            display_name: duration.display_name(),
        }
    }

    /// The full public catalog, shortest duration first.
    pub fn catalog() -> Vec<PlanOffer> {
        PlanDuration::all()
            .into_iter()
            .map(PlanOffer::for_duration)
            .collect()
    }
}
