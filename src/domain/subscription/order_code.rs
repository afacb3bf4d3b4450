//! Order code value object.
//!
//! The provider-agnostic reference correlating an external payment event
//! back to an internal pending subscription. Wire shape:
//! `SUB_{ownerId}_{durationMonths}_{epochMillis}`.

use crate::domain::foundation::{AccountId, Timestamp, ValidationError};
use std::fmt;

use super::PlanDuration;

/// Parsed order reference for a subscription purchase.
///
/// Only codes of the exact expected shape parse; anything else is some
/// other subsystem's order and gets acknowledged as "not ours". Durations
/// outside the plan catalog are treated the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderCode {
    account_id: AccountId,
    duration: PlanDuration,
    issued_at_millis: i64,
}

impl OrderCode {
    /// Issues a fresh order code for a checkout initiated now.
    pub fn issue(account_id: AccountId, duration: PlanDuration) -> Self {
        Self {
            account_id,
            duration,
            issued_at_millis: Timestamp::now().as_unix_millis(),
        }
    }

    /// Parses an order code of shape `SUB_{ownerId}_{months}_{epochMillis}`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidFormat` for any deviation from the
    /// expected shape.
    pub fn parse(code: &str) -> Result<Self, ValidationError> {
        let mut parts = code.split('_');
        let (prefix, owner, months, millis) = match (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) {
            (Some(prefix), Some(owner), Some(months), Some(millis), None) => {
                (prefix, owner, months, millis)
            }
            _ => {
                return Err(ValidationError::invalid_format(
                    "order_code",
                    "expected SUB_{owner}_{months}_{timestamp}",
                ))
            }
        };

        if prefix != "SUB" {
            return Err(ValidationError::invalid_format(
                "order_code",
                "missing SUB_ prefix",
            ));
        }

        let account_id: AccountId = owner.parse().map_err(|_| {
            ValidationError::invalid_format("order_code", "owner segment is not a UUID")
        })?;

        let months: u32 = months.parse().map_err(|_| {
            ValidationError::invalid_format("order_code", "duration segment is not a number")
        })?;
        let duration = PlanDuration::from_months(months).map_err(|_| {
            ValidationError::invalid_format("order_code", "duration is not in the plan catalog")
        })?;

        let issued_at_millis: i64 = millis.parse().map_err(|_| {
            ValidationError::invalid_format("order_code", "timestamp segment is not a number")
        })?;
        if issued_at_millis < 0 {
            return Err(ValidationError::invalid_format(
                "order_code",
                "timestamp segment is negative",
            ));
        }

        Ok(Self {
            account_id,
            duration,
            issued_at_millis,
        })
    }

    /// The owner this order bills.
    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    /// The plan duration being purchased.
    pub fn duration(&self) -> PlanDuration {
        self.duration
    }

    /// Epoch milliseconds at issue time.
    pub fn issued_at_millis(&self) -> i64 {
        self.issued_at_millis
    }
}

impl fmt::Display for OrderCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SUB_{}_{}_{}",
            self.account_id,
            self.duration.months(),
            self.issued_at_millis
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_code_roundtrips_through_parse() {
        let account = AccountId::new();
        let code = OrderCode::issue(account, PlanDuration::ThreeMonths);

        let parsed = OrderCode::parse(&code.to_string()).unwrap();
        assert_eq!(parsed.account_id(), account);
        assert_eq!(parsed.duration(), PlanDuration::ThreeMonths);
        assert_eq!(parsed.issued_at_millis(), code.issued_at_millis());
    }

    #[test]
    fn parses_a_literal_code() {
        let code =
            OrderCode::parse("SUB_550e8400-e29b-41d4-a716-446655440000_6_1700000000000").unwrap();

        assert_eq!(
            code.account_id().to_string(),
            "550e8400-e29b-41d4-a716-446655440000"
        );
        assert_eq!(code.duration(), PlanDuration::SixMonths);
        assert_eq!(code.issued_at_millis(), 1700000000000);
    }

    #[test]
    fn rejects_wrong_prefix() {
        let result = OrderCode::parse("ORD_550e8400-e29b-41d4-a716-446655440000_3_1700000000000");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_non_uuid_owner() {
        let result = OrderCode::parse("SUB_shop42_3_1700000000000");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_duration_outside_catalog() {
        let result = OrderCode::parse("SUB_550e8400-e29b-41d4-a716-446655440000_2_1700000000000");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_non_numeric_timestamp() {
        let result = OrderCode::parse("SUB_550e8400-e29b-41d4-a716-446655440000_3_today");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_negative_timestamp() {
        let result = OrderCode::parse("SUB_550e8400-e29b-41d4-a716-446655440000_3_-5");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_trailing_segments() {
        let result =
            OrderCode::parse("SUB_550e8400-e29b-41d4-a716-446655440000_3_1700000000000_extra");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_missing_segments() {
        assert!(OrderCode::parse("SUB_550e8400-e29b-41d4-a716-446655440000_3").is_err());
        assert!(OrderCode::parse("SUB").is_err());
        assert!(OrderCode::parse("").is_err());
    }

    #[test]
    fn display_uses_wire_shape() {
        let account: AccountId = "550e8400-e29b-41d4-a716-446655440000".parse().unwrap();
        let code = OrderCode::issue(account, PlanDuration::OneMonth);
        let rendered = code.to_string();

        assert!(rendered.starts_with("SUB_550e8400-e29b-41d4-a716-446655440000_1_"));
    }
}
