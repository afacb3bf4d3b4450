//! Entitlement domain module.
//!
//! Pure decision types and route classification backing the gate that
//! screens business requests against the caller's subscription.
//!
//! # Module Structure
//!
//! - `decision` - Allow/deny outcomes and rejection reasons
//! - `route_policy` - Always-allowed and read-only-grace path sets

mod decision;
pub mod route_policy;

pub use decision::{DenyReason, EntitlementDecision, EntitlementInfo};
