//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `subscription` - Subscription lifecycle, plans, payments, and webhooks
//! - `entitlement` - Gate decisions and route classification

pub mod entitlement;
pub mod foundation;
pub mod subscription;
