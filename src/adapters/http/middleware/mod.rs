//! HTTP middleware for axum.
//!
//! This module contains middleware layers for cross-cutting concerns:
//!
//! - `auth` - Authentication middleware and extractors
//! - `entitlement` - Entitlement gates and the subscription info header

pub mod auth;
pub mod entitlement;

pub use auth::{auth_middleware, AuthRejection, AuthState, RequireAccount, RequireOwner};
pub use entitlement::{
    attach_info_middleware, entitlement_middleware, premium_middleware, EntitlementState,
    SUBSCRIPTION_INFO_HEADER,
};
