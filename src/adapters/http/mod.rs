//! HTTP adapters - REST API implementations.
//!
//! The billing surface has one context router plus the cross-cutting
//! middleware stack (auth, entitlement gates).

pub mod middleware;
pub mod subscription;

// Re-export key types for convenience
pub use subscription::subscription_router;
pub use subscription::SubscriptionAppState;
