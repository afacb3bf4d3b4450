//! Route classification for the entitlement gate.
//!
//! Two fixed path sets drive the gate's early-allow steps. Self-service
//! paths stay reachable in every subscription state so an expired owner
//! can still see their profile and pay. Business-data paths get a
//! read-only grace period so historical data stays visible after lapse.

use axum::http::Method;
use once_cell::sync::Lazy;

/// Path prefixes reachable regardless of subscription state.
///
/// Covers self profile and password management, the whole billing
/// self-service surface, and the activity log.
static ALWAYS_ALLOWED_PREFIXES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "/api/account/profile",
        "/api/account/password",
        "/api/subscriptions",
        "/api/activity-logs",
    ]
});

/// Business-data prefixes that stay readable (GET only) after lapse.
static READ_ONLY_GRACE_PREFIXES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "/api/orders",
        "/api/financials",
        "/api/revenues",
        "/api/products",
        "/api/customers",
        "/api/notifications",
        "/api/stock",
        "/api/purchasing",
        "/api/suppliers",
    ]
});

/// Returns true when the path is reachable in every subscription state.
pub fn is_always_allowed(path: &str) -> bool {
    ALWAYS_ALLOWED_PREFIXES
        .iter()
        .any(|prefix| matches_prefix(path, prefix))
}

/// Returns true when the request qualifies for the read-only grace period.
///
/// Safe reads against the fixed business-data prefixes pass, as does a
/// single-store detail read. Writes never qualify.
pub fn is_read_only_exempt(method: &Method, path: &str) -> bool {
    if *method != Method::GET {
        return false;
    }

    READ_ONLY_GRACE_PREFIXES
        .iter()
        .any(|prefix| matches_prefix(path, prefix))
        || is_store_detail_read(path)
}

/// Matches a path against a prefix at segment boundaries.
///
/// `/api/products` matches `/api/products` and `/api/products/123`
/// but not `/api/productsheet`.
fn matches_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Matches `/api/stores/{id}` with exactly one trailing segment.
fn is_store_detail_read(path: &str) -> bool {
    match path.strip_prefix("/api/stores/") {
        Some(rest) => !rest.is_empty() && !rest.contains('/'),
        None => false,
    }
}
