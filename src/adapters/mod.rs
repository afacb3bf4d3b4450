//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - Bearer token verification (JWT, static map for tests)
//! - `events` - Event publishing (Redis pub/sub, in-memory)
//! - `http` - REST API surface and middleware
//! - `payos` - PayOS payment gateway client
//! - `postgres` - Database-backed repositories
//! - `scheduler` - Background jobs (expiry sweeper)

pub mod auth;
pub mod events;
pub mod http;
pub mod payos;
pub mod postgres;
pub mod scheduler;
