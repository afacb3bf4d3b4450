//! PayOS payment gateway adapter.
//!
//! Implements the `PaymentGateway` port against the PayOS
//! payment-request API, plus a deterministic mock for tests and
//! credential-less development.
//!
//! # Security
//!
//! - Outgoing requests signed with HMAC-SHA256 under the checksum secret
//! - Webhook verification lives in the domain layer and runs over the
//!   raw request body before any parsing
//! - All secrets are handled via `secrecy::SecretString`

mod mock_gateway;
mod payos_gateway;

pub use mock_gateway::MockPaymentGateway;
pub use payos_gateway::{PayosConfig, PayosPaymentGateway};
