//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `SubscriptionRepository` - Subscription row persistence and scans
//! - `PaymentHistoryRepository` - Append-only payment ledger
//!
//! ## Platform Ports
//!
//! - `AccountDirectory` - Staff/store resolution, premium mirror, counts
//! - `TokenVerifier` - Bearer token validation
//! - `NotificationStore` - Durable in-app notification records
//!
//! ## External Collaborator Ports
//!
//! - `PaymentGateway` - Hosted checkout link/QR creation
//! - `EventPublisher` - Best-effort real-time event publishing

mod account_directory;
mod event_publisher;
mod notification_store;
mod payment_gateway;
mod payment_history_repository;
mod subscription_repository;
mod token_verifier;

pub use account_directory::AccountDirectory;
pub use event_publisher::EventPublisher;
pub use notification_store::{Notice, NotificationStore};
pub use payment_gateway::{
    CheckoutLink, CheckoutRequest, PaymentError, PaymentErrorCode, PaymentGateway,
};
pub use payment_history_repository::PaymentHistoryRepository;
pub use subscription_repository::SubscriptionRepository;
pub use token_verifier::TokenVerifier;
