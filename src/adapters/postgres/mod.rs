//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresSubscriptionRepository` - One-row-per-account subscription storage
//! - `PostgresPaymentHistoryRepository` - Append-only payment ledger
//! - `PostgresAccountDirectory` - Account/store lookups and the premium mirror
//! - `PostgresNotificationStore` - Durable in-app notification records

mod account_directory;
mod notification_store;
mod payment_history_repository;
mod subscription_repository;

pub use account_directory::PostgresAccountDirectory;
pub use notification_store::PostgresNotificationStore;
pub use payment_history_repository::PostgresPaymentHistoryRepository;
pub use subscription_repository::PostgresSubscriptionRepository;
