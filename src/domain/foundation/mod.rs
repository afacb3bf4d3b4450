//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, error types, and the state-machine
//! trait that form the vocabulary of the Tillflow billing domain.

mod auth;
mod errors;
mod events;
mod ids;
mod state_machine;
mod timestamp;

pub use auth::{AccountRole, AuthError, AuthenticatedAccount};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::EventEnvelope;
pub use ids::{AccountId, NotificationId, PaymentRecordId, StoreId, SubscriptionId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
