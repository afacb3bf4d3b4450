//! Notification store port.
//!
//! Defines the contract for recording durable in-app notifications.
//! The billing subsystem only writes these rows; the platform's
//! notification surface reads them.
//!
//! Recording is fire-and-forget from the caller's perspective: a
//! failed write is logged and never blocks the activation it announces.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AccountId, DomainError, NotificationId, Timestamp};

/// Port for durable notification records.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Record a notification for later display.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn record(&self, notice: &Notice) -> Result<(), DomainError>;
}

/// A durable in-app notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Unique notification ID.
    pub id: NotificationId,

    /// Account the notification is addressed to.
    pub account_id: AccountId,

    /// Short headline.
    pub title: String,

    /// Full message body.
    pub body: String,

    /// When the notification was created.
    pub created_at: Timestamp,
}

impl Notice {
    /// Creates a notification addressed to an account.
    pub fn new(account_id: AccountId, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: NotificationId::new(),
            account_id,
            title: title.into(),
            body: body.into(),
            created_at: Timestamp::now(),
        }
    }
}
