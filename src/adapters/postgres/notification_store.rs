//! PostgreSQL implementation of NotificationStore.

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{Notice, NotificationStore};
use async_trait::async_trait;
use sqlx::PgPool;

/// PostgreSQL implementation of the NotificationStore port.
///
/// Writes are plain inserts; the notification surface that reads and
/// marks these rows lives in another service.
pub struct PostgresNotificationStore {
    pool: PgPool,
}

impl PostgresNotificationStore {
    /// Creates a new PostgresNotificationStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for PostgresNotificationStore {
    async fn record(&self, notice: &Notice) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, account_id, title, body, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(notice.id.as_uuid())
        .bind(notice.account_id.as_uuid())
        .bind(&notice.title)
        .bind(&notice.body)
        .bind(notice.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to record notification: {}", e),
            )
        })?;

        Ok(())
    }
}
