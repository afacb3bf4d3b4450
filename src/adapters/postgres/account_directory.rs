//! PostgreSQL implementation of AccountDirectory.
//!
//! Reads the platform's account and store tables directly. This adapter
//! only ever writes one column, the denormalized premium mirror; the
//! tables themselves are owned by the identity service.

use crate::domain::foundation::{AccountId, DomainError, ErrorCode, StoreId};
use crate::ports::AccountDirectory;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the AccountDirectory port.
pub struct PostgresAccountDirectory {
    pool: PgPool,
}

impl PostgresAccountDirectory {
    /// Creates a new PostgresAccountDirectory with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountDirectory for PostgresAccountDirectory {
    async fn current_store_of(
        &self,
        staff_id: &AccountId,
    ) -> Result<Option<StoreId>, DomainError> {
        let store_id: Option<Option<Uuid>> = sqlx::query_scalar(
            r#"
            SELECT current_store_id
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(staff_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to resolve current store: {}", e),
            )
        })?;

        // Missing account and unassigned staff both resolve to None.
        Ok(store_id.flatten().map(StoreId::from_uuid))
    }

    async fn owner_of_store(&self, store_id: &StoreId) -> Result<Option<AccountId>, DomainError> {
        let owner_id: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT owner_id
            FROM stores
            WHERE id = $1
            "#,
        )
        .bind(store_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to resolve store owner: {}", e),
            )
        })?;

        Ok(owner_id.map(AccountId::from_uuid))
    }

    async fn set_premium(
        &self,
        account_id: &AccountId,
        is_premium: bool,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET is_premium = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(is_premium)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to write premium mirror: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::AccountNotFound,
                "Account not found",
            ));
        }

        Ok(())
    }

    async fn count_stores(&self, owner_id: &AccountId) -> Result<u64, DomainError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM stores
            WHERE owner_id = $1
            "#,
        )
        .bind(owner_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to count stores: {}", e),
            )
        })?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn count_staff(&self, owner_id: &AccountId) -> Result<u64, DomainError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM accounts
            WHERE role = 'staff'
              AND current_store_id IN (SELECT id FROM stores WHERE owner_id = $1)
            "#,
        )
        .bind(owner_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to count staff: {}", e),
            )
        })?;

        Ok(u64::try_from(count).unwrap_or(0))
    }
}
