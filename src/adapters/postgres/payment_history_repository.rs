//! PostgreSQL implementation of PaymentHistoryRepository.
//!
//! The ledger table is append-only; rows are never updated or deleted
//! by this subsystem.

use crate::domain::foundation::{
    AccountId, DomainError, ErrorCode, PaymentRecordId, SubscriptionId, Timestamp,
};
use crate::domain::subscription::{
    ActivationKind, PaymentHistoryRecord, PaymentMethod, PaymentStatus, PlanDuration,
};
use crate::ports::PaymentHistoryRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the PaymentHistoryRepository port.
pub struct PostgresPaymentHistoryRepository {
    pool: PgPool,
}

impl PostgresPaymentHistoryRepository {
    /// Creates a new PostgresPaymentHistoryRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a payment ledger entry.
#[derive(Debug, sqlx::FromRow)]
struct PaymentHistoryRow {
    id: Uuid,
    account_id: Uuid,
    subscription_id: Uuid,
    amount: i64,
    plan_months: i32,
    method: String,
    status: String,
    transaction_id: String,
    note: String,
    paid_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentHistoryRow> for PaymentHistoryRecord {
    type Error = DomainError;

    fn try_from(row: PaymentHistoryRow) -> Result<Self, Self::Error> {
        let method = PaymentMethod::parse(&row.method).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid payment method value: {}", row.method),
            )
        })?;
        let status = PaymentStatus::parse(&row.status).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid payment status value: {}", row.status),
            )
        })?;
        let kind = ActivationKind::parse_note(&row.note).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid activation note value: {}", row.note),
            )
        })?;
        let plan_duration = parse_plan(row.plan_months)?;

        Ok(PaymentHistoryRecord {
            id: PaymentRecordId::from_uuid(row.id),
            account_id: AccountId::from_uuid(row.account_id),
            subscription_id: SubscriptionId::from_uuid(row.subscription_id),
            amount: row.amount,
            plan_duration,
            method,
            status,
            transaction_id: row.transaction_id,
            kind,
            paid_at: Timestamp::from_datetime(row.paid_at),
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn parse_plan(months: i32) -> Result<PlanDuration, DomainError> {
    u32::try_from(months)
        .ok()
        .and_then(|m| PlanDuration::from_months(m).ok())
        .ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid plan months value: {}", months),
            )
        })
}

#[async_trait]
impl PaymentHistoryRepository for PostgresPaymentHistoryRepository {
    async fn append(&self, record: &PaymentHistoryRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payment_history (
                id, account_id, subscription_id, amount, plan_months,
                method, status, transaction_id, note, paid_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.account_id.as_uuid())
        .bind(record.subscription_id.as_uuid())
        .bind(record.amount)
        .bind(record.plan_duration.months() as i32)
        .bind(record.method.as_str())
        .bind(record.status.as_str())
        .bind(&record.transaction_id)
        .bind(record.kind.note())
        .bind(record.paid_at.as_datetime())
        .bind(record.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to append payment record: {}", e),
            )
        })?;

        Ok(())
    }

    async fn list_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<PaymentHistoryRecord>, DomainError> {
        let rows: Vec<PaymentHistoryRow> = sqlx::query_as(
            r#"
            SELECT id, account_id, subscription_id, amount, plan_months,
                   method, status, transaction_id, note, paid_at, created_at
            FROM payment_history
            WHERE account_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to list payment records: {}", e),
            )
        })?;

        rows.into_iter().map(PaymentHistoryRecord::try_from).collect()
    }

    async fn total_paid_by_account(&self, account_id: &AccountId) -> Result<i64, DomainError> {
        // SUM over BIGINT widens to NUMERIC, so cast back down.
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount), 0)::BIGINT
            FROM payment_history
            WHERE account_id = $1
              AND status = 'success'
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to total payments: {}", e),
            )
        })?;

        Ok(total)
    }

    async fn count_by_account(&self, account_id: &AccountId) -> Result<u64, DomainError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM payment_history
            WHERE account_id = $1
              AND status = 'success'
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to count payments: {}", e),
            )
        })?;

        Ok(u64::try_from(count).unwrap_or(0))
    }
}
