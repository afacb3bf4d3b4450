//! PostgreSQL implementation of SubscriptionRepository.
//!
//! Persists the one-row-per-account subscription aggregate. The pending
//! checkout block is denormalized into nullable columns on the same row
//! so the aggregate loads and stores in a single statement.

use crate::domain::foundation::{AccountId, DomainError, ErrorCode, SubscriptionId, Timestamp};
use crate::domain::subscription::{
    PendingCheckout, PlanDuration, Subscription, SubscriptionStatus,
};
use crate::ports::SubscriptionRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the SubscriptionRepository port.
///
/// Uses sqlx for type-safe database operations with connection pooling.
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    /// Creates a new PostgresSubscriptionRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a subscription.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    account_id: Uuid,
    status: String,
    trial_started_at: Option<DateTime<Utc>>,
    trial_ends_at: Option<DateTime<Utc>>,
    plan_months: Option<i32>,
    started_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    auto_renew: bool,
    pending_order_code: Option<String>,
    pending_amount: Option<i64>,
    pending_plan_months: Option<i32>,
    pending_checkout_url: Option<String>,
    pending_qr_code_url: Option<String>,
    pending_created_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[allow(dead_code)]
    version: i32,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let status = parse_status(&row.status)?;
        let plan_duration = row.plan_months.map(parse_plan).transpose()?;
        let pending = assemble_pending(&row)?;

        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            account_id: AccountId::from_uuid(row.account_id),
            status,
            trial_started_at: row.trial_started_at.map(Timestamp::from_datetime),
            trial_ends_at: row.trial_ends_at.map(Timestamp::from_datetime),
            plan_duration,
            started_at: row.started_at.map(Timestamp::from_datetime),
            expires_at: row.expires_at.map(Timestamp::from_datetime),
            auto_renew: row.auto_renew,
            pending,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

/// Rebuilds the pending checkout block from its denormalized columns.
///
/// The columns travel together: either all are set or none are. A row
/// with only some of them is corrupt and surfaces as a database error.
fn assemble_pending(row: &SubscriptionRow) -> Result<Option<PendingCheckout>, DomainError> {
    let Some(order_code) = row.pending_order_code.clone() else {
        return Ok(None);
    };

    match (
        row.pending_amount,
        row.pending_plan_months,
        row.pending_checkout_url.clone(),
        row.pending_qr_code_url.clone(),
        row.pending_created_at,
    ) {
        (Some(amount), Some(months), Some(checkout_url), Some(qr_code_url), Some(created_at)) => {
            Ok(Some(PendingCheckout {
                order_code,
                amount,
                plan_duration: parse_plan(months)?,
                checkout_url,
                qr_code_url,
                created_at: Timestamp::from_datetime(created_at),
            }))
        }
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Incomplete pending checkout columns for order {}", order_code),
        )),
    }
}

fn parse_status(s: &str) -> Result<SubscriptionStatus, DomainError> {
    match s.to_lowercase().as_str() {
        "trial" => Ok(SubscriptionStatus::Trial),
        "pending" => Ok(SubscriptionStatus::Pending),
        "active" => Ok(SubscriptionStatus::Active),
        "expired" => Ok(SubscriptionStatus::Expired),
        "cancelled" => Ok(SubscriptionStatus::Cancelled),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid status value: {}", s),
        )),
    }
}

fn status_to_string(status: &SubscriptionStatus) -> &'static str {
    match status {
        SubscriptionStatus::Trial => "trial",
        SubscriptionStatus::Pending => "pending",
        SubscriptionStatus::Active => "active",
        SubscriptionStatus::Expired => "expired",
        SubscriptionStatus::Cancelled => "cancelled",
    }
}

fn parse_plan(months: i32) -> Result<PlanDuration, DomainError> {
    let months = u32::try_from(months).map_err(|_| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid plan months value: {}", months),
        )
    })?;
    PlanDuration::from_months(months).map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid plan months value: {}", e),
        )
    })
}

fn plan_to_months(plan: &PlanDuration) -> i32 {
    plan.months() as i32
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn insert_trial_if_absent(
        &self,
        subscription: &Subscription,
    ) -> Result<Subscription, DomainError> {
        // First writer wins on the account_id unique index. Whoever
        // lost the race reads back the surviving row.
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, account_id, status, trial_started_at, trial_ends_at, plan_months,
                started_at, expires_at, auto_renew,
                pending_order_code, pending_amount, pending_plan_months,
                pending_checkout_url, pending_qr_code_url, pending_created_at,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            ON CONFLICT (account_id) DO NOTHING
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.account_id.as_uuid())
        .bind(status_to_string(&subscription.status))
        .bind(subscription.trial_started_at.as_ref().map(|t| *t.as_datetime()))
        .bind(subscription.trial_ends_at.as_ref().map(|t| *t.as_datetime()))
        .bind(subscription.plan_duration.as_ref().map(plan_to_months))
        .bind(subscription.started_at.as_ref().map(|t| *t.as_datetime()))
        .bind(subscription.expires_at.as_ref().map(|t| *t.as_datetime()))
        .bind(subscription.auto_renew)
        .bind(subscription.pending.as_ref().map(|p| p.order_code.clone()))
        .bind(subscription.pending.as_ref().map(|p| p.amount))
        .bind(subscription.pending.as_ref().map(|p| plan_to_months(&p.plan_duration)))
        .bind(subscription.pending.as_ref().map(|p| p.checkout_url.clone()))
        .bind(subscription.pending.as_ref().map(|p| p.qr_code_url.clone()))
        .bind(subscription.pending.as_ref().map(|p| *p.created_at.as_datetime()))
        .bind(subscription.created_at.as_datetime())
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert trial: {}", e),
            )
        })?;

        self.find_latest_by_account(&subscription.account_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    "Subscription row vanished after insert",
                )
            })
    }

    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, account_id, status, trial_started_at, trial_ends_at, plan_months,
                started_at, expires_at, auto_renew,
                pending_order_code, pending_amount, pending_plan_months,
                pending_checkout_url, pending_qr_code_url, pending_created_at,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.account_id.as_uuid())
        .bind(status_to_string(&subscription.status))
        .bind(subscription.trial_started_at.as_ref().map(|t| *t.as_datetime()))
        .bind(subscription.trial_ends_at.as_ref().map(|t| *t.as_datetime()))
        .bind(subscription.plan_duration.as_ref().map(plan_to_months))
        .bind(subscription.started_at.as_ref().map(|t| *t.as_datetime()))
        .bind(subscription.expires_at.as_ref().map(|t| *t.as_datetime()))
        .bind(subscription.auto_renew)
        .bind(subscription.pending.as_ref().map(|p| p.order_code.clone()))
        .bind(subscription.pending.as_ref().map(|p| p.amount))
        .bind(subscription.pending.as_ref().map(|p| plan_to_months(&p.plan_duration)))
        .bind(subscription.pending.as_ref().map(|p| p.checkout_url.clone()))
        .bind(subscription.pending.as_ref().map(|p| p.qr_code_url.clone()))
        .bind(subscription.pending.as_ref().map(|p| *p.created_at.as_datetime()))
        .bind(subscription.created_at.as_datetime())
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("subscriptions_account_id_key") {
                    return DomainError::new(
                        ErrorCode::DatabaseError,
                        "Account already holds a subscription row",
                    );
                }
            }
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to save subscription: {}", e),
            )
        })?;

        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                status = $2,
                trial_started_at = $3,
                trial_ends_at = $4,
                plan_months = $5,
                started_at = $6,
                expires_at = $7,
                auto_renew = $8,
                pending_order_code = $9,
                pending_amount = $10,
                pending_plan_months = $11,
                pending_checkout_url = $12,
                pending_qr_code_url = $13,
                pending_created_at = $14,
                updated_at = $15,
                version = version + 1
            WHERE id = $1
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(status_to_string(&subscription.status))
        .bind(subscription.trial_started_at.as_ref().map(|t| *t.as_datetime()))
        .bind(subscription.trial_ends_at.as_ref().map(|t| *t.as_datetime()))
        .bind(subscription.plan_duration.as_ref().map(plan_to_months))
        .bind(subscription.started_at.as_ref().map(|t| *t.as_datetime()))
        .bind(subscription.expires_at.as_ref().map(|t| *t.as_datetime()))
        .bind(subscription.auto_renew)
        .bind(subscription.pending.as_ref().map(|p| p.order_code.clone()))
        .bind(subscription.pending.as_ref().map(|p| p.amount))
        .bind(subscription.pending.as_ref().map(|p| plan_to_months(&p.plan_duration)))
        .bind(subscription.pending.as_ref().map(|p| p.checkout_url.clone()))
        .bind(subscription.pending.as_ref().map(|p| p.qr_code_url.clone()))
        .bind(subscription.pending.as_ref().map(|p| *p.created_at.as_datetime()))
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update subscription: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SubscriptionNotFound,
                "Subscription not found",
            ));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT id, account_id, status, trial_started_at, trial_ends_at, plan_months,
                   started_at, expires_at, auto_renew,
                   pending_order_code, pending_amount, pending_plan_months,
                   pending_checkout_url, pending_qr_code_url, pending_created_at,
                   created_at, updated_at, version
            FROM subscriptions
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find subscription: {}", e),
            )
        })?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_latest_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT id, account_id, status, trial_started_at, trial_ends_at, plan_months,
                   started_at, expires_at, auto_renew,
                   pending_order_code, pending_amount, pending_plan_months,
                   pending_checkout_url, pending_qr_code_url, pending_created_at,
                   created_at, updated_at, version
            FROM subscriptions
            WHERE account_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find subscription: {}", e),
            )
        })?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_pending_for_order(
        &self,
        account_id: &AccountId,
        duration: PlanDuration,
    ) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT id, account_id, status, trial_started_at, trial_ends_at, plan_months,
                   started_at, expires_at, auto_renew,
                   pending_order_code, pending_amount, pending_plan_months,
                   pending_checkout_url, pending_qr_code_url, pending_created_at,
                   created_at, updated_at, version
            FROM subscriptions
            WHERE account_id = $1
              AND status = 'pending'
              AND pending_plan_months = $2
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(plan_to_months(&duration))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find pending subscription: {}", e),
            )
        })?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_lapsed_trials(&self, now: Timestamp) -> Result<Vec<Subscription>, DomainError> {
        let rows: Vec<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT id, account_id, status, trial_started_at, trial_ends_at, plan_months,
                   started_at, expires_at, auto_renew,
                   pending_order_code, pending_amount, pending_plan_months,
                   pending_checkout_url, pending_qr_code_url, pending_created_at,
                   created_at, updated_at, version
            FROM subscriptions
            WHERE status = 'trial'
              AND trial_ends_at IS NOT NULL
              AND trial_ends_at <= $1
            ORDER BY trial_ends_at ASC
            "#,
        )
        .bind(now.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to scan lapsed trials: {}", e),
            )
        })?;

        rows.into_iter().map(Subscription::try_from).collect()
    }

    async fn find_lapsed_actives(&self, now: Timestamp) -> Result<Vec<Subscription>, DomainError> {
        let rows: Vec<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT id, account_id, status, trial_started_at, trial_ends_at, plan_months,
                   started_at, expires_at, auto_renew,
                   pending_order_code, pending_amount, pending_plan_months,
                   pending_checkout_url, pending_qr_code_url, pending_created_at,
                   created_at, updated_at, version
            FROM subscriptions
            WHERE status = 'active'
              AND expires_at IS NOT NULL
              AND expires_at <= $1
            ORDER BY expires_at ASC
            "#,
        )
        .bind(now.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to scan lapsed actives: {}", e),
            )
        })?;

        rows.into_iter().map(Subscription::try_from).collect()
    }
}
