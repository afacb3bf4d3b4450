//! Expiry sweep command handler.
//!
//! The daily convergence pass: rows whose clock ran out while the
//! owner generated no requests are flipped to EXPIRED and their premium
//! mirror cleared. The gate self-heals independently on live traffic;
//! this sweep exists for the accounts nobody touched.
//!
//! One poisoned row must not starve the rest, so per-row failures are
//! logged and skipped while the scans themselves propagate errors.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::subscription::Subscription;
use crate::ports::{AccountDirectory, SubscriptionRepository};

/// Result of one sweep pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepExpiredResult {
    /// Trial rows converged to EXPIRED.
    pub trials_expired: usize,

    /// Active rows converged to EXPIRED.
    pub actives_expired: usize,
}

impl SweepExpiredResult {
    pub fn total(&self) -> usize {
        self.trials_expired + self.actives_expired
    }
}

/// Handler for the daily expiry sweep.
pub struct SweepExpiredHandler {
    subscription_repository: Arc<dyn SubscriptionRepository>,
    account_directory: Arc<dyn AccountDirectory>,
}

impl SweepExpiredHandler {
    pub fn new(
        subscription_repository: Arc<dyn SubscriptionRepository>,
        account_directory: Arc<dyn AccountDirectory>,
    ) -> Self {
        Self {
            subscription_repository,
            account_directory,
        }
    }

    /// Runs both scans once against the current clock.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` if either lapsed-row scan fails
    pub async fn handle(&self) -> Result<SweepExpiredResult, DomainError> {
        let now = Timestamp::now();

        let lapsed_trials = self.subscription_repository.find_lapsed_trials(now).await?;
        let trials_expired = self.converge_all(lapsed_trials).await;

        let lapsed_actives = self
            .subscription_repository
            .find_lapsed_actives(now)
            .await?;
        let actives_expired = self.converge_all(lapsed_actives).await;

        if trials_expired + actives_expired > 0 {
            tracing::info!(trials_expired, actives_expired, "Expiry sweep converged rows");
        }

        Ok(SweepExpiredResult {
            trials_expired,
            actives_expired,
        })
    }

    /// Converges each row, counting the ones that stuck.
    async fn converge_all(&self, rows: Vec<Subscription>) -> usize {
        let mut converged = 0;
        for mut row in rows {
            if let Err(e) = row.expire() {
                tracing::error!(
                    subscription_id = %row.id,
                    error = %e,
                    "Sweep could not mark row expired"
                );
                continue;
            }
            if let Err(e) = self.subscription_repository.update(&row).await {
                tracing::error!(
                    subscription_id = %row.id,
                    error = %e,
                    "Sweep could not persist expired row"
                );
                continue;
            }
            converged += 1;

            if let Err(e) = self
                .account_directory
                .set_premium(&row.account_id, false)
                .await
            {
                tracing::warn!(
                    account_id = %row.account_id,
                    error = %e,
                    "Sweep could not clear the premium mirror"
                );
            }
        }
        converged
    }
}
