//! Entitlement gate command handler.
//!
//! Runs on every gated request and decides allow or deny from the
//! caller's role, the request shape, and the resolved subscription.
//! Opportunistically converges lapsed rows to EXPIRED while deciding
//! (self-heal), so state is correct even before the nightly sweep.
//!
//! Denials are expected business outcomes, not errors: they carry a
//! structured reason for client routing and are never logged above
//! debug. Only infrastructure failures surface as errors.

use std::sync::Arc;

use axum::http::Method;

use crate::application::handlers::subscription::bootstrap_trial::{
    BootstrapTrialCommand, BootstrapTrialHandler,
};
use crate::domain::entitlement::{route_policy, DenyReason, EntitlementDecision};
use crate::domain::foundation::{AccountId, AuthenticatedAccount, DomainError};
use crate::domain::subscription::{Subscription, SubscriptionStatus};
use crate::ports::{AccountDirectory, SubscriptionRepository};

/// How strict the gate is for this request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateMode {
    /// The default gate: always-allowed paths and read-only grace
    /// apply, lapsed owners are denied with a routable reason.
    Standard,

    /// Hard premium gate: requires an unexpired ACTIVE subscription,
    /// no path carve-outs, no trial bootstrap.
    PremiumOnly,
}

/// Command to decide one request.
#[derive(Debug, Clone)]
pub struct CheckEntitlementCommand {
    pub account: AuthenticatedAccount,
    pub method: Method,
    pub path: String,
    pub mode: GateMode,
}

/// Result of a gate decision.
#[derive(Debug, Clone)]
pub struct CheckEntitlementResult {
    pub decision: EntitlementDecision,
}

/// Handler implementing the gate's decision sequence.
pub struct CheckEntitlementHandler {
    subscription_repository: Arc<dyn SubscriptionRepository>,
    account_directory: Arc<dyn AccountDirectory>,
    bootstrap: Arc<BootstrapTrialHandler>,
}

impl CheckEntitlementHandler {
    pub fn new(
        subscription_repository: Arc<dyn SubscriptionRepository>,
        account_directory: Arc<dyn AccountDirectory>,
        bootstrap: Arc<BootstrapTrialHandler>,
    ) -> Self {
        Self {
            subscription_repository,
            account_directory,
            bootstrap,
        }
    }

    /// Decides the request. A denial is a successful decision; errors
    /// mean the gate itself could not run.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` if a required subscription or directory read
    ///   fails
    pub async fn handle(
        &self,
        command: CheckEntitlementCommand,
    ) -> Result<CheckEntitlementResult, DomainError> {
        // 1. Path carve-outs apply only to the standard gate
        if command.mode == GateMode::Standard {
            if route_policy::is_always_allowed(&command.path) {
                return Ok(allowed());
            }
            if route_policy::is_read_only_exempt(&command.method, &command.path) {
                return Ok(allowed());
            }
        }

        // 2. Staff consume their manager's subscription, never their own
        if !command.account.is_owner_equivalent() {
            return self.decide_for_staff(&command).await;
        }

        // 3. Owner path: resolve the row, lazily granting a first trial
        let subscription = self
            .subscription_repository
            .find_latest_by_account(&command.account.account_id)
            .await?;
        let subscription = match subscription {
            Some(row) => row,
            None if command.mode == GateMode::Standard => {
                let bootstrapped = self
                    .bootstrap
                    .handle(BootstrapTrialCommand {
                        account_id: command.account.account_id,
                    })
                    .await?;
                bootstrapped.subscription
            }
            // The hard premium gate never grants anything
            None => return Ok(denied(DenyReason::PremiumEnded)),
        };

        // 4. Status evaluation
        match command.mode {
            GateMode::Standard => self.evaluate_standard(subscription).await,
            GateMode::PremiumOnly => Ok(evaluate_premium(&subscription)),
        }
    }

    /// Staff resolution: current store, its owner, the owner's row. A
    /// dead end anywhere reads as the manager's plan having lapsed.
    async fn decide_for_staff(
        &self,
        command: &CheckEntitlementCommand,
    ) -> Result<CheckEntitlementResult, DomainError> {
        let Some(store_id) = self
            .account_directory
            .current_store_of(&command.account.account_id)
            .await?
        else {
            return Ok(denied(DenyReason::ManagerExpired));
        };
        let Some(owner_id) = self.account_directory.owner_of_store(&store_id).await? else {
            return Ok(denied(DenyReason::ManagerExpired));
        };
        let Some(subscription) = self
            .subscription_repository
            .find_latest_by_account(&owner_id)
            .await?
        else {
            return Ok(denied(DenyReason::ManagerExpired));
        };

        let usable = match command.mode {
            GateMode::Standard => !subscription.is_expired(),
            GateMode::PremiumOnly => subscription.is_premium_active(),
        };
        if usable {
            Ok(allowed())
        } else {
            Ok(denied(DenyReason::ManagerExpired))
        }
    }

    /// The standard status evaluation, converging lapsed rows as it
    /// goes.
    async fn evaluate_standard(
        &self,
        mut subscription: Subscription,
    ) -> Result<CheckEntitlementResult, DomainError> {
        match subscription.status {
            SubscriptionStatus::Trial if !subscription.is_expired() => Ok(allowed()),
            SubscriptionStatus::Trial => {
                self.converge_expired(&mut subscription, false).await;
                Ok(denied(DenyReason::TrialEnded))
            }
            SubscriptionStatus::Active if !subscription.is_expired() => Ok(allowed()),
            SubscriptionStatus::Active => {
                self.converge_expired(&mut subscription, true).await;
                Ok(denied(DenyReason::PremiumEnded))
            }
            SubscriptionStatus::Pending => Ok(denied(DenyReason::PlanInvalid)),
            SubscriptionStatus::Expired | SubscriptionStatus::Cancelled => {
                Ok(denied(historical_reason(&subscription)))
            }
        }
    }

    /// Flip a lapsed row to EXPIRED and persist. The denial stands on
    /// the in-memory evaluation even when persistence fails, so a
    /// storage hiccup cannot re-open access.
    async fn converge_expired(&self, subscription: &mut Subscription, clear_mirror: bool) {
        if let Err(e) = subscription.expire() {
            tracing::error!(
                account_id = %subscription.account_id,
                error = %e,
                "Self-heal could not mark the row expired"
            );
            return;
        }
        if let Err(e) = self.subscription_repository.update(subscription).await {
            tracing::error!(
                account_id = %subscription.account_id,
                error = %e,
                "Self-heal could not persist the expired row"
            );
        }
        if clear_mirror {
            if let Err(e) = self
                .account_directory
                .set_premium(&subscription.account_id, false)
                .await
            {
                tracing::warn!(
                    account_id = %subscription.account_id,
                    error = %e,
                    "Self-heal could not clear the premium mirror"
                );
            }
        }
    }
}

fn allowed() -> CheckEntitlementResult {
    CheckEntitlementResult {
        decision: EntitlementDecision::Allowed,
    }
}

fn denied(reason: DenyReason) -> CheckEntitlementResult {
    tracing::debug!(reason = %reason, "Entitlement denied");
    CheckEntitlementResult {
        decision: EntitlementDecision::Denied(reason),
    }
}

/// Premium gate: an unexpired ACTIVE row or nothing.
fn evaluate_premium(subscription: &Subscription) -> CheckEntitlementResult {
    if subscription.is_premium_active() {
        allowed()
    } else {
        denied(DenyReason::PremiumEnded)
    }
}

/// A historical row keeps telling the client what originally lapsed:
/// rows that held a paid period read as premium-ended, pure trial rows
/// as trial-ended.
fn historical_reason(subscription: &Subscription) -> DenyReason {
    if subscription.started_at.is_some() || subscription.plan_duration.is_some() {
        DenyReason::PremiumEnded
    } else {
        DenyReason::TrialEnded
    }
}

/// Staff never hold rows themselves; exported for the attach-info pass
/// which shares the resolution.
pub(crate) async fn resolve_billing_account(
    account: &AuthenticatedAccount,
    directory: &dyn AccountDirectory,
) -> Result<Option<AccountId>, DomainError> {
    if account.is_owner_equivalent() {
        return Ok(Some(account.account_id));
    }
    let Some(store_id) = directory.current_store_of(&account.account_id).await? else {
        return Ok(None);
    };
    directory.owner_of_store(&store_id).await
}
