//! Subscription info attachment query handler.
//!
//! Computes the status and days-remaining that get attached to
//! responses for client display. Strictly non-blocking: every failure
//! collapses to "no info" so this pass can never affect the request it
//! rides on.

use std::sync::Arc;

use crate::application::handlers::subscription::check_entitlement::resolve_billing_account;
use crate::domain::entitlement::EntitlementInfo;
use crate::domain::foundation::AuthenticatedAccount;
use crate::ports::{AccountDirectory, SubscriptionRepository};

/// Query for the display info of the caller's effective subscription.
#[derive(Debug, Clone)]
pub struct AttachSubscriptionInfoQuery {
    pub account: AuthenticatedAccount,
}

/// Handler for the attach-info pass.
pub struct AttachSubscriptionInfoHandler {
    subscription_repository: Arc<dyn SubscriptionRepository>,
    account_directory: Arc<dyn AccountDirectory>,
}

impl AttachSubscriptionInfoHandler {
    pub fn new(
        subscription_repository: Arc<dyn SubscriptionRepository>,
        account_directory: Arc<dyn AccountDirectory>,
    ) -> Self {
        Self {
            subscription_repository,
            account_directory,
        }
    }

    /// Resolves the effective subscription and reads its clock.
    /// Never fails: a lookup failure is logged at debug and reads as
    /// no info.
    pub async fn handle(&self, query: AttachSubscriptionInfoQuery) -> Option<EntitlementInfo> {
        let billing_account =
            match resolve_billing_account(&query.account, self.account_directory.as_ref()).await {
                Ok(Some(account_id)) => account_id,
                Ok(None) => return None,
                Err(e) => {
                    tracing::debug!(error = %e, "Attach-info resolution failed");
                    return None;
                }
            };

        match self
            .subscription_repository
            .find_latest_by_account(&billing_account)
            .await
        {
            Ok(Some(subscription)) => Some(EntitlementInfo::new(
                subscription.status,
                subscription.days_remaining(),
            )),
            Ok(None) => None,
            Err(e) => {
                tracing::debug!(error = %e, "Attach-info lookup failed");
                None
            }
        }
    }
}
