//! Static token verifier for testing.
//!
//! Maps literal token strings to accounts, avoiding real JWT minting in
//! integration tests.
//!
//! # Example
//!
//! ```ignore
//! let verifier = StaticTokenVerifier::new()
//!     .with_account("owner-token", AuthenticatedAccount::new(owner_id, AccountRole::Owner));
//!
//! let account = verifier.verify("owner-token").await?;
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{AccountId, AccountRole, AuthError, AuthenticatedAccount};
use crate::ports::TokenVerifier;

/// Static token verifier for tests.
///
/// Tokens not in the map return `InvalidToken`.
#[derive(Debug, Default)]
pub struct StaticTokenVerifier {
    tokens: RwLock<HashMap<String, AuthenticatedAccount>>,
}

impl StaticTokenVerifier {
    /// Creates a new empty verifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a token that maps to the given account.
    pub fn with_account(self, token: impl Into<String>, account: AuthenticatedAccount) -> Self {
        self.tokens
            .write()
            .expect("StaticTokenVerifier: lock poisoned")
            .insert(token.into(), account);
        self
    }

    /// Adds a token for a fresh owner account, returning its id.
    pub fn with_owner(self, token: impl Into<String>) -> (Self, AccountId) {
        let account_id = AccountId::new();
        let verifier =
            self.with_account(token, AuthenticatedAccount::new(account_id, AccountRole::Owner));
        (verifier, account_id)
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<AuthenticatedAccount, AuthError> {
        self.tokens
            .read()
            .expect("StaticTokenVerifier: lock poisoned")
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
