//! Account Lookup Use Case

use std::sync::Arc;

use crate::domain::entity::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{AccountId, Username};
use crate::error::{AuthError, AuthResult};

/// Read-only account queries
pub struct AccountLookupUseCase<A>
where
    A: AccountRepository,
{
    accounts: Arc<A>,
}

impl<A> AccountLookupUseCase<A>
where
    A: AccountRepository,
{
    pub fn new(accounts: Arc<A>) -> Self {
        Self { accounts }
    }

    pub async fn get_by_id(&self, id: AccountId) -> AuthResult<Account> {
        self.accounts
            .find_by_id(id)
            .await?
            .ok_or(AuthError::AccountNotFound)
    }

    pub async fn get_by_username(&self, username: &str) -> AuthResult<Account> {
        let Ok(username) = Username::new(username) else {
            return Err(AuthError::AccountNotFound);
        };

        self.accounts
            .find_by_username(&username)
            .await?
            .ok_or(AuthError::AccountNotFound)
    }
}
