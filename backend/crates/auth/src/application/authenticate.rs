//! Authenticate Use Case
//!
//! Verifies a username/password pair against the stored hash.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{RawPassword, UserPassword, Username};
use crate::error::{AuthError, AuthResult};

/// Authenticate input
#[derive(Debug)]
pub struct AuthenticateInput {
    pub username: String,
    pub password: String,
}

/// Authenticate use case
pub struct AuthenticateUseCase<A>
where
    A: AccountRepository,
{
    accounts: Arc<A>,
    config: Arc<AuthConfig>,
}

impl<A> AuthenticateUseCase<A>
where
    A: AccountRepository,
{
    pub fn new(accounts: Arc<A>, config: Arc<AuthConfig>) -> Self {
        Self { accounts, config }
    }

    pub async fn execute(&self, input: AuthenticateInput) -> AuthResult<Account> {
        // A password the policy rejects cannot match any stored hash
        let password = RawPassword::new(input.password, &self.config.password_policy).ok();

        let account = match Username::new(&input.username) {
            Ok(username) => self.accounts.find_by_username(&username).await?,
            Err(_) => None,
        };

        let Some(account) = account else {
            if let Some(password) = password {
                self.burn_hash(password).await?;
            }
            tracing::warn!(username = %input.username, "Login for unknown user");
            return Err(AuthError::UserNotFound);
        };

        let Some(password) = password else {
            tracing::warn!(account_id = %account.id, "Login with invalid password");
            return Err(AuthError::InvalidCredentials);
        };

        let pepper = self.config.password_pepper.clone();
        let stored = account.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || stored.verify(&password, pepper.as_deref()))
            .await?;

        if !valid {
            tracing::warn!(account_id = %account.id, "Login with invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(
            account_id = %account.id,
            username = %account.username,
            "User authenticated"
        );

        Ok(account)
    }

    /// Spend one hash computation so an unknown username costs about as
    /// much as a wrong password
    async fn burn_hash(&self, password: RawPassword) -> AuthResult<()> {
        let pepper = self.config.password_pepper.clone();
        let params = self.config.hash_params;
        let _ = tokio::task::spawn_blocking(move || {
            UserPassword::from_raw(&password, pepper.as_deref(), &params)
        })
        .await?;
        Ok(())
    }
}
