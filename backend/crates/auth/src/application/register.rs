//! Register Use Case
//!
//! Creates a new account. The caller binds a session afterwards.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::{Account, NewAccount, Profile};
use crate::domain::repository::{AccountRepository, UniqueKey};
use crate::domain::value_object::{Email, RawPassword, UserPassword, Username};
use crate::error::{AuthError, AuthResult};

/// Register input
#[derive(Debug)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    /// Plain password, dropped (and zeroized) once hashed
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
}

/// Register use case
pub struct RegisterUseCase<A>
where
    A: AccountRepository,
{
    accounts: Arc<A>,
    config: Arc<AuthConfig>,
}

impl<A> RegisterUseCase<A>
where
    A: AccountRepository,
{
    pub fn new(accounts: Arc<A>, config: Arc<AuthConfig>) -> Self {
        Self { accounts, config }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<Account> {
        let username = Username::new(&input.username)?;
        let email = Email::new(input.email)?;
        let password = RawPassword::new(input.password, &self.config.password_policy)?;

        // Username first: a request colliding on both reports the username
        if self.accounts.exists_by_username(&username).await? {
            return Err(AuthError::DuplicateUsername);
        }

        if self.accounts.exists_by_email(&email).await? {
            return Err(AuthError::DuplicateEmail);
        }

        let pepper = self.config.password_pepper.clone();
        let params = self.config.hash_params;
        let password_hash = tokio::task::spawn_blocking(move || {
            UserPassword::from_raw(&password, pepper.as_deref(), &params)
        })
        .await??;

        let new_account = NewAccount {
            username,
            email,
            password_hash,
            profile: Profile::new(input.first_name, input.last_name, input.phone_number),
        };

        // A concurrent registration may have won since the pre-checks
        let account = self
            .accounts
            .create(&new_account)
            .await
            .map_err(|e| match e {
                AuthError::UniqueViolation(UniqueKey::Username) => AuthError::DuplicateUsername,
                AuthError::UniqueViolation(UniqueKey::Email) => AuthError::DuplicateEmail,
                other => other,
            })?;

        tracing::info!(
            account_id = %account.id,
            username = %account.username,
            "Account registered"
        );

        Ok(account)
    }
}
