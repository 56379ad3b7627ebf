//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the infra layer.

use derive_more::Display;
use uuid::Uuid;

use crate::domain::entity::{Account, AuthSession, NewAccount};
use crate::domain::value_object::{AccountId, Email, Username};
use crate::error::AuthResult;

/// Column guarded by a uniqueness constraint
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum UniqueKey {
    #[display("username")]
    Username,
    #[display("email")]
    Email,
}

/// Credential store
///
/// `create` and `update` must reject a duplicate username or email with
/// `AuthError::UniqueViolation`, even when racing another writer.
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    async fn exists_by_username(&self, username: &Username) -> AuthResult<bool>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    async fn find_by_username(&self, username: &Username) -> AuthResult<Option<Account>>;

    async fn find_by_id(&self, id: AccountId) -> AuthResult<Option<Account>>;

    /// Insert, assigning a fresh identity
    async fn create(&self, account: &NewAccount) -> AuthResult<Account>;

    /// Overwrite mutable fields of an existing account
    async fn update(&self, account: &Account) -> AuthResult<Account>;
}

/// Session store
#[trait_variant::make(SessionStore: Send)]
pub trait LocalSessionStore {
    async fn create(&self, session: &AuthSession) -> AuthResult<()>;

    async fn find_by_id(&self, session_id: Uuid) -> AuthResult<Option<AuthSession>>;

    /// Delete a session (no-op if absent)
    async fn delete(&self, session_id: Uuid) -> AuthResult<()>;

    /// Clean up expired sessions
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
