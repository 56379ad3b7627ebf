//! In-Memory Store Implementations
//!
//! Process-local stores used when no database is configured, and by tests.
//! Uniqueness checks and the write that depends on them happen under one
//! lock, so concurrent registrations cannot both slip through.

use std::collections::HashMap;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entity::{Account, AuthSession, NewAccount};
use crate::domain::repository::{AccountRepository, SessionStore, UniqueKey};
use crate::domain::value_object::{AccountId, Email, Username};
use crate::error::{AuthError, AuthResult};

// ============================================================================
// Account Store
// ============================================================================

#[derive(Default)]
struct AccountTable {
    rows: HashMap<AccountId, Account>,
    by_username: HashMap<Username, AccountId>,
    by_email: HashMap<Email, AccountId>,
    last_id: i64,
}

impl AccountTable {
    /// First key already held by an account other than `owner`
    fn conflict(&self, username: &Username, email: &Email, owner: Option<AccountId>) -> Option<UniqueKey> {
        let taken = |id: Option<&AccountId>| id.is_some_and(|id| Some(*id) != owner);

        if taken(self.by_username.get(username)) {
            Some(UniqueKey::Username)
        } else if taken(self.by_email.get(email)) {
            Some(UniqueKey::Email)
        } else {
            None
        }
    }
}

/// Credential store kept in process memory
///
/// Identities start at 1 and are never reused.
#[derive(Default)]
pub struct MemoryAccountStore {
    table: RwLock<AccountTable>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }
}

impl AccountRepository for MemoryAccountStore {
    async fn exists_by_username(&self, username: &Username) -> AuthResult<bool> {
        Ok(self.table.read().await.by_username.contains_key(username))
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        Ok(self.table.read().await.by_email.contains_key(email))
    }

    async fn find_by_username(&self, username: &Username) -> AuthResult<Option<Account>> {
        let table = self.table.read().await;
        Ok(table
            .by_username
            .get(username)
            .and_then(|id| table.rows.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: AccountId) -> AuthResult<Option<Account>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn create(&self, account: &NewAccount) -> AuthResult<Account> {
        let mut table = self.table.write().await;

        if let Some(key) = table.conflict(&account.username, &account.email, None) {
            return Err(AuthError::UniqueViolation(key));
        }

        table.last_id += 1;
        let id = AccountId::new(table.last_id);
        let account = Account::from_new(id, account.clone(), Utc::now());

        table.by_username.insert(account.username.clone(), id);
        table.by_email.insert(account.email.clone(), id);
        table.rows.insert(id, account.clone());

        Ok(account)
    }

    async fn update(&self, account: &Account) -> AuthResult<Account> {
        let mut table = self.table.write().await;

        let Some(current) = table.rows.get(&account.id).cloned() else {
            return Err(AuthError::AccountNotFound);
        };

        if let Some(key) = table.conflict(&account.username, &account.email, Some(account.id)) {
            return Err(AuthError::UniqueViolation(key));
        }

        // Username is immutable; only the email index can move
        if current.email != account.email {
            table.by_email.remove(&current.email);
            table.by_email.insert(account.email.clone(), account.id);
        }

        let updated = Account {
            username: current.username,
            created_at: current.created_at,
            updated_at: Utc::now(),
            ..account.clone()
        };
        table.rows.insert(updated.id, updated.clone());

        Ok(updated)
    }
}

// ============================================================================
// Session Store
// ============================================================================

/// Session store kept in process memory
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: DashMap<Uuid, AuthSession>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    async fn create(&self, session: &AuthSession) -> AuthResult<()> {
        self.sessions.insert(session.session_id, session.clone());
        Ok(())
    }

    async fn find_by_id(&self, session_id: Uuid) -> AuthResult<Option<AuthSession>> {
        Ok(self
            .sessions
            .get(&session_id)
            .map(|entry| entry.value().clone()))
    }

    async fn delete(&self, session_id: Uuid) -> AuthResult<()> {
        self.sessions.remove(&session_id);
        Ok(())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now = Utc::now();
        let mut removed = 0u64;

        self.sessions.retain(|_, session| {
            let keep = !session.is_expired_at(now);
            if !keep {
                removed += 1;
            }
            keep
        });

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Profile, SessionIdentity};
    use crate::domain::value_object::{RawPassword, UserPassword};
    use platform::password::{HashParams, PasswordPolicy};

    fn new_account(username: &str, email: &str) -> NewAccount {
        let raw = RawPassword::new("secret1".to_string(), &PasswordPolicy::default()).unwrap();
        NewAccount {
            username: Username::new(username).unwrap(),
            email: Email::new(email).unwrap(),
            password_hash: UserPassword::from_raw(&raw, None, &HashParams::insecure_fast())
                .unwrap(),
            profile: Profile::default(),
        }
    }

    #[tokio::test]
    async fn test_ids_are_sequential_from_one() {
        let store = MemoryAccountStore::new();

        let a = store.create(&new_account("alice", "a@x.com")).await.unwrap();
        let b = store.create(&new_account("bob", "b@x.com")).await.unwrap();

        assert_eq!(a.id.value(), 1);
        assert_eq!(b.id.value(), 2);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicates() {
        let store = MemoryAccountStore::new();
        store.create(&new_account("alice", "a@x.com")).await.unwrap();

        let err = store.create(&new_account("alice", "other@x.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::UniqueViolation(UniqueKey::Username)));

        let err = store.create(&new_account("carol", "A@X.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::UniqueViolation(UniqueKey::Email)));

        // Failed inserts do not consume identities
        let c = store.create(&new_account("carol", "c@x.com")).await.unwrap();
        assert_eq!(c.id.value(), 2);
    }

    #[tokio::test]
    async fn test_lookups() {
        let store = MemoryAccountStore::new();
        let alice = store.create(&new_account("alice", "a@x.com")).await.unwrap();

        let username = Username::new("alice").unwrap();
        assert!(store.exists_by_username(&username).await.unwrap());
        assert!(store.exists_by_email(&Email::new("a@x.com").unwrap()).await.unwrap());
        assert!(!store.exists_by_username(&Username::new("Alice").unwrap()).await.unwrap());

        let found = store.find_by_username(&username).await.unwrap().unwrap();
        assert_eq!(found.id, alice.id);
        assert!(store.find_by_id(alice.id).await.unwrap().is_some());
        assert!(store.find_by_id(AccountId::new(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update() {
        let store = MemoryAccountStore::new();
        let alice = store.create(&new_account("alice", "a@x.com")).await.unwrap();
        store.create(&new_account("bob", "b@x.com")).await.unwrap();

        let mut changed = alice.clone();
        changed.email = Email::new("alice@x.com").unwrap();
        let updated = store.update(&changed).await.unwrap();

        assert_eq!(updated.email.as_str(), "alice@x.com");
        assert!(updated.updated_at >= alice.updated_at);
        assert!(!store.exists_by_email(&Email::new("a@x.com").unwrap()).await.unwrap());

        let mut clash = updated.clone();
        clash.email = Email::new("b@x.com").unwrap();
        let err = store.update(&clash).await.unwrap_err();
        assert!(matches!(err, AuthError::UniqueViolation(UniqueKey::Email)));

        let mut ghost = updated;
        ghost.id = AccountId::new(42);
        assert!(matches!(
            store.update(&ghost).await.unwrap_err(),
            AuthError::AccountNotFound
        ));
    }

    fn identity() -> SessionIdentity {
        SessionIdentity {
            account_id: AccountId::new(1),
            username: Username::new("alice").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_session_store() {
        let store = MemorySessionStore::new();
        let session = AuthSession::new(identity(), chrono::Duration::hours(1)).unwrap();

        store.create(&session).await.unwrap();
        let found = store.find_by_id(session.session_id).await.unwrap().unwrap();
        assert_eq!(found.identity(), identity());

        store.delete(session.session_id).await.unwrap();
        store.delete(session.session_id).await.unwrap();
        assert!(store.find_by_id(session.session_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_cleanup() {
        let store = MemorySessionStore::new();
        let live = AuthSession::new(identity(), chrono::Duration::hours(1)).unwrap();
        let expired = AuthSession::new(identity(), chrono::Duration::seconds(-1)).unwrap();

        store.create(&live).await.unwrap();
        store.create(&expired).await.unwrap();

        assert_eq!(store.cleanup_expired().await.unwrap(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.find_by_id(live.session_id).await.unwrap().is_some());
    }
}
