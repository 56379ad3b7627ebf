//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::error::conversions::unique_violation_constraint;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{Account, AuthSession, NewAccount, Profile};
use crate::domain::repository::{AccountRepository, SessionStore, UniqueKey};
use crate::domain::value_object::{AccountId, Email, UserPassword, Username};
use crate::error::{AuthError, AuthResult};

/// Constraint names from the accounts migration
const ACCOUNTS_USERNAME_KEY: &str = "accounts_username_key";
const ACCOUNTS_EMAIL_KEY: &str = "accounts_email_key";

const ACCOUNT_COLUMNS: &str = "id, username, email, password_hash, first_name, last_name, \
                               phone_number, created_at, updated_at";

/// Translate a unique violation into the key it guards
fn map_write_error(err: sqlx::Error) -> AuthError {
    let key = match unique_violation_constraint(&err) {
        Some(ACCOUNTS_USERNAME_KEY) => Some(UniqueKey::Username),
        Some(ACCOUNTS_EMAIL_KEY) => Some(UniqueKey::Email),
        _ => None,
    };

    match key {
        Some(key) => AuthError::UniqueViolation(key),
        None => AuthError::Database(err),
    }
}

// ============================================================================
// Account Repository Implementation
// ============================================================================

/// PostgreSQL-backed credential store
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl AccountRepository for PgAccountStore {
    async fn exists_by_username(&self, username: &Username) -> AuthResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE username = $1)")
                .bind(username.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn find_by_username(&self, username: &Username) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE username = $1"
        ))
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn find_by_id(&self, id: AccountId) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn create(&self, account: &NewAccount) -> AuthResult<Account> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            INSERT INTO accounts (
                username,
                email,
                password_hash,
                first_name,
                last_name,
                phone_number
            ) VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(account.username.as_str())
        .bind(account.email.as_str())
        .bind(account.password_hash.as_phc_string())
        .bind(account.profile.first_name.as_deref())
        .bind(account.profile.last_name.as_deref())
        .bind(account.profile.phone_number.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        row.into_account()
    }

    async fn update(&self, account: &Account) -> AuthResult<Account> {
        // username is never written after creation
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            UPDATE accounts SET
                email = $2,
                password_hash = $3,
                first_name = $4,
                last_name = $5,
                phone_number = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(account.id.value())
        .bind(account.email.as_str())
        .bind(account.password_hash.as_phc_string())
        .bind(account.profile.first_name.as_deref())
        .bind(account.profile.last_name.as_deref())
        .bind(account.profile.phone_number.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(AuthError::AccountNotFound)?;

        row.into_account()
    }
}

// ============================================================================
// Session Store Implementation
// ============================================================================

/// PostgreSQL-backed session store
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SessionStore for PgSessionStore {
    async fn create(&self, session: &AuthSession) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO auth_sessions (
                session_id,
                account_id,
                username,
                created_at,
                expires_at
            ) VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(session.session_id)
        .bind(session.account_id.value())
        .bind(session.username.as_str())
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, session_id: Uuid) -> AuthResult<Option<AuthSession>> {
        let row = sqlx::query_as::<_, AuthSessionRow>(
            r#"
            SELECT session_id, account_id, username, created_at, expires_at
            FROM auth_sessions
            WHERE session_id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AuthSessionRow::into_session))
    }

    async fn delete(&self, session_id: Uuid) -> AuthResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    first_name: Option<String>,
    last_name: Option<String>,
    phone_number: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> AuthResult<Account> {
        Ok(Account {
            id: AccountId::new(self.id),
            username: Username::from_db(self.username),
            email: Email::from_db(self.email),
            password_hash: UserPassword::from_phc_string(self.password_hash)?,
            profile: Profile {
                first_name: self.first_name,
                last_name: self.last_name,
                phone_number: self.phone_number,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AuthSessionRow {
    session_id: Uuid,
    account_id: i64,
    username: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl AuthSessionRow {
    fn into_session(self) -> AuthSession {
        AuthSession {
            session_id: self.session_id,
            account_id: AccountId::new(self.account_id),
            username: Username::from_db(self.username),
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }
}
