//! Session Binder
//!
//! Maps signed session handles to account identities through an injected
//! [`SessionStore`]. Handle states are `absent` and `active`:
//! - `bind` always creates a new session and handle
//! - `resolve` never mutates, except to drop an expired record
//! - `invalidate` is idempotent and accepts garbage

use std::sync::Arc;

use chrono::TimeDelta;

use crate::application::config::AuthConfig;
use crate::domain::entity::{AuthSession, SessionIdentity};
use crate::domain::repository::SessionStore;
use crate::domain::value_object::{AccountId, SessionHandle, Username};
use crate::error::{AuthError, AuthResult};

pub struct SessionBinder<S>
where
    S: SessionStore,
{
    sessions: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> SessionBinder<S>
where
    S: SessionStore,
{
    pub fn new(sessions: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self { sessions, config }
    }

    /// Start a session for an authenticated account
    pub async fn bind(&self, account_id: AccountId, username: Username) -> AuthResult<SessionHandle> {
        let ttl = TimeDelta::from_std(self.config.session_ttl)
            .map_err(|e| AuthError::Internal(format!("Session TTL out of range: {e}")))?;

        let session = AuthSession::new(
            SessionIdentity {
                account_id,
                username,
            },
            ttl,
        )?;
        self.sessions.create(&session).await?;

        tracing::info!(
            account_id = %session.account_id,
            session_id = %session.session_id,
            "Session bound"
        );

        Ok(SessionHandle::issue(
            session.session_id,
            &self.config.session_secret,
        ))
    }

    /// Identity behind `handle`, if the session is live
    pub async fn resolve(&self, handle: &SessionHandle) -> AuthResult<Option<SessionIdentity>> {
        let Some(session_id) = handle.verify(&self.config.session_secret) else {
            return Ok(None);
        };

        let Some(session) = self.sessions.find_by_id(session_id).await? else {
            return Ok(None);
        };

        if session.is_expired() {
            self.sessions.delete(session_id).await?;
            tracing::debug!(session_id = %session_id, "Expired session dropped");
            return Ok(None);
        }

        Ok(Some(session.identity()))
    }

    /// End the session behind `handle`
    pub async fn invalidate(&self, handle: &SessionHandle) -> AuthResult<()> {
        let Some(session_id) = handle.verify(&self.config.session_secret) else {
            return Ok(());
        };

        self.sessions.delete(session_id).await?;
        tracing::info!(session_id = %session_id, "Session invalidated");

        Ok(())
    }

    /// Remove every expired session record
    pub async fn purge_expired(&self) -> AuthResult<u64> {
        let removed = self.sessions.cleanup_expired().await?;
        if removed > 0 {
            tracing::info!(removed, "Expired sessions purged");
        }
        Ok(removed)
    }
}
