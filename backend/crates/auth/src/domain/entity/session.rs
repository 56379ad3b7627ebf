//! Auth Session Entity
//!
//! Server-side record behind a session handle.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::value_object::{AccountId, Username};
use crate::error::{AuthError, AuthResult};

/// Identity a live session resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub account_id: AccountId,
    /// Denormalized for display
    pub username: Username,
}

/// Auth session entity
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Session ID (UUID v4)
    pub session_id: Uuid,
    pub account_id: AccountId,
    pub username: Username,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    /// Create a new auth session
    ///
    /// TTL comes from `AuthConfig`. Fails if the expiry is not representable.
    pub fn new(identity: SessionIdentity, ttl: Duration) -> AuthResult<Self> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::Internal(format!("Session expiry overflows: ttl={ttl}")))?;

        Ok(Self {
            session_id: Uuid::new_v4(),
            account_id: identity.account_id,
            username: identity.username,
            created_at: now,
            expires_at,
        })
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn identity(&self) -> SessionIdentity {
        SessionIdentity {
            account_id: self.account_id,
            username: self.username.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> SessionIdentity {
        SessionIdentity {
            account_id: AccountId::new(7),
            username: Username::new("alice").unwrap(),
        }
    }

    #[test]
    fn test_new_session() {
        let session = AuthSession::new(identity(), Duration::hours(12)).unwrap();

        assert_eq!(session.identity(), identity());
        assert!(!session.is_expired());
        assert_eq!(session.expires_at - session.created_at, Duration::hours(12));
    }

    #[test]
    fn test_expiry() {
        let session = AuthSession::new(identity(), Duration::seconds(30)).unwrap();

        assert!(!session.is_expired_at(session.created_at));
        assert!(session.is_expired_at(session.expires_at));
        assert!(session.is_expired_at(session.created_at + Duration::minutes(1)));
    }

    #[test]
    fn test_sessions_get_distinct_ids() {
        let a = AuthSession::new(identity(), Duration::hours(1)).unwrap();
        let b = AuthSession::new(identity(), Duration::hours(1)).unwrap();
        assert_ne!(a.session_id, b.session_id);
    }

    #[test]
    fn test_unrepresentable_expiry_is_an_error() {
        let err = AuthSession::new(identity(), Duration::days(365 * 1_000_000)).unwrap_err();
        assert!(matches!(err, AuthError::Internal(_)));
    }
}
