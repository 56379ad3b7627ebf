//! Session Handle Value Object
//!
//! The opaque token handed to clients: `<session uuid>.<base64url HMAC>`.
//! The signature lets the binder discard forged or mangled handles without
//! touching the session store.

use std::fmt;
use uuid::Uuid;

#[derive(Clone, PartialEq, Eq)]
pub struct SessionHandle(String);

impl SessionHandle {
    /// Sign `session_id` with `secret`
    pub fn issue(session_id: Uuid, secret: &[u8]) -> Self {
        let id = session_id.to_string();
        let signature = platform::crypto::sign(secret, id.as_bytes());
        Self(format!("{id}.{signature}"))
    }

    /// Wrap a handle presented by a client (unverified)
    pub fn from_client(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Session id, if the handle is well-formed and signed with `secret`
    pub fn verify(&self, secret: &[u8]) -> Option<Uuid> {
        let (id, signature) = self.0.split_once('.')?;

        if !platform::crypto::verify(secret, id.as_bytes(), signature) {
            return None;
        }

        id.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionHandle {
    // Handles are bearer credentials
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionHandle").field(&"[REDACTED]").finish()
    }
}
