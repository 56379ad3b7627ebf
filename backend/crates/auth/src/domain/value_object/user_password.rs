//! User Password Value Object
//!
//! Domain wrappers over `platform::password`:
//! - [`RawPassword`] is user input, validated, zeroized on drop
//! - [`UserPassword`] is the Argon2id PHC string kept by the store
//!
//! Hashing and verification are CPU-bound; the use cases run them on the
//! blocking pool.

use kernel::error::app_error::{AppError, AppResult};
use platform::password::{
    ClearTextPassword, HashParams, HashedPassword, PasswordHashError, PasswordPolicy,
    PasswordPolicyError,
};
use std::fmt;

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Validate against `policy`
    pub fn new(raw: String, policy: &PasswordPolicy) -> AppResult<Self> {
        let clear_text = ClearTextPassword::new(raw, policy).map_err(|e| match e {
            PasswordPolicyError::EmptyOrWhitespace => {
                AppError::bad_request("Password cannot be empty")
            }
            other => AppError::bad_request(other.to_string()),
        })?;

        Ok(Self(clear_text))
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Hashed user password for database storage
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    /// Hash a raw password with a fresh salt
    pub fn from_raw(
        raw: &RawPassword,
        pepper: Option<&[u8]>,
        params: &HashParams,
    ) -> AppResult<Self> {
        raw.inner()
            .hash(pepper, params)
            .map(Self)
            .map_err(hash_error)
    }

    /// Parse a stored PHC string
    pub fn from_phc_string(phc_string: impl Into<String>) -> AppResult<Self> {
        HashedPassword::from_phc_string(phc_string)
            .map(Self)
            .map_err(|_| AppError::internal("Invalid password hash in database"))
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    /// Constant-time verification of `raw` against this hash
    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(raw.inner(), pepper)
    }
}

fn hash_error(e: PasswordHashError) -> AppError {
    AppError::internal(e.to_string()).with_source(e)
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(s: &str) -> RawPassword {
        RawPassword::new(s.to_string(), &PasswordPolicy::default()).unwrap()
    }

    #[test]
    fn test_raw_password_validation() {
        let policy = PasswordPolicy::default();
        assert!(RawPassword::new("secret1".to_string(), &policy).is_ok());

        let err = RawPassword::new(String::new(), &policy).unwrap_err();
        assert_eq!(err.message(), "Password cannot be empty");
        assert!(err.is_client_error());

        let strict = PasswordPolicy::strict();
        assert!(RawPassword::new("secret1".to_string(), &strict).is_err());
    }

    #[test]
    fn test_hash_and_verify() {
        let params = HashParams::insecure_fast();
        let hashed = UserPassword::from_raw(&raw("secret1"), None, &params).unwrap();

        assert!(hashed.verify(&raw("secret1"), None));
        assert!(!hashed.verify(&raw("wrong"), None));
    }

    #[test]
    fn test_hash_never_contains_plaintext() {
        let hashed =
            UserPassword::from_raw(&raw("secret1"), None, &HashParams::insecure_fast()).unwrap();
        assert!(!hashed.as_phc_string().contains("secret1"));
        assert!(!hashed.as_phc_string().is_empty());
    }

    #[test]
    fn test_phc_string_reload() {
        let hashed =
            UserPassword::from_raw(&raw("secret1"), None, &HashParams::insecure_fast()).unwrap();
        let restored = UserPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert!(restored.verify(&raw("secret1"), None));

        assert!(UserPassword::from_phc_string("plaintext").is_err());
    }

    #[test]
    fn test_debug_redaction() {
        let debug = format!("{:?}", raw("secret1"));
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("secret1"));
    }
}
