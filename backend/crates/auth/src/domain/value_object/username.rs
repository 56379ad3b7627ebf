//! Username Value Object
//!
//! The login handle. Unique across accounts and fixed once the account
//! exists. Input is NFKC-normalized, so visually identical compatibility
//! forms (fullwidth letters and the like) collapse to one name. Comparison
//! is otherwise exact and case-sensitive.

use kernel::error::app_error::{AppError, AppResult};
use serde::Serialize;
use std::fmt;
use unicode_normalization::UnicodeNormalization;

/// Maximum length in characters
pub const USERNAME_MAX_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Validate user input
    ///
    /// Leading/trailing whitespace is dropped; the result must be non-empty,
    /// at most [`USERNAME_MAX_LENGTH`] characters and free of whitespace
    /// and control characters.
    pub fn new(raw: impl AsRef<str>) -> AppResult<Self> {
        let normalized: String = raw.as_ref().nfkc().collect();
        let name = normalized.trim();

        if name.is_empty() {
            return Err(AppError::bad_request("Username cannot be empty"));
        }

        if name.chars().count() > USERNAME_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Username must be at most {} characters",
                USERNAME_MAX_LENGTH
            )));
        }

        if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(AppError::bad_request(
                "Username cannot contain spaces or control characters",
            ));
        }

        Ok(Self(name.to_string()))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
