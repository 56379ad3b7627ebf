//! Account Entity
//!
//! The identity record owned by the credential store.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{AccountId, Email, UserPassword, Username};

/// Optional profile fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
}

impl Profile {
    /// Blank strings are treated as absent
    pub fn new(
        first_name: Option<String>,
        last_name: Option<String>,
        phone_number: Option<String>,
    ) -> Self {
        Self {
            first_name: non_blank(first_name),
            last_name: non_blank(last_name),
            phone_number: non_blank(phone_number),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Account awaiting its identity
///
/// Passed to `AccountRepository::create`, which assigns the id and
/// timestamps.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: Username,
    pub email: Email,
    pub password_hash: UserPassword,
    pub profile: Profile,
}

/// Persisted account
#[derive(Debug, Clone)]
pub struct Account {
    /// Numeric identity, assigned once by the store
    pub id: AccountId,
    /// Unique, immutable after creation
    pub username: Username,
    /// Unique
    pub email: Email,
    pub password_hash: UserPassword,
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Materialize a new account with the identity chosen by the store
    pub fn from_new(id: AccountId, new: NewAccount, now: DateTime<Utc>) -> Self {
        Self {
            id,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            profile: new.profile,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::RawPassword;
    use platform::password::{HashParams, PasswordPolicy};

    fn new_account() -> NewAccount {
        let raw = RawPassword::new("secret1".to_string(), &PasswordPolicy::default()).unwrap();
        NewAccount {
            username: Username::new("alice").unwrap(),
            email: Email::new("a@x.com").unwrap(),
            password_hash: UserPassword::from_raw(&raw, None, &HashParams::insecure_fast())
                .unwrap(),
            profile: Profile::default(),
        }
    }

    #[test]
    fn test_from_new() {
        let now = Utc::now();
        let account = Account::from_new(AccountId::new(1), new_account(), now);

        assert_eq!(account.id.value(), 1);
        assert_eq!(account.username.as_str(), "alice");
        assert_eq!(account.created_at, now);
        assert_eq!(account.updated_at, now);
    }

    #[test]
    fn test_profile_blank_fields_are_absent() {
        let profile = Profile::new(Some("  ".into()), Some(" Liddell ".into()), Some(String::new()));
        assert_eq!(profile.first_name, None);
        assert_eq!(profile.last_name.as_deref(), Some("Liddell"));
        assert_eq!(profile.phone_number, None);
    }
}
