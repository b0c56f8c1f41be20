//! User account record (the credential-store row).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, UserId};

use crate::{Principal, Role};

/// A stored user account.
///
/// # Invariants
/// - `role` is always a member of the role enum (unknown roles are rejected
///   at the boundary, never coerced).
/// - `password_hash` is an opaque hash; plaintext never lands here.
/// - Token fields exist only while an email-verification or password-reset
///   flow is pending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub is_active: bool,
    pub is_verified: bool,
    pub email_verification_token: Option<String>,
    pub password_reset_token: Option<String>,
    pub password_reset_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The authorization view of this account.
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            role: self.role,
            is_active: self.is_active,
            is_verified: self.is_verified,
        }
    }
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    /// Defaults to the lowest rank (`Customer`) unless explicitly elevated.
    pub role: Option<Role>,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.username.trim().is_empty() {
            return Err(DomainError::validation("username cannot be empty"));
        }
        validate_email(&self.email)?;
        Ok(())
    }
}

/// Basic email shape check (full deliverability is the mailer's problem).
pub fn validate_email(email: &str) -> Result<(), DomainError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(DomainError::validation("invalid email format"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            username: "alice".into(),
            email: email.into(),
            password_hash: "hash".into(),
            first_name: String::new(),
            last_name: String::new(),
            role: None,
        }
    }

    #[test]
    fn valid_input_passes() {
        assert!(new_user("alice@example.com").validate().is_ok());
    }

    #[test]
    fn email_without_at_sign_is_rejected() {
        assert!(new_user("alice.example.com").validate().is_err());
    }

    #[test]
    fn empty_username_is_rejected() {
        let mut input = new_user("alice@example.com");
        input.username = "  ".into();
        assert!(input.validate().is_err());
    }
}
