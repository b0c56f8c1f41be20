//! Credential store: user accounts and their verification/reset tokens.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use storefront_auth::{NewUser, Role, User};
use storefront_core::UserId;

use crate::error::StoreError;

/// Profile fields a user may change about themselves.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Narrow persistence interface for user accounts.
///
/// Every method is a single-row atomic read or update; the authorization
/// chain depends on exactly one freshly-read row per request.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create an account. Role defaults to `Customer`; a fresh
    /// email-verification token is generated. Duplicate email or username
    /// fails with `Conflict`.
    async fn create(&self, input: NewUser) -> Result<User, StoreError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_verification_token(&self, token: &str) -> Result<Option<User>, StoreError>;

    /// Resolve a password-reset token, honoring its expiry.
    async fn find_by_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError>;

    async fn list(&self) -> Result<Vec<User>, StoreError>;

    async fn update_profile(&self, id: UserId, update: ProfileUpdate) -> Result<User, StoreError>;

    /// Flip the account to verified and clear the verification token.
    async fn mark_verified(&self, id: UserId) -> Result<(), StoreError>;

    async fn set_reset_token(
        &self,
        id: UserId,
        token: &str,
        expires: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Replace the password hash and clear any pending reset token.
    async fn update_password(&self, id: UserId, password_hash: &str) -> Result<(), StoreError>;

    async fn set_role(&self, id: UserId, role: Role) -> Result<(), StoreError>;

    async fn set_active(&self, id: UserId, active: bool) -> Result<(), StoreError>;
}

/// In-memory credential store. Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<UserId, User>>, StoreError> {
        self.users.read().map_err(|_| StoreError::backend("lock poisoned"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<UserId, User>>, StoreError> {
        self.users.write().map_err(|_| StoreError::backend("lock poisoned"))
    }
}

fn fresh_token() -> String {
    Uuid::new_v4().simple().to_string()
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, input: NewUser) -> Result<User, StoreError> {
        let email = input.email.trim().to_lowercase();
        let username = input.username.trim().to_string();

        let mut users = self.write()?;

        if users.values().any(|u| u.email == email) {
            return Err(StoreError::conflict("User with this email already exists"));
        }
        if users.values().any(|u| u.username == username) {
            return Err(StoreError::conflict(
                "User with this username already exists",
            ));
        }

        let user = User {
            id: UserId::new(),
            username,
            email,
            password_hash: input.password_hash,
            first_name: input.first_name,
            last_name: input.last_name,
            role: input.role.unwrap_or_default(),
            is_active: true,
            is_verified: false,
            email_verification_token: Some(fresh_token()),
            password_reset_token: None,
            password_reset_expires: None,
            created_at: Utc::now(),
        };

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email = email.trim().to_lowercase();
        Ok(self.read()?.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .read()?
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_verification_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .read()?
            .values()
            .find(|u| u.email_verification_token.as_deref() == Some(token))
            .cloned())
    }

    async fn find_by_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        Ok(self
            .read()?
            .values()
            .find(|u| {
                u.password_reset_token.as_deref() == Some(token)
                    && u.password_reset_expires.is_some_and(|exp| exp > now)
            })
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self.read()?.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn update_profile(&self, id: UserId, update: ProfileUpdate) -> Result<User, StoreError> {
        let mut users = self.write()?;
        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(first_name) = update.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            user.last_name = last_name;
        }
        Ok(user.clone())
    }

    async fn mark_verified(&self, id: UserId) -> Result<(), StoreError> {
        let mut users = self.write()?;
        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.is_verified = true;
        user.email_verification_token = None;
        Ok(())
    }

    async fn set_reset_token(
        &self,
        id: UserId,
        token: &str,
        expires: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut users = self.write()?;
        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.password_reset_token = Some(token.to_string());
        user.password_reset_expires = Some(expires);
        Ok(())
    }

    async fn update_password(&self, id: UserId, password_hash: &str) -> Result<(), StoreError> {
        let mut users = self.write()?;
        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.password_hash = password_hash.to_string();
        user.password_reset_token = None;
        user.password_reset_expires = None;
        Ok(())
    }

    async fn set_role(&self, id: UserId, role: Role) -> Result<(), StoreError> {
        let mut users = self.write()?;
        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.role = role;
        Ok(())
    }

    async fn set_active(&self, id: UserId, active: bool) -> Result<(), StoreError> {
        let mut users = self.write()?;
        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.is_active = active;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.into(),
            email: email.into(),
            password_hash: "hash".into(),
            first_name: String::new(),
            last_name: String::new(),
            role: None,
        }
    }

    #[tokio::test]
    async fn create_defaults_to_customer_and_unverified() {
        let store = InMemoryUserStore::new();
        let user = store.create(new_user("alice", "Alice@Example.com")).await.unwrap();

        assert_eq!(user.role, Role::Customer);
        assert!(!user.is_verified);
        assert!(user.email_verification_token.is_some());
        // Email is normalized.
        assert_eq!(user.email, "alice@example.com");
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = InMemoryUserStore::new();
        store.create(new_user("alice", "a@example.com")).await.unwrap();
        let err = store
            .create(new_user("bob", "a@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn verification_token_resolves_then_clears() {
        let store = InMemoryUserStore::new();
        let user = store.create(new_user("alice", "a@example.com")).await.unwrap();
        let token = user.email_verification_token.clone().unwrap();

        let found = store.find_by_verification_token(&token).await.unwrap().unwrap();
        assert_eq!(found.id, user.id);

        store.mark_verified(user.id).await.unwrap();
        assert!(store.find_by_verification_token(&token).await.unwrap().is_none());
        assert!(store.find_by_id(user.id).await.unwrap().unwrap().is_verified);
    }

    #[tokio::test]
    async fn expired_reset_token_does_not_resolve() {
        let store = InMemoryUserStore::new();
        let user = store.create(new_user("alice", "a@example.com")).await.unwrap();
        let now = Utc::now();

        store
            .set_reset_token(user.id, "tok", now - Duration::minutes(1))
            .await
            .unwrap();
        assert!(store.find_by_reset_token("tok", now).await.unwrap().is_none());

        store
            .set_reset_token(user.id, "tok", now + Duration::hours(1))
            .await
            .unwrap();
        assert!(store.find_by_reset_token("tok", now).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn update_password_clears_reset_token() {
        let store = InMemoryUserStore::new();
        let user = store.create(new_user("alice", "a@example.com")).await.unwrap();
        let now = Utc::now();

        store
            .set_reset_token(user.id, "tok", now + Duration::hours(1))
            .await
            .unwrap();
        store.update_password(user.id, "new-hash").await.unwrap();

        assert!(store.find_by_reset_token("tok", now).await.unwrap().is_none());
        let user = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(user.password_hash, "new-hash");
    }
}
