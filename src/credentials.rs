use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::store::{StoreError, User, UserStoreRef};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user not found")]
    UserNotFound,

    #[error("user already exists")]
    DuplicateUser,

    #[error("incorrect password")]
    InvalidPassword,

    #[error("no password stored for this user")]
    MissingCredential,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The identity returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    pub user_id: Uuid,
    pub username: String,
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon = Argon2::default();

    argon
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// A stored hash that does not parse never verifies.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Account operations on top of a [`crate::store::UserStore`]. Plaintext
/// passwords stop here, only argon2 hashes reach the store.
#[derive(Clone)]
pub struct CredentialStore {
    users: UserStoreRef,
}

impl CredentialStore {
    pub fn new(users: UserStoreRef) -> Self {
        Self { users }
    }

    pub async fn create(&self, username: &str, password: &str) -> Result<User, AuthError> {
        if self.users.find_by_username(username).await?.is_some() {
            return Err(AuthError::DuplicateUser);
        }

        let password_hash = hash_password(password)?;

        let user = match self.users.insert(username, &password_hash).await {
            Ok(user) => user,
            // lost a race against a concurrent sign-up
            Err(StoreError::UniqueViolation) => return Err(AuthError::DuplicateUser),
            Err(e) => return Err(e.into()),
        };

        info!(user_id = %user.id, "account created");
        Ok(user)
    }

    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Authenticated, AuthError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let stored_hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::MissingCredential)?;

        if !verify_password(password, stored_hash) {
            return Err(AuthError::InvalidPassword);
        }

        Ok(Authenticated {
            user_id: user.id,
            username: user.username,
        })
    }

    /// Overwrites both fields. [`AuthError::UserNotFound`] when the account is
    /// gone, [`AuthError::DuplicateUser`] when another account holds the name.
    pub async fn update(
        &self,
        user_id: Uuid,
        new_username: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let password_hash = hash_password(new_password)?;

        match self.users.update(user_id, new_username, &password_hash).await {
            Ok(true) => {
                info!(%user_id, "account settings updated");
                Ok(())
            }
            Ok(false) => Err(AuthError::UserNotFound),
            Err(StoreError::UniqueViolation) => Err(AuthError::DuplicateUser),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find(&self, user_id: Uuid) -> Result<Option<User>, AuthError> {
        Ok(self.users.find_by_id(user_id).await?)
    }

    pub async fn username_taken_by_other(
        &self,
        user_id: Uuid,
        username: &str,
    ) -> Result<bool, AuthError> {
        let existing = self.users.find_by_username(username).await?;
        Ok(existing.is_some_and(|u| u.id != user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, UserStore};
    use chrono::Utc;
    use std::sync::Arc;

    fn credentials() -> (CredentialStore, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (CredentialStore::new(store.clone()), store)
    }

    #[test]
    fn test_hash_is_salted_and_verifies() {
        let h1 = hash_password("pw1").unwrap();
        let h2 = hash_password("pw1").unwrap();

        assert_ne!(h1, "pw1");
        assert_ne!(h1, h2);
        assert!(verify_password("pw1", &h1));
        assert!(!verify_password("pw2", &h1));
    }

    #[test]
    fn test_unparsable_hash_does_not_verify() {
        assert!(!verify_password("pw1", "pw1"));
        assert!(!verify_password("pw1", ""));
    }

    #[tokio::test]
    async fn test_create_then_authenticate() {
        let (creds, _) = credentials();

        let user = creds.create("alice", "pw1").await.unwrap();
        let auth = creds.authenticate("alice", "pw1").await.unwrap();

        assert_eq!(auth.user_id, user.id);
        assert_eq!(auth.username, "alice");
    }

    #[tokio::test]
    async fn test_duplicate_signup_keeps_original() {
        let (creds, store) = credentials();
        let original = creds.create("alice", "pw1").await.unwrap();

        let err = creds.create("alice", "pw2").await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUser));

        let stored = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(stored, original);
        assert!(creds.authenticate("alice", "pw1").await.is_ok());
    }

    #[tokio::test]
    async fn test_authenticate_failures() {
        let (creds, _) = credentials();
        creds.create("alice", "pw1").await.unwrap();

        let err = creds.authenticate("alice", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidPassword));

        let err = creds.authenticate("bob", "pw1").await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn test_record_without_hash() {
        let (creds, store) = credentials();
        store
            .put_user(User {
                id: Uuid::new_v4(),
                username: "ghost".to_string(),
                password_hash: None,
                created_at: Utc::now(),
            })
            .await;

        let err = creds.authenticate("ghost", "anything").await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCredential));
    }

    #[tokio::test]
    async fn test_update_changes_login() {
        let (creds, _) = credentials();
        let user = creds.create("alice", "pw1").await.unwrap();

        creds.update(user.id, "alicia", "pw2").await.unwrap();

        assert!(matches!(
            creds.authenticate("alice", "pw1").await.unwrap_err(),
            AuthError::UserNotFound
        ));
        assert!(matches!(
            creds.authenticate("alicia", "pw1").await.unwrap_err(),
            AuthError::InvalidPassword
        ));
        let auth = creds.authenticate("alicia", "pw2").await.unwrap();
        assert_eq!(auth.user_id, user.id);
    }

    #[tokio::test]
    async fn test_update_unknown_account() {
        let (creds, _) = credentials();

        let err = creds.update(Uuid::new_v4(), "ghost", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
        assert!(matches!(
            creds.authenticate("ghost", "pw").await.unwrap_err(),
            AuthError::UserNotFound
        ));
    }

    #[tokio::test]
    async fn test_update_to_taken_username() {
        let (creds, _) = credentials();
        creds.create("alice", "pw1").await.unwrap();
        let bob = creds.create("bob", "pw2").await.unwrap();

        let err = creds.update(bob.id, "alice", "pw3").await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUser));
        assert!(creds.authenticate("bob", "pw2").await.is_ok());
    }

    #[tokio::test]
    async fn test_username_taken_by_other() {
        let (creds, _) = credentials();
        let alice = creds.create("alice", "pw1").await.unwrap();
        let bob = creds.create("bob", "pw2").await.unwrap();

        assert!(creds.username_taken_by_other(bob.id, "alice").await.unwrap());
        assert!(!creds.username_taken_by_other(alice.id, "alice").await.unwrap());
        assert!(!creds.username_taken_by_other(bob.id, "carol").await.unwrap());
    }
}
