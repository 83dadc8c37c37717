mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("unique constraint violated")]
    UniqueViolation,

    #[error("malformed {kind} record: {reason}")]
    Malformed { kind: &'static str, reason: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// `None` only for damaged records, sign-up always stores a hash.
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Raw account storage. Hashing and credential checks live in
/// [`crate::credentials::CredentialStore`].
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Fails with [`StoreError::UniqueViolation`] when the username is taken.
    async fn insert(&self, username: &str, password_hash: &str) -> StoreResult<User>;

    /// Overwrites username and hash. Returns `false` when no account has `id`.
    /// Fails with [`StoreError::UniqueViolation`] when another account holds `username`.
    async fn update(&self, id: Uuid, username: &str, password_hash: &str) -> StoreResult<bool>;
}

/// Task storage. None of these operations filter by owner.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Tasks of one owner, oldest first.
    async fn list_for_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Task>>;

    async fn create(&self, owner_id: Uuid, title: &str) -> StoreResult<Task>;

    async fn get(&self, id: Uuid) -> StoreResult<Option<Task>>;

    /// Idempotent, a no-op for unknown ids.
    async fn mark_completed(&self, id: Uuid) -> StoreResult<()>;

    /// A no-op for unknown ids.
    async fn delete(&self, id: Uuid) -> StoreResult<()>;
}

pub type UserStoreRef = Arc<dyn UserStore>;
pub type TaskStoreRef = Arc<dyn TaskStore>;
