use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreResult, Task, TaskStore, User, UserStore};

/// In-process backend. Vectors keep insertion order, which is the order
/// tasks are listed in.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    tasks: RwLock<Vec<Task>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) async fn put_user(&self, user: User) {
        self.users.write().await.push(user);
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn insert(&self, username: &str, password_hash: &str) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == username) {
            return Err(StoreError::UniqueViolation);
        }

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: Some(password_hash.to_string()),
            created_at: Utc::now(),
        };
        users.push(user.clone());

        Ok(user)
    }

    async fn update(&self, id: Uuid, username: &str, password_hash: &str) -> StoreResult<bool> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == username && u.id != id) {
            return Err(StoreError::UniqueViolation);
        }

        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.username = username.to_string();
                user.password_hash = Some(password_hash.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn list_for_owner(&self, owner_id: Uuid) -> StoreResult<Vec<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().filter(|t| t.owner_id == owner_id).cloned().collect())
    }

    async fn create(&self, owner_id: Uuid, title: &str) -> StoreResult<Task> {
        let task = Task {
            id: Uuid::new_v4(),
            owner_id,
            title: title.to_string(),
            completed: false,
            created_at: Utc::now(),
        };
        self.tasks.write().await.push(task.clone());

        Ok(task)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn mark_completed(&self, id: Uuid) -> StoreResult<()> {
        let mut tasks = self.tasks.write().await;
        if let Some(task) = tasks.iter_mut().find(|t| t.id == id) {
            task.completed = true;
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.tasks.write().await.retain(|t| t.id != id);
        Ok(())
    }
}
