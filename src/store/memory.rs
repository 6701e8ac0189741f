use std::cmp::Reverse;
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, TaskFilter, TaskStore, UserStore};
use crate::models::{Task, TaskPatch, User};

/// In-process store for development and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    tasks: RwLock<HashMap<Uuid, Task>>,
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: &User) -> Result<Uuid, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        users.insert(user.id, user.clone());
        Ok(user.id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert(&self, task: &Task) -> Result<Uuid, StoreError> {
        self.tasks.write().await.insert(task.id, task.clone());
        Ok(task.id)
    }

    async fn find_one(&self, filter: TaskFilter) -> Result<Option<Task>, StoreError> {
        let tasks = self.tasks.read().await;
        Ok(tasks
            .get(&filter.id)
            .filter(|t| t.user_id == filter.user_id)
            .cloned())
    }

    async fn find_many(&self, user_id: Uuid) -> Result<Vec<Task>, StoreError> {
        let tasks = self.tasks.read().await;
        let mut owned: Vec<Task> = tasks
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by_key(|t| Reverse(t.created_at));
        Ok(owned)
    }

    async fn update_one(&self, filter: TaskFilter, patch: &TaskPatch) -> Result<u64, StoreError> {
        let mut tasks = self.tasks.write().await;
        match tasks
            .get_mut(&filter.id)
            .filter(|t| t.user_id == filter.user_id)
        {
            Some(task) => {
                patch.apply(task);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_one(&self, filter: TaskFilter) -> Result<u64, StoreError> {
        let mut tasks = self.tasks.write().await;
        let owned = tasks
            .get(&filter.id)
            .is_some_and(|t| t.user_id == filter.user_id);
        if owned {
            tasks.remove(&filter.id);
            Ok(1)
        } else {
            Ok(0)
        }
    }
}
