//! Persistence contracts for users and tasks, with a Postgres backend and an
//! in-process backend.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;
use crate::models::{Task, TaskPatch, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// `DATABASE_URL` value selecting [`MemoryStore`].
pub const MEMORY_URL: &str = "memory://";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        StoreError::Backend(error.to_string())
    }
}

/// Selects a task by id within one owner's records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskFilter {
    pub id: Uuid,
    pub user_id: Uuid,
}

/// Credential store. Emails are stored already normalized; uniqueness is
/// enforced here, not by callers.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with [`StoreError::DuplicateEmail`] if the email is taken.
    async fn insert(&self, user: &User) -> Result<Uuid, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
}

/// Task store. Every lookup is keyed by the owning user.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert(&self, task: &Task) -> Result<Uuid, StoreError>;
    async fn find_one(&self, filter: TaskFilter) -> Result<Option<Task>, StoreError>;
    /// All tasks of `user_id`, newest `created_at` first.
    async fn find_many(&self, user_id: Uuid) -> Result<Vec<Task>, StoreError>;
    /// Returns the number of matched tasks (0 or 1), even when nothing changed.
    async fn update_one(&self, filter: TaskFilter, patch: &TaskPatch) -> Result<u64, StoreError>;
    /// Returns the number of deleted tasks (0 or 1).
    async fn delete_one(&self, filter: TaskFilter) -> Result<u64, StoreError>;
}

/// Both stores, backed by the same backend.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
}

impl Stores {
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::default());
        Self {
            users: store.clone(),
            tasks: store,
        }
    }

    /// Opens the backend named by `config.database_url`, running migrations for
    /// Postgres.
    pub async fn connect(config: &Config) -> Result<Self, StoreError> {
        if config.database_url == MEMORY_URL {
            log::warn!("using in-memory store; data will not survive a restart");
            return Ok(Self::memory());
        }

        let store = Arc::new(PgStore::connect(config).await?);
        store.migrate().await?;
        Ok(Self {
            users: store.clone(),
            tasks: store,
        })
    }
}
