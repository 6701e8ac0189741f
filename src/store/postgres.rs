use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{FromRow, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{StoreError, TaskFilter, TaskStore, UserStore};
use crate::config::Config;
use crate::models::task::UnknownVariant;
use crate::models::{Task, TaskPatch, User};

const UNIQUE_VIOLATION: &str = "23505";

const TASK_COLUMNS: &str =
    "id, user_id, title, description, status, priority, due_date, created_at";

/// Postgres-backed store for users and tasks.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

/// Task row as stored; enumerations are kept as their wire names in TEXT columns.
#[derive(Debug, FromRow)]
struct TaskRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: Option<String>,
    status: String,
    priority: String,
    due_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = StoreError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let corrupt = |e: UnknownVariant| StoreError::Backend(format!("task {}: {}", row.id, e));
        Ok(Task {
            status: row.status.parse().map_err(corrupt)?,
            priority: row.priority.parse().map_err(corrupt)?,
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            due_date: row.due_date,
            created_at: row.created_at,
        })
    }
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &Config) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(config.database_acquire_timeout)
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("migration failed: {}", e)))
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert(&self, user: &User) -> Result<Uuid, StoreError> {
        let result = sqlx::query(
            "INSERT INTO users (id, email, password_hash, name, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user.id),
            Err(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                Err(StoreError::DuplicateEmail)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, name, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, name, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert(&self, task: &Task) -> Result<Uuid, StoreError> {
        sqlx::query(
            "INSERT INTO tasks (id, user_id, title, description, status, priority, due_date, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(task.id)
        .bind(task.user_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.priority.as_str())
        .bind(task.due_date)
        .bind(task.created_at)
        .execute(&self.pool)
        .await?;
        Ok(task.id)
    }

    async fn find_one(&self, filter: TaskFilter) -> Result<Option<Task>, StoreError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, TaskRow>(&sql)
            .bind(filter.id)
            .bind(filter.user_id)
            .fetch_optional(&self.pool)
            .await?
            .map(Task::try_from)
            .transpose()
    }

    async fn find_many(&self, user_id: Uuid) -> Result<Vec<Task>, StoreError> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, TaskRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Task::try_from)
            .collect()
    }

    async fn update_one(&self, filter: TaskFilter, patch: &TaskPatch) -> Result<u64, StoreError> {
        if patch.is_empty() {
            let matched: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE id = $1 AND user_id = $2")
                    .bind(filter.id)
                    .bind(filter.user_id)
                    .fetch_one(&self.pool)
                    .await?;
            return Ok(matched as u64);
        }

        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE tasks SET ");
        let mut assignments = query.separated(", ");
        if let Some(title) = &patch.title {
            assignments.push("title = ").push_bind_unseparated(title.clone());
        }
        if let Some(description) = &patch.description {
            assignments
                .push("description = ")
                .push_bind_unseparated(description.clone());
        }
        if let Some(status) = patch.status {
            assignments
                .push("status = ")
                .push_bind_unseparated(status.as_str());
        }
        if let Some(priority) = patch.priority {
            assignments
                .push("priority = ")
                .push_bind_unseparated(priority.as_str());
        }
        if let Some(due_date) = patch.due_date {
            assignments.push("due_date = ").push_bind_unseparated(due_date);
        }
        query
            .push(" WHERE id = ")
            .push_bind(filter.id)
            .push(" AND user_id = ")
            .push_bind(filter.user_id);

        let result = query.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn delete_one(&self, filter: TaskFilter) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(filter.id)
            .bind(filter.user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
