//! Owner-scoped task operations.
//!
//! Every method takes the caller's id as resolved by the access guard and
//! passes it into each store lookup, so a task belonging to someone else is
//! indistinguishable from one that does not exist.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, TimeZone, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    CreateTaskRequest, Task, TaskDraft, TaskPatch, TaskPriority, TaskStatus, UpdateTaskRequest,
};
use crate::store::{TaskFilter, TaskStore};

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 1000;

const NOT_FOUND: &str = "Task not found";

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Validates `request` and stores a new task owned by `user_id`.
    ///
    /// Any owner named in the request body is ignored.
    pub async fn create(&self, user_id: Uuid, request: CreateTaskRequest) -> Result<Task, AppError> {
        let draft = TaskDraft {
            title: parse_title(request.title.as_deref())?,
            description: parse_description(request.description.as_deref())?,
            status: match request.status.as_deref() {
                Some(raw) => parse_status(raw)?,
                None => TaskStatus::default(),
            },
            priority: match request.priority.as_deref() {
                Some(raw) => parse_priority(raw)?,
                None => TaskPriority::default(),
            },
            due_date: parse_due_date(request.due_date.as_deref())?,
        };

        let task = Task::new(draft, user_id);
        let id = self.store.insert(&task).await?;
        log::info!("user {} created task {}", user_id, id);
        self.fetch(TaskFilter { id, user_id }).await
    }

    /// The caller's tasks, newest first.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Task>, AppError> {
        Ok(self.store.find_many(user_id).await?)
    }

    pub async fn get(&self, user_id: Uuid, task_id: &str) -> Result<Task, AppError> {
        let id = parse_task_id(task_id)?;
        self.fetch(TaskFilter { id, user_id }).await
    }

    /// Applies the fields present in `request` and returns the stored task,
    /// even when nothing changed.
    ///
    /// Ownership is checked before the body is validated, so a bad body sent
    /// to another user's task id still answers `NotFound`.
    pub async fn update(
        &self,
        user_id: Uuid,
        task_id: &str,
        request: UpdateTaskRequest,
    ) -> Result<Task, AppError> {
        let filter = TaskFilter {
            id: parse_task_id(task_id)?,
            user_id,
        };
        self.fetch(filter).await?;

        let patch = build_patch(request)?;
        if self.store.update_one(filter, &patch).await? == 0 {
            return Err(AppError::NotFound(NOT_FOUND.into()));
        }
        log::info!("user {} updated task {}", user_id, filter.id);
        self.fetch(filter).await
    }

    /// Permanently removes the task. Returns `true` on success.
    pub async fn delete(&self, user_id: Uuid, task_id: &str) -> Result<bool, AppError> {
        let filter = TaskFilter {
            id: parse_task_id(task_id)?,
            user_id,
        };
        self.fetch(filter).await?;

        if self.store.delete_one(filter).await? == 0 {
            return Err(AppError::NotFound(NOT_FOUND.into()));
        }
        log::info!("user {} deleted task {}", user_id, filter.id);
        Ok(true)
    }

    async fn fetch(&self, filter: TaskFilter) -> Result<Task, AppError> {
        self.store
            .find_one(filter)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))
    }
}

fn build_patch(request: UpdateTaskRequest) -> Result<TaskPatch, AppError> {
    let mut patch = TaskPatch::default();

    if let Some(title) = request.title {
        patch.title = Some(parse_title(title.as_deref())?);
    }
    if let Some(description) = request.description {
        patch.description = Some(parse_description(description.as_deref())?);
    }
    if let Some(status) = request.status {
        let raw = status.ok_or_else(invalid_status)?;
        patch.status = Some(parse_status(&raw)?);
    }
    if let Some(priority) = request.priority {
        let raw = priority.ok_or_else(invalid_priority)?;
        patch.priority = Some(parse_priority(&raw)?);
    }
    if let Some(due_date) = request.due_date {
        patch.due_date = Some(parse_due_date(due_date.as_deref())?);
    }

    Ok(patch)
}

fn parse_task_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::Validation("Invalid task ID".into()))
}

fn parse_title(raw: Option<&str>) -> Result<String, AppError> {
    let title = raw.map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::Validation(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(title.to_string())
}

// Blank descriptions are stored as absent.
fn parse_description(raw: Option<&str>) -> Result<Option<String>, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) if text.chars().count() > MAX_DESCRIPTION_LEN => Err(AppError::Validation(
            format!("Description must be at most {} characters", MAX_DESCRIPTION_LEN),
        )),
        Some(text) => Ok(Some(text.to_string())),
    }
}

fn parse_status(raw: &str) -> Result<TaskStatus, AppError> {
    raw.parse().map_err(|_| invalid_status())
}

fn parse_priority(raw: &str) -> Result<TaskPriority, AppError> {
    raw.parse().map_err(|_| invalid_priority())
}

fn invalid_status() -> AppError {
    let names: Vec<&str> = TaskStatus::ALL.iter().map(|s| s.as_str()).collect();
    AppError::Validation(format!("Invalid status. Must be one of: {}", names.join(", ")))
}

fn invalid_priority() -> AppError {
    let names: Vec<&str> = TaskPriority::ALL.iter().map(|p| p.as_str()).collect();
    AppError::Validation(format!("Invalid priority. Must be one of: {}", names.join(", ")))
}

// Date-times with an explicit offset that RFC 3339 parsing rejects: minutes
// without seconds, or a space instead of `T`.
const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

// Taken as UTC.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses a due date. `None` and blank strings mean "no due date".
///
/// Accepts RFC 3339, ISO 8601 date-times with `T` or a space between date and
/// time and optional seconds, and plain dates. Values without an offset are UTC.
fn parse_due_date(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, AppError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };

    let parsed = DateTime::parse_from_rfc3339(raw)
        .ok()
        .or_else(|| {
            OFFSET_FORMATS
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
        })
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|naive| Utc.from_utc_datetime(&naive))
        })
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| Utc.from_utc_datetime(&naive))
        });

    match parsed {
        Some(due) => Ok(Some(due.trunc_subsecs(6))),
        None => Err(AppError::Validation("Invalid due date format".into())),
    }
}
