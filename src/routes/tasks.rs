use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{CreateTaskRequest, UpdateTaskRequest},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;

/// Retrieves the authenticated user's tasks, newest first.
///
/// Query parameters are ignored; there is no filtering.
///
/// ## Responses:
/// - `200 OK`: `{message, tasks, count}`.
/// - `401 Unauthorized`: missing, invalid or expired token.
#[get("")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = state.tasks.list(user.id()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Tasks retrieved successfully",
        "count": tasks.len(),
        "tasks": tasks,
    })))
}

/// Creates a new task for the authenticated user.
///
/// The owner is always the caller; a `user_id` in the body is ignored.
///
/// ## Request Body:
/// - `title`: required, non-empty after trimming.
/// - `description` (optional).
/// - `priority` (optional): `Low`, `Medium` (default) or `High`.
/// - `status` (optional): `Pending` (default), `In Progress` or `Completed`.
/// - `due_date` (optional): RFC 3339 or `YYYY-MM-DD[THH:MM[:SS]]` in UTC.
///
/// ## Responses:
/// - `201 Created`: `{message, task}`.
/// - `400 Bad Request`: invalid or missing fields.
/// - `401 Unauthorized`: missing, invalid or expired token.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_data: web::Json<CreateTaskRequest>,
) -> Result<impl Responder, AppError> {
    let task = state.tasks.create(user.id(), task_data.into_inner()).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Task created successfully",
        "task": task,
    })))
}

/// Retrieves one of the authenticated user's tasks.
///
/// ## Responses:
/// - `200 OK`: `{message, task}`.
/// - `400 Bad Request`: `id` is not a UUID.
/// - `404 Not Found`: no such task, or it belongs to another user.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let task = state.tasks.get(user.id(), &task_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Task retrieved successfully",
        "task": task,
    })))
}

/// Partially updates a task. Omitted fields are left alone; `null` clears
/// `description` and `due_date`.
///
/// ## Responses:
/// - `200 OK`: `{message, task}` with the stored task.
/// - `400 Bad Request`: `id` is not a UUID or a present field is invalid.
/// - `404 Not Found`: no such task, or it belongs to another user.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<String>,
    task_data: web::Json<UpdateTaskRequest>,
) -> Result<impl Responder, AppError> {
    let task = state
        .tasks
        .update(user.id(), &task_id, task_data.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Task updated successfully",
        "task": task,
    })))
}

/// Deletes a task permanently.
///
/// ## Responses:
/// - `200 OK`: `{message, task_id}`.
/// - `400 Bad Request`: `id` is not a UUID.
/// - `404 Not Found`: no such task, or it belongs to another user.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();
    state.tasks.delete(user.id(), &task_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Task deleted successfully",
        "task_id": task_id,
    })))
}
