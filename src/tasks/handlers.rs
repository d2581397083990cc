use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    state::AppState,
    tasks::{
        dto::{StatusResponse, TaskCreatedResponse, TaskListResponse, TaskPayload, TaskResponse},
        repo::Task,
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", post(create_task).get(list_active))
        .route("/tasks/completed", get(list_completed))
        .route("/tasks/deleted", get(list_deleted))
        .route(
            "/tasks/:id",
            get(get_task).patch(update_task).delete(delete_task),
        )
        .route("/tasks/restore/:id", patch(restore_task))
        .route("/tasks/complete/:id", patch(complete_task))
        .route("/tasks/incomplete/:id", patch(incomplete_task))
}

fn validated(payload: &TaskPayload) -> Result<(&str, &str), ApiError> {
    let title = payload.title.trim();
    let description = payload.description.trim();
    if title.is_empty() || description.is_empty() {
        return Err(ApiError::validation("Title and description are required."));
    }
    Ok((title, description))
}

#[instrument(skip(state, payload))]
pub async fn create_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<TaskPayload>,
) -> Result<(StatusCode, Json<TaskCreatedResponse>), ApiError> {
    let (title, description) = validated(&payload)?;

    let task = Task::create(&state.db, user_id, title, description).await?;

    info!(user_id = %user_id, task_id = %task.id, "task created");
    Ok((
        StatusCode::CREATED,
        Json(TaskCreatedResponse {
            message: "Task created successfully.".into(),
            task,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_active(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<TaskListResponse>, ApiError> {
    let tasks = Task::list_active(&state.db, user_id).await?;
    Ok(Json(TaskListResponse { tasks }))
}

#[instrument(skip(state))]
pub async fn list_completed(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<TaskListResponse>, ApiError> {
    let tasks = Task::list_completed(&state.db, user_id).await?;
    Ok(Json(TaskListResponse { tasks }))
}

#[instrument(skip(state))]
pub async fn list_deleted(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<TaskListResponse>, ApiError> {
    let tasks = Task::list_deleted(&state.db, user_id).await?;
    Ok(Json(TaskListResponse { tasks }))
}

#[instrument(skip(state))]
pub async fn get_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = Task::find_by_id(&state.db, user_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Task not found."))?;
    Ok(Json(TaskResponse { task }))
}

#[instrument(skip(state, payload))]
pub async fn update_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TaskPayload>,
) -> Result<Json<StatusResponse>, ApiError> {
    let (title, description) = validated(&payload)?;

    let matched = Task::update_details(&state.db, user_id, id, title, description).await?;
    if matched == 0 {
        return Err(ApiError::not_found("Task not found."));
    }

    info!(user_id = %user_id, task_id = %id, "task updated");
    Ok(Json(StatusResponse {
        message: "Task updated successfully.".into(),
    }))
}

#[instrument(skip(state))]
pub async fn delete_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, ApiError> {
    let matched = Task::mark_deleted(&state.db, user_id, id).await?;
    if matched == 0 {
        return Err(ApiError::not_found("Task not found."));
    }

    info!(user_id = %user_id, task_id = %id, "task moved to trash");
    Ok(Json(StatusResponse {
        message: "Task moved to trash successfully.".into(),
    }))
}

#[instrument(skip(state))]
pub async fn restore_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, ApiError> {
    let matched = Task::restore(&state.db, user_id, id).await?;
    if matched == 0 {
        // Absent, foreign, or not currently in the trash.
        return Err(ApiError::not_found("Task not found."));
    }

    info!(user_id = %user_id, task_id = %id, "task restored");
    Ok(Json(StatusResponse {
        message: "Task restored successfully.".into(),
    }))
}

#[instrument(skip(state))]
pub async fn complete_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, ApiError> {
    let matched = Task::set_completed(&state.db, user_id, id, true).await?;
    if matched == 0 {
        return Err(ApiError::not_found("Task not found."));
    }

    info!(user_id = %user_id, task_id = %id, "task completed");
    Ok(Json(StatusResponse {
        message: "Task marked as complete.".into(),
    }))
}

#[instrument(skip(state))]
pub async fn incomplete_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, ApiError> {
    let matched = Task::set_completed(&state.db, user_id, id, false).await?;
    if matched == 0 {
        return Err(ApiError::not_found("Task not found."));
    }

    info!(user_id = %user_id, task_id = %id, "task marked incomplete");
    Ok(Json(StatusResponse {
        message: "Task marked as incomplete.".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validated_trims_and_rejects_blank_fields() {
        let ok = TaskPayload {
            title: "  Buy milk ".into(),
            description: "2% low fat".into(),
        };
        assert_eq!(validated(&ok).unwrap(), ("Buy milk", "2% low fat"));

        let blank_title = TaskPayload {
            title: "   ".into(),
            description: "something".into(),
        };
        assert!(validated(&blank_title).is_err());

        let blank_description = TaskPayload {
            title: "something".into(),
            description: "".into(),
        };
        assert!(validated(&blank_description).is_err());
    }
}
