//! JSON API handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use super::dto::{CreateTaskRequest, UpdateTaskRequest};
use super::{ApiErrorResponse, AppState};
use crate::tasks::{parse_task_id, Task, TaskService};

type ApiResult<T> = Result<T, ApiErrorResponse>;

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests.
    pub status: &'static str,
    /// Crate version.
    pub version: &'static str,
}

/// Liveness check.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok", version: crate::VERSION })
}

/// `GET /tasks`
pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Json<Vec<Task>>> {
    state.run(TaskService::find_all).await.map(Json)
}

/// `GET /tasks/active`
pub async fn list_active(State(state): State<AppState>) -> ApiResult<Json<Vec<Task>>> {
    state.run(TaskService::find_active).await.map(Json)
}

/// `GET /tasks/completed`
pub async fn list_completed(State(state): State<AppState>) -> ApiResult<Json<Vec<Task>>> {
    state.run(TaskService::find_completed).await.map(Json)
}

/// `GET /tasks/archived`
pub async fn list_archived(State(state): State<AppState>) -> ApiResult<Json<Vec<Task>>> {
    state.run(TaskService::find_archived).await.map(Json)
}

/// `GET /tasks/overdue`
pub async fn list_overdue(State(state): State<AppState>) -> ApiResult<Json<Vec<Task>>> {
    state.run(TaskService::find_overdue).await.map(Json)
}

/// `GET /tasks/{id}`
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let id = task_id(&id)?;
    state.run(move |service| service.find_by_id(id)).await.map(Json)
}

/// `POST /tasks`
pub async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(request) = payload?;
    let new = request.into_new_task()?;
    let task = state.run(move |service| service.create(new)).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// `PUT /tasks/{id}`
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let id = task_id(&id)?;
    let Json(request) = payload?;
    let update = request.into_update()?;
    state.run(move |service| service.update(id, &update)).await.map(Json)
}

/// `PATCH /tasks/{id}/complete`
pub async fn toggle_complete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let id = task_id(&id)?;
    state.run(move |service| service.toggle_complete(id)).await.map(Json)
}

/// `PATCH /tasks/{id}/archive`
pub async fn archive_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let id = task_id(&id)?;
    state.run(move |service| service.archive(id)).await.map(Json)
}

/// `PATCH /tasks/{id}/unarchive`
pub async fn unarchive_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let id = task_id(&id)?;
    state.run(move |service| service.unarchive(id)).await.map(Json)
}

/// `DELETE /tasks/{id}`
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = task_id(&id)?;
    state.run(move |service| service.delete(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) fn task_id(raw: &str) -> ApiResult<Uuid> {
    parse_task_id(raw).map_err(|e| ApiErrorResponse::invalid_id(e.to_string()))
}
