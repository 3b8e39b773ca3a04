use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    error::AppError,
    extract::{FormOrJson, PathParams},
    state::AppState,
    todos::{
        dto::{CreateTodoRequest, StatusResponse},
        repo_types::Todo,
    },
};

pub fn todo_routes() -> Router<AppState> {
    Router::new()
        .route("/todos/:username", get(list_todos).post(create_todo))
        .route("/todos/:username/:id", put(toggle_todo).delete(delete_todo))
}

#[instrument(skip(state))]
pub async fn list_todos(
    State(state): State<AppState>,
    PathParams(username): PathParams<String>,
) -> Result<Json<Vec<Todo>>, AppError> {
    Ok(Json(state.todos.list_for(&username).await?))
}

#[instrument(skip(state, body))]
pub async fn create_todo(
    State(state): State<AppState>,
    PathParams(username): PathParams<String>,
    FormOrJson(body): FormOrJson<CreateTodoRequest>,
) -> Result<Json<Todo>, AppError> {
    let task = body.task.trim();
    if task.is_empty() {
        return Err(AppError::Validation("task is required".into()));
    }
    let todo = state.todos.create(&username, task).await?;
    info!(username = %username, id = todo.id, "todo created");
    Ok(Json(todo))
}

#[instrument(skip(state))]
pub async fn toggle_todo(
    State(state): State<AppState>,
    PathParams((username, id)): PathParams<(String, i64)>,
) -> Result<Json<StatusResponse>, AppError> {
    match state.todos.toggle(id, &username).await? {
        Some(todo) => {
            info!(username = %username, id, done = todo.done, "todo toggled");
            Ok(Json(StatusResponse { status: "updated" }))
        }
        None => {
            warn!(username = %username, id, "toggle: todo not found");
            Err(AppError::NotFound("not found".into()))
        }
    }
}

#[instrument(skip(state))]
pub async fn delete_todo(
    State(state): State<AppState>,
    PathParams((username, id)): PathParams<(String, i64)>,
) -> Result<Json<StatusResponse>, AppError> {
    if state.todos.delete(id, &username).await? {
        info!(username = %username, id, "todo deleted");
        Ok(Json(StatusResponse { status: "deleted" }))
    } else {
        warn!(username = %username, id, "delete: todo not found");
        Err(AppError::NotFound("not found".into()))
    }
}
