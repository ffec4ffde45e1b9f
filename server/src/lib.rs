use std::collections::BTreeMap;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use todo_core::{CreateTodoList, ListId, TodoList, TodoRepository};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;

pub use config::{ConfigError, ServerConfig, StoreMode};
pub use error::{ApiErrorResponse, ErrorBody};

pub const SAVED_MESSAGE: &str = "To-Do List saved successfully";
pub const DELETED_MESSAGE: &str = "To-Do List deleted";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Created {
    pub id: ListId,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub message: String,
}

type ApiResult<T> = Result<T, ApiErrorResponse>;

pub fn app(repository: TodoRepository) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health))
        .route("/todo", post(create_list))
        .route("/todo/{id}", get(get_list).delete(delete_list))
        .route("/todos", get(list_all))
        .layer(TraceLayer::new_for_http())
        .with_state(repository)
}

pub async fn run(listener: TcpListener, repository: TodoRepository) -> Result<(), std::io::Error> {
    axum::serve(listener, app(repository)).await
}

async fn welcome() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the To-Do List API",
        "endpoints": {
            "POST /todo": "create a list from {\"tasks\": [\"...\"]}",
            "GET /todo/{id}": "fetch one list",
            "DELETE /todo/{id}": "delete one list",
            "GET /todos": "fetch every list, keyed by id",
            "GET /health": "check that storage is reachable"
        }
    }))
}

async fn health(State(repo): State<TodoRepository>) -> ApiResult<Json<Value>> {
    repo.ping().await?;
    Ok(Json(json!({ "status": "ok" })))
}

async fn create_list(
    State(repo): State<TodoRepository>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Created>)> {
    let Json(body) = payload.map_err(|rejection| {
        ApiErrorResponse::bad_request("INVALID_INPUT", rejection.body_text())
    })?;
    let input = CreateTodoList::from_json(&body)?;
    let id = repo.create_list(input.tasks).await?;
    Ok((
        StatusCode::CREATED,
        Json(Created {
            id,
            message: SAVED_MESSAGE.to_string(),
        }),
    ))
}

async fn get_list(
    State(repo): State<TodoRepository>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<TodoList>> {
    let id = list_id(id)?;
    let tasks = repo.get_list(id).await?;
    Ok(Json(TodoList { id, tasks }))
}

async fn delete_list(
    State(repo): State<TodoRepository>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Message>> {
    repo.delete_list(list_id(id)?).await?;
    Ok(Json(Message {
        message: DELETED_MESSAGE.to_string(),
    }))
}

async fn list_all(State(repo): State<TodoRepository>) -> ApiResult<Json<BTreeMap<ListId, Vec<String>>>> {
    Ok(Json(repo.list_all().await?))
}

fn list_id(path: Result<Path<String>, PathRejection>) -> ApiResult<ListId> {
    path.ok()
        .and_then(|Path(raw)| raw.parse().ok())
        .ok_or_else(|| ApiErrorResponse::bad_request("INVALID_ID", "list id must be a positive integer"))
}
