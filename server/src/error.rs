//! Mapping of repository errors onto HTTP responses.
//!
//! # Design
//! Every `TodoError` kind maps to exactly one status code. Client errors
//! carry the repository's message; server-side failures are logged here and
//! answered with a generic message so store details never leak to clients.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use todo_core::TodoError;

/// JSON error body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiErrorResponse {
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }

    pub fn bad_request(code: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<TodoError> for ApiErrorResponse {
    fn from(error: TodoError) -> Self {
        match error {
            TodoError::InvalidInput(message) => Self::bad_request("INVALID_INPUT", message),
            TodoError::NotFound(id) => Self::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("To-Do List {id} not found"),
            ),
            TodoError::CorruptData { key, reason } => {
                tracing::error!(%key, %reason, "stored to-do list is corrupt");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CORRUPT_DATA",
                    "Stored To-Do List could not be decoded",
                )
            }
            TodoError::StoreUnavailable(source) => {
                tracing::error!(error = %source, "store unavailable");
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_UNAVAILABLE",
                    "Storage is temporarily unavailable",
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use todo_core::{ListId, StoreError};

    #[rstest]
    #[case(TodoError::InvalidInput("empty".into()), StatusCode::BAD_REQUEST, "INVALID_INPUT")]
    #[case(TodoError::NotFound(ListId::new(4)), StatusCode::NOT_FOUND, "NOT_FOUND")]
    #[case(
        TodoError::CorruptData { key: "todo:list:4".into(), reason: "eof".into() },
        StatusCode::INTERNAL_SERVER_ERROR,
        "CORRUPT_DATA"
    )]
    #[case(
        TodoError::StoreUnavailable(StoreError::Connection("refused".into())),
        StatusCode::SERVICE_UNAVAILABLE,
        "STORE_UNAVAILABLE"
    )]
    fn maps_each_error_kind(
        #[case] error: TodoError,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        let response = ApiErrorResponse::from(error);
        assert_eq!(response.status, status);
        assert_eq!(response.body.code, code);
    }

    #[test]
    fn server_errors_hide_details() {
        let response = ApiErrorResponse::from(TodoError::StoreUnavailable(StoreError::Connection(
            "redis://secret-host:6379 refused".into(),
        )));
        assert!(!response.body.message.contains("secret-host"));
    }

    #[test]
    fn invalid_input_keeps_message() {
        let response = ApiErrorResponse::from(TodoError::InvalidInput(
            "Tasks must be provided as a list".into(),
        ));
        assert_eq!(response.body.message, "Tasks must be provided as a list");
    }
}
