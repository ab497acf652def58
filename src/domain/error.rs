use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use super::ordering::OrderingError;

#[derive(Debug, thiserror::Error)]
pub enum KanbanError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("newOrder must be between 1 and {max}, got {requested}")]
    OutOfRange { requested: i64, max: i64 },

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("transaction conflict: {0}")]
    Conflict(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl KanbanError {
    /// Whether the failure came from a concurrent writer and the whole unit
    /// of work may be re-run against fresh state.
    pub fn is_conflict(&self) -> bool {
        match self {
            KanbanError::Conflict(_) => true,
            KanbanError::Database(sqlx::Error::Database(db_err)) => {
                // SQLITE_BUSY (5), SQLITE_LOCKED (6) and their extended codes
                // such as SQLITE_BUSY_SNAPSHOT (517).
                let primary = db_err
                    .code()
                    .and_then(|code| code.parse::<i32>().ok())
                    .map(|code| code & 0xff);
                matches!(primary, Some(5) | Some(6))
                    || db_err.message().contains("database is locked")
            }
            _ => false,
        }
    }
}

impl From<OrderingError> for KanbanError {
    fn from(err: OrderingError) -> Self {
        match err {
            OrderingError::OutOfRange { requested, max } => {
                KanbanError::OutOfRange { requested, max }
            }
        }
    }
}

impl IntoResponse for KanbanError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            KanbanError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            KanbanError::OutOfRange { .. } => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            KanbanError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            KanbanError::Conflict(msg) => {
                tracing::warn!("Transaction conflict surfaced to caller: {}", msg);
                (StatusCode::CONFLICT, msg.clone())
            }
            KanbanError::Unavailable(msg) => {
                tracing::error!("Storage unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg.clone())
            }
            KanbanError::Database(err) => {
                tracing::error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
        };

        let body = json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
