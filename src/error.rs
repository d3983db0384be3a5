use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Exactly one half of a friendship pair exists.
    #[error(
        "Incomplete friendship {} - {}",
        .forward_id.as_deref().unwrap_or("none"),
        .reverse_id.as_deref().unwrap_or("none")
    )]
    InconsistentState {
        forward_id: Option<String>,
        reverse_id: Option<String>,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::InvalidArgument(message.into())
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidArgument(_) => "Bad Request",
            AppError::Unauthorized => "Unauthorized",
            AppError::Forbidden => "Forbidden",
            AppError::NotFound => "Not Found",
            AppError::Conflict(_) => "Conflict",
            AppError::InconsistentState { .. } | AppError::Database(_) => "Internal Server Error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InconsistentState { .. } | AppError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal details stay in the logs. Incomplete pairs are already
        // reported where the lookup detects them.
        let message = match &self {
            AppError::InconsistentState { .. } => "Internal Server Error".to_string(),
            AppError::Database(e) => {
                error!(error = %e, "database error while handling request");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        (
            status,
            Json(json!({ "error": self.kind(), "message": message })),
        )
            .into_response()
    }
}
