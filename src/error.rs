use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Error type returned by every handler.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input, invalid enum value.
    #[error("{0}")]
    Validation(String),

    /// Duplicate unique value (email). Reported as 400 like validation.
    #[error("{0}")]
    Conflict(String),

    /// Missing/invalid/expired token or bad credentials.
    #[error("{0}")]
    Authentication(String),

    /// Absent or not owned by the caller; the two are never told apart.
    #[error("{0}")]
    NotFound(String),

    #[error("internal error: {cause:#}")]
    Internal {
        message: &'static str,
        cause: anyhow::Error,
    },
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Internal error with a custom public message.
    pub fn internal_with(message: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            message,
            cause: source.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(cause: anyhow::Error) -> Self {
        Self::Internal {
            message: "Something went wrong!",
            cause,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            ApiError::Validation(msg)
            | ApiError::Conflict(msg)
            | ApiError::Authentication(msg)
            | ApiError::NotFound(msg) => msg,
            ApiError::Internal { message, cause } => {
                error!(error = %format!("{cause:#}"), "request failed");
                message.to_string()
            }
        };

        let kind = if status.is_client_error() { "fail" } else { "error" };
        (status, Json(json!({ "status": kind, "error": message }))).into_response()
    }
}
