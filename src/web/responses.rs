use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::utils::error::{AppError, ErrorKind};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ErrorBody>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code: code.into(),
                message: message.into(),
            }),
            timestamp: chrono::Utc::now(),
        }
    }
}

// Errors as the HTTP surface reports them
#[derive(Debug)]
pub enum WebError {
    BadRequest(String),
    Unauthorized,
    NotFound(String),
    Conflict(String),
    UnprocessableEntity(String),
    InternalServerError(String),
}

impl WebError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::Unauthorized => StatusCode::UNAUTHORIZED,
            WebError::NotFound(_) => StatusCode::NOT_FOUND,
            WebError::Conflict(_) => StatusCode::CONFLICT,
            WebError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            WebError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            WebError::BadRequest(_) => "BAD_REQUEST",
            WebError::Unauthorized => "UNAUTHORIZED",
            WebError::NotFound(_) => "NOT_FOUND",
            WebError::Conflict(_) => "CONFLICT",
            WebError::UnprocessableEntity(_) => "UNPROCESSABLE_ENTITY",
            WebError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn message(&self) -> String {
        match self {
            WebError::Unauthorized => "Unauthorized".to_string(),
            WebError::BadRequest(msg)
            | WebError::NotFound(msg)
            | WebError::Conflict(msg)
            | WebError::UnprocessableEntity(msg)
            | WebError::InternalServerError(msg) => msg.clone(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(format!("{} not found", resource.into()))
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalServerError(msg.into())
    }

    /// Map a domain error, replacing infrastructure details with `fallback`.
    pub fn from_app(err: AppError, fallback: &str) -> Self {
        match err.kind() {
            ErrorKind::Conflict => WebError::Conflict(err.to_string()),
            ErrorKind::BadInput => WebError::BadRequest(match err {
                AppError::Validation(msg) => msg,
                other => other.to_string(),
            }),
            ErrorKind::NotFound => WebError::not_found(match err {
                AppError::NotFound { resource } => resource,
                other => other.to_string(),
            }),
            ErrorKind::Unauthorized => WebError::Unauthorized,
            ErrorKind::Upstream => WebError::UnprocessableEntity(err.to_string()),
            ErrorKind::Internal => {
                tracing::error!(error = %err, "Request failed");
                WebError::internal(fallback)
            }
        }
    }
}

impl From<AppError> for WebError {
    fn from(err: AppError) -> Self {
        WebError::from_app(err, "Internal server error")
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ApiResponse::<()>::error(self.error_code(), self.message());
        (status, Json(body)).into_response()
    }
}
