//! HTTP Error Handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    pub data: Option<()>,
}

impl ErrorResponse {
    pub fn new(errno: i32, error: impl Into<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            data: None,
        }
    }
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const UNAUTHORIZED: i32 = 401;
    pub const FORBIDDEN: i32 = 403;
    pub const NOT_FOUND: i32 = 404;
    pub const CONFLICT: i32 = 409;
    pub const INVALID_STATE: i32 = 422;
    pub const INTERNAL_ERROR: i32 = 500;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    InvalidState(String),
    Internal(String),
}

impl ApiError {
    pub fn errno(&self) -> i32 {
        match self {
            ApiError::BadRequest(_) => errno::BAD_REQUEST,
            ApiError::Unauthorized(_) => errno::UNAUTHORIZED,
            ApiError::Forbidden(_) => errno::FORBIDDEN,
            ApiError::NotFound(_) => errno::NOT_FOUND,
            ApiError::Conflict(_) => errno::CONFLICT,
            ApiError::InvalidState(_) => errno::INVALID_STATE,
            ApiError::Internal(_) => errno::INTERNAL_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::InvalidState(msg)
            | ApiError::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let errno = self.errno();
        let msg = self.message();

        match &self {
            ApiError::Internal(_) => {
                tracing::error!(errno, error = %msg, "Internal server error");
            }
            ApiError::Unauthorized(_) => {
                tracing::warn!(errno, error = %msg, "Unauthenticated request");
            }
            ApiError::Forbidden(_) => {
                tracing::warn!(errno, error = %msg, "Forbidden");
            }
            ApiError::NotFound(_) => {
                tracing::warn!(errno, error = %msg, "Resource not found");
            }
            ApiError::Conflict(_) => {
                tracing::warn!(errno, error = %msg, "Resource conflict");
            }
            ApiError::InvalidState(_) => {
                tracing::warn!(errno, error = %msg, "Invalid state");
            }
            ApiError::BadRequest(_) => {
                tracing::warn!(errno, error = %msg, "Bad request");
            }
        }

        // 业务错误统一以 HTTP 200 + errno 返回
        (StatusCode::OK, Json(ErrorResponse::new(errno, msg))).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::NotFound { resource_type, id } => {
                ApiError::NotFound(format!("{} not found: {}", resource_type, id))
            }
            ApplicationError::ValidationError(msg) => ApiError::BadRequest(msg),
            ApplicationError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            ApplicationError::Forbidden(msg) => ApiError::Forbidden(msg),
            ApplicationError::InvalidState(msg) => ApiError::InvalidState(msg),
            ApplicationError::Conflict(msg) => ApiError::Conflict(msg),
            ApplicationError::RepositoryError(msg) => ApiError::Internal(msg),
            ApplicationError::InternalError(msg) => ApiError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_error_mapping() {
        let cases = [
            (ApplicationError::validation("x"), errno::BAD_REQUEST),
            (ApplicationError::unauthorized("x"), errno::UNAUTHORIZED),
            (ApplicationError::forbidden("x"), errno::FORBIDDEN),
            (ApplicationError::not_found("Novel", "1"), errno::NOT_FOUND),
            (ApplicationError::conflict("x"), errno::CONFLICT),
            (ApplicationError::invalid_state("x"), errno::INVALID_STATE),
            (ApplicationError::internal("x"), errno::INTERNAL_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).errno(), expected);
        }
    }

    #[test]
    fn test_error_response_is_http_ok() {
        let response = ApiError::Conflict("dup".into()).into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
