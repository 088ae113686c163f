//! HTTP Error Handling
//!
//! 错误响应使用真实的 HTTP 状态码，并保留统一信封：
//! `{"errno": <status>, "error": "...", "data": null, "details": {...}}`

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::ApplicationError;
use crate::domain::{FieldErrors, ValidationError};

/// 统一错误响应格式
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// 与 HTTP 状态码一致
    pub errno: u16,
    pub error: String,
    #[schema(value_type = Option<Object>)]
    pub data: Option<()>,
    /// 字段级错误（字段名 -> 错误信息）
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<FieldErrors>,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            errno: status.as_u16(),
            error: error.into(),
            data: None,
            details: None,
        }
    }
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// 字段校验失败，返回 400 与 details
    Validation(FieldErrors),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        ApiError::Validation(FieldErrors::single(field, message))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let response = match self {
            ApiError::Validation(fields) => {
                tracing::warn!(errno = status.as_u16(), details = %fields, "Validation failed");
                ErrorResponse {
                    details: Some(fields),
                    ..ErrorResponse::new(status, "Validation failed")
                }
            }
            ApiError::Internal(msg) => {
                // 内部细节只写日志
                tracing::error!(errno = status.as_u16(), error = %msg, "Internal server error");
                ErrorResponse::new(status, "Internal server error")
            }
            ApiError::ServiceUnavailable(msg) => {
                tracing::error!(errno = status.as_u16(), error = %msg, "Service unavailable");
                ErrorResponse::new(status, msg)
            }
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => {
                tracing::warn!(errno = status.as_u16(), error = %msg, "Request rejected");
                ErrorResponse::new(status, msg)
            }
        };

        (status, Json(response)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::NotFound(msg) => ApiError::NotFound(msg),
            ApplicationError::ValidationError(msg) => ApiError::BadRequest(msg),
            ApplicationError::InvalidFields(fields) => ApiError::Validation(fields),
            ApplicationError::BusinessRuleViolation(msg) => ApiError::BadRequest(msg),
            ApplicationError::Conflict(msg) => ApiError::Conflict(msg),
            ApplicationError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            ApplicationError::Forbidden(msg) => ApiError::Forbidden(msg),
            ApplicationError::ExternalServiceError(msg) => ApiError::ServiceUnavailable(msg),
            ApplicationError::RepositoryError(msg)
            | ApplicationError::StorageError(msg)
            | ApplicationError::InternalError(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e.0)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_status_and_envelope() {
        let (status, json) = body_json(ApiError::Conflict("Duplicate email".into())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["errno"], 409);
        assert_eq!(json["error"], "Duplicate email");
        assert!(json["data"].is_null());
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn test_validation_details() {
        let (status, json) = body_json(ApiError::invalid_field("price", "must be >= 0")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["details"]["price"], "must be >= 0");
    }

    #[tokio::test]
    async fn test_internal_message_is_hidden() {
        let (status, json) = body_json(ApiError::Internal("disk on fire".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Internal server error");
    }

    #[test]
    fn test_application_error_mapping() {
        let cases = [
            (ApplicationError::not_found("Book", 1), StatusCode::NOT_FOUND),
            (ApplicationError::unauthorized("no"), StatusCode::UNAUTHORIZED),
            (ApplicationError::forbidden("no"), StatusCode::FORBIDDEN),
            (ApplicationError::conflict("dup"), StatusCode::CONFLICT),
            (ApplicationError::business_rule("no"), StatusCode::BAD_REQUEST),
            (
                ApplicationError::ExternalServiceError("mongo down".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (ApplicationError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status(), status);
        }
    }
}
