//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use std::fmt::Display;
use thiserror::Error;

use crate::application::ports::{AuthError, ImageStorageError, RepositoryError};
use crate::domain::validation::{FieldErrors, ValidationError};

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{0}")]
    NotFound(String),

    /// 请求参数错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 字段级校验错误
    #[error("Validation failed: {0}")]
    InvalidFields(FieldErrors),

    /// 唯一性或引用冲突
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 未认证
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 无权限
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 业务规则违反
    #[error("Business rule violation: {0}")]
    BusinessRuleViolation(String),

    /// 仓储错误
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// 外部服务错误（文档库不可用等）
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &str, id: impl Display) -> Self {
        Self::NotFound(format!("{} not found: {}", resource_type, id))
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 单字段校验错误
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidFields(FieldErrors::single(field, message))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// 创建业务规则违反错误
    pub fn business_rule(message: impl Into<String>) -> Self {
        Self::BusinessRuleViolation(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => Self::NotFound(msg),
            RepositoryError::Duplicate(msg) | RepositoryError::ConstraintViolation(msg) => {
                Self::Conflict(msg)
            }
            RepositoryError::InvalidQuery(msg) => Self::ValidationError(msg),
            RepositoryError::Unavailable(msg) => Self::ExternalServiceError(msg),
            other => Self::RepositoryError(other.to_string()),
        }
    }
}

impl From<ValidationError> for ApplicationError {
    fn from(err: ValidationError) -> Self {
        Self::InvalidFields(err.0)
    }
}

impl From<AuthError> for ApplicationError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken | AuthError::InvalidToken(_) | AuthError::TokenExpired => {
                Self::Unauthorized(err.to_string())
            }
            AuthError::TokenCreation(_) | AuthError::Hashing(_) => {
                Self::InternalError(err.to_string())
            }
        }
    }
}

impl From<ImageStorageError> for ApplicationError {
    fn from(err: ImageStorageError) -> Self {
        match err {
            ImageStorageError::UnsupportedType(_)
            | ImageStorageError::Empty
            | ImageStorageError::InvalidName(_) => Self::invalid_field("file", err.to_string()),
            ImageStorageError::NotFound(_) => Self::NotFound(err.to_string()),
            ImageStorageError::IoError(msg) => Self::StorageError(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_mapping() {
        assert!(matches!(
            ApplicationError::from(RepositoryError::Duplicate("x".into())),
            ApplicationError::Conflict(_)
        ));
        assert!(matches!(
            ApplicationError::from(RepositoryError::ConstraintViolation("x".into())),
            ApplicationError::Conflict(_)
        ));
        assert!(matches!(
            ApplicationError::from(RepositoryError::InvalidQuery("x".into())),
            ApplicationError::ValidationError(_)
        ));
        assert!(matches!(
            ApplicationError::from(RepositoryError::DatabaseError("x".into())),
            ApplicationError::RepositoryError(_)
        ));
    }

    #[test]
    fn test_not_found_message() {
        let err = ApplicationError::not_found("Book", 42);
        assert_eq!(err.to_string(), "Book not found: 42");
    }
}
