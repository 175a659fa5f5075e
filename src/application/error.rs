//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::RepositoryError;
use crate::domain::chapter::ChapterError;
use crate::domain::merge_request::MergeRequestError;
use crate::domain::novel::NovelError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 无法识别操作者身份
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 操作者缺少所需的所有权
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 状态无效
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 唯一性冲突
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 仓储错误
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建未认证错误
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// 创建权限错误
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// 创建状态无效错误
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// 创建冲突错误
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { resource_type, id } => Self::NotFound { resource_type, id },
            RepositoryError::Duplicate(msg) => Self::Conflict(msg),
            RepositoryError::PreconditionFailed(msg) => Self::InvalidState(msg),
            other => Self::RepositoryError(other.to_string()),
        }
    }
}

impl From<NovelError> for ApplicationError {
    fn from(err: NovelError) -> Self {
        match err {
            NovelError::NotOwner { .. } => Self::Forbidden(err.to_string()),
        }
    }
}

impl From<ChapterError> for ApplicationError {
    fn from(err: ChapterError) -> Self {
        match err {
            ChapterError::NotAFork { .. } => Self::InvalidState(err.to_string()),
            ChapterError::NotAuthor { .. } => Self::Forbidden(err.to_string()),
            ChapterError::InconsistentLineage(_) => Self::InternalError(err.to_string()),
        }
    }
}

impl From<MergeRequestError> for ApplicationError {
    fn from(err: MergeRequestError) -> Self {
        match err {
            MergeRequestError::InvalidTransition { .. } => Self::InvalidState(err.to_string()),
            MergeRequestError::Inconsistent(_) => Self::InternalError(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::merge_request::MergeStatus;

    #[test]
    fn test_repository_error_mapping() {
        assert!(matches!(
            ApplicationError::from(RepositoryError::Duplicate("x".into())),
            ApplicationError::Conflict(_)
        ));
        assert!(matches!(
            ApplicationError::from(RepositoryError::PreconditionFailed("x".into())),
            ApplicationError::InvalidState(_)
        ));
        assert!(matches!(
            ApplicationError::from(RepositoryError::DatabaseError("x".into())),
            ApplicationError::RepositoryError(_)
        ));
    }

    #[test]
    fn test_invalid_transition_is_invalid_state() {
        let err = MergeRequestError::InvalidTransition {
            from: MergeStatus::Approved,
            to: MergeStatus::Rejected,
        };
        assert!(matches!(
            ApplicationError::from(err),
            ApplicationError::InvalidState(_)
        ));
    }
}
