//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::orchestrator::OutlineError;
use crate::application::ports::{ProviderError, RenderError, WorkspaceError};
use crate::domain::project::ProjectError;

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

    /// 状态无效
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 缺少内容服务凭证
    #[error("Credential missing: {0}")]
    CredentialMissing(String),

    /// 外部服务错误
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建状态无效错误
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<WorkspaceError> for ApplicationError {
    fn from(err: WorkspaceError) -> Self {
        match err {
            WorkspaceError::NotFound(id) => Self::not_found("Workspace", id),
            WorkspaceError::AlreadyExists(_) => Self::internal(err.to_string()),
            WorkspaceError::NoProject(_) | WorkspaceError::Transition(_) => {
                Self::invalid_state(err.to_string())
            }
            WorkspaceError::Project(e) => e.into(),
        }
    }
}

impl From<ProjectError> for ApplicationError {
    fn from(err: ProjectError) -> Self {
        match err {
            ProjectError::SectionNotFound(id) => Self::not_found("Section", id.to_string()),
            ProjectError::EmptyOutline => Self::validation(err.to_string()),
        }
    }
}

impl From<ProviderError> for ApplicationError {
    fn from(err: ProviderError) -> Self {
        if err.is_credential_missing() {
            Self::CredentialMissing(err.message)
        } else {
            Self::ExternalServiceError(err.message)
        }
    }
}

impl From<OutlineError> for ApplicationError {
    fn from(err: OutlineError) -> Self {
        match err {
            OutlineError::Provider(e) => e.into(),
            OutlineError::Malformed(message) => Self::ExternalServiceError(message),
            OutlineError::Workspace(e) => e.into(),
        }
    }
}

impl From<RenderError> for ApplicationError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::EncodingError(_) => Self::internal(err.to_string()),
            _ => Self::validation(err.to_string()),
        }
    }
}
