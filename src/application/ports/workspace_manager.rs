//! Workspace Manager Port - 工作区生命周期管理
//!
//! 工作区是每个入口显式携带的上下文：一个 Project、一个运行状态和当前进度。
//! 具体实现在 infrastructure/memory 层

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::ProviderErrorKind;
use crate::domain::project::{Project, ProjectError};
use crate::domain::run::{RunProgress, RunState, TransitionError};

/// Workspace Manager 错误
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Workspace not found: {0}")]
    NotFound(String),

    #[error("Workspace already exists: {0}")]
    AlreadyExists(String),

    #[error("Workspace {0} has no project yet")]
    NoProject(String),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Project(#[from] ProjectError),
}

/// 最近一次失败
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunFailure {
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl RunFailure {
    /// 是否需要提示用户补充凭证
    pub fn needs_credential(&self) -> bool {
        self.kind == ProviderErrorKind::CredentialMissing
    }
}

/// 工作区状态（in-memory）
#[derive(Debug, Clone)]
pub struct Workspace {
    pub id: String,
    pub project: Option<Project>,
    pub run_state: RunState,
    pub progress: Option<RunProgress>,
    pub last_failure: Option<RunFailure>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Workspace {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            project: None,
            run_state: RunState::Idle,
            progress: None,
            last_failure: None,
            created_at: now,
            last_activity: now,
        }
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Workspace Manager Port
///
/// 所有状态检查与迁移在实现内部原子完成，保证同一时刻只有一个写者
pub trait WorkspaceManagerPort: Send + Sync {
    /// 创建新工作区
    fn create(&self, workspace: Workspace) -> Result<String, WorkspaceError>;

    /// 获取工作区快照
    fn get(&self, id: &str) -> Result<Workspace, WorkspaceError>;

    /// 检查工作区是否有效
    fn is_valid(&self, id: &str) -> bool;

    /// 关闭工作区
    fn close(&self, id: &str) -> Result<(), WorkspaceError>;

    /// 进入 outlining，返回之前的状态
    fn begin_outline(&self, id: &str) -> Result<RunState, WorkspaceError>;

    /// 进入 generating，返回当前 Project 的副本供编排器独占
    fn begin_generation(&self, id: &str) -> Result<Project, WorkspaceError>;

    /// 设置运行状态及失败信息
    fn set_run_state(
        &self,
        id: &str,
        state: RunState,
        failure: Option<RunFailure>,
    ) -> Result<(), WorkspaceError>;

    /// 写入 Project 快照
    fn save_project(&self, id: &str, project: Project) -> Result<(), WorkspaceError>;

    /// 写入进度
    fn save_progress(&self, id: &str, progress: RunProgress) -> Result<(), WorkspaceError>;

    /// 在非运行状态下编辑 Project，返回编辑后的快照
    fn edit_project(
        &self,
        id: &str,
        edit: &mut dyn FnMut(&mut Project) -> Result<(), ProjectError>,
    ) -> Result<Project, WorkspaceError>;

    /// 更新最后活动时间
    fn touch(&self, id: &str);

    /// 获取所有空闲超时的工作区 ID
    fn get_expired_workspaces(&self, idle_timeout_secs: u64) -> Vec<String>;
}
