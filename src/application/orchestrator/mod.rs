//! Generation Orchestrator - 三阶段生成编排
//!
//! - Phase A: 大纲生成（outline.rs）
//! - Phase B: 用户审阅编辑（由 section 命令处理器负责，不在此处）
//! - Phase C: 封面 + 逐章节正文流式生成 + 插图生成，可续跑（generation.rs）
//!
//! 所有入口都显式携带 workspace_id，编排器本身无全局状态

mod generation;
mod outline;
mod prompts;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use thiserror::Error;

use crate::application::ports::{
    ContentProviderPort, ProviderError, ProviderErrorKind, RunFailure, SnapshotPublisherPort,
    WorkspaceError, WorkspaceManagerPort,
};
use crate::domain::project::Project;
use crate::domain::run::{RunProgress, RunState};

pub use generation::{RunOutcome, TEXT_FAILURE_PLACEHOLDER};

/// 大纲生成错误（只终止 Phase A）
#[derive(Debug, Error)]
pub enum OutlineError {
    #[error("Outline request failed: {0}")]
    Provider(#[source] ProviderError),

    #[error("Malformed outline: {0}")]
    Malformed(String),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}

impl OutlineError {
    pub fn kind(&self) -> ProviderErrorKind {
        match self {
            OutlineError::Provider(e) => e.kind,
            OutlineError::Malformed(_) => ProviderErrorKind::ParseError,
            OutlineError::Workspace(_) => ProviderErrorKind::ProviderError,
        }
    }
}

/// 运行级错误（终止整次 Phase C）
#[derive(Debug, Error)]
pub enum RunError {
    /// 逃逸出单步处理的服务错误（主要是缺少凭证）
    #[error("Generation aborted: {0}")]
    Aborted(#[source] ProviderError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}

/// 编排器依赖的端口集合
#[derive(Clone)]
pub struct GenerationContext {
    pub provider: Arc<dyn ContentProviderPort>,
    pub workspaces: Arc<dyn WorkspaceManagerPort>,
    pub publisher: Arc<dyn SnapshotPublisherPort>,
}

/// 生成编排器
#[derive(Clone)]
pub struct GenerationOrchestrator {
    ctx: GenerationContext,
}

impl GenerationOrchestrator {
    pub fn new(ctx: GenerationContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &GenerationContext {
        &self.ctx
    }

    /// 写入工作区并广播 Project 快照
    fn publish_project(&self, workspace_id: &str, project: &Project) {
        if let Err(e) = self.ctx.workspaces.save_project(workspace_id, project.clone()) {
            tracing::debug!(workspace_id = %workspace_id, error = %e, "Failed to store project snapshot");
        }
        self.ctx.publisher.publish_project(workspace_id, project);
    }

    fn publish_progress(&self, workspace_id: &str, progress: &RunProgress) {
        if let Err(e) = self.ctx.workspaces.save_progress(workspace_id, progress.clone()) {
            tracing::debug!(workspace_id = %workspace_id, error = %e, "Failed to store progress");
        }
        self.ctx.publisher.publish_progress(workspace_id, progress);
    }

    fn publish_run_state(&self, workspace_id: &str, state: RunState, failure: Option<RunFailure>) {
        self.ctx.publisher.publish_run_state(workspace_id, state, failure.as_ref());
        if let Err(e) = self.ctx.workspaces.set_run_state(workspace_id, state, failure) {
            tracing::debug!(workspace_id = %workspace_id, error = %e, "Failed to store run state");
        }
    }
}
