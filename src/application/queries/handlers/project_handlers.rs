//! Project Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{RunFailure, WorkspaceManagerPort};
use crate::application::queries::{GetProject, GetRunStatus};
use crate::domain::project::Project;
use crate::domain::run::{RunProgress, RunState};

// ============================================================================
// Response DTOs
// ============================================================================

/// 运行状态响应
#[derive(Debug, Clone)]
pub struct RunStatusResponse {
    pub state: RunState,
    pub progress: Option<RunProgress>,
    pub last_failure: Option<RunFailure>,
    /// 展示层据此弹出凭证输入
    pub needs_credential: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// GetProject Handler
pub struct GetProjectHandler {
    workspaces: Arc<dyn WorkspaceManagerPort>,
}

impl GetProjectHandler {
    pub fn new(workspaces: Arc<dyn WorkspaceManagerPort>) -> Self {
        Self { workspaces }
    }

    /// 尚未生成大纲时返回 None
    pub fn handle(&self, query: GetProject) -> Result<Option<Project>, ApplicationError> {
        let workspace = self.workspaces.get(&query.workspace_id)?;
        self.workspaces.touch(&query.workspace_id);
        Ok(workspace.project)
    }
}

/// GetRunStatus Handler
pub struct GetRunStatusHandler {
    workspaces: Arc<dyn WorkspaceManagerPort>,
}

impl GetRunStatusHandler {
    pub fn new(workspaces: Arc<dyn WorkspaceManagerPort>) -> Self {
        Self { workspaces }
    }

    pub fn handle(&self, query: GetRunStatus) -> Result<RunStatusResponse, ApplicationError> {
        let workspace = self.workspaces.get(&query.workspace_id)?;
        let needs_credential = workspace
            .last_failure
            .as_ref()
            .is_some_and(RunFailure::needs_credential);

        Ok(RunStatusResponse {
            state: workspace.run_state,
            progress: workspace.progress,
            last_failure: workspace.last_failure,
            needs_credential,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{ProviderErrorKind, Workspace};
    use crate::infrastructure::memory::InMemoryWorkspaceManager;

    #[test]
    fn test_run_status_reports_credential_hint() {
        let workspaces = Arc::new(InMemoryWorkspaceManager::new());
        let id = workspaces.create(Workspace::new()).unwrap();
        workspaces
            .set_run_state(
                &id,
                RunState::Failed,
                Some(RunFailure {
                    kind: ProviderErrorKind::CredentialMissing,
                    message: "API key is not configured".into(),
                }),
            )
            .unwrap();

        let status = GetRunStatusHandler::new(workspaces.clone())
            .handle(GetRunStatus {
                workspace_id: id.clone(),
            })
            .unwrap();
        assert_eq!(status.state, RunState::Failed);
        assert!(status.needs_credential);
        assert!(status.progress.is_none());

        let project = GetProjectHandler::new(workspaces)
            .handle(GetProject { workspace_id: id })
            .unwrap();
        assert!(project.is_none());
    }

    #[test]
    fn test_unknown_workspace() {
        let workspaces = Arc::new(InMemoryWorkspaceManager::new());
        let err = GetRunStatusHandler::new(workspaces)
            .handle(GetRunStatus {
                workspace_id: "missing".into(),
            })
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { .. }));
    }
}
