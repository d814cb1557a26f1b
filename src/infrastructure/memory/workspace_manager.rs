//! In-Memory Workspace Manager Implementation

use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;

use crate::application::ports::{RunFailure, Workspace, WorkspaceError, WorkspaceManagerPort};
use crate::domain::project::{Project, ProjectError};
use crate::domain::run::{RunProgress, RunState, TransitionError};

/// 内存工作区管理器
pub struct InMemoryWorkspaceManager {
    workspaces: DashMap<String, Workspace>,
}

impl InMemoryWorkspaceManager {
    pub fn new() -> Self {
        Self {
            workspaces: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Default for InMemoryWorkspaceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkspaceManagerPort for InMemoryWorkspaceManager {
    fn create(&self, workspace: Workspace) -> Result<String, WorkspaceError> {
        let workspace_id = workspace.id.clone();
        if self.workspaces.contains_key(&workspace_id) {
            return Err(WorkspaceError::AlreadyExists(workspace_id));
        }
        self.workspaces.insert(workspace_id.clone(), workspace);
        tracing::info!(workspace_id = %workspace_id, "Workspace created");
        Ok(workspace_id)
    }

    fn get(&self, id: &str) -> Result<Workspace, WorkspaceError> {
        self.workspaces
            .get(id)
            .map(|w| w.clone())
            .ok_or_else(|| WorkspaceError::NotFound(id.to_string()))
    }

    fn is_valid(&self, id: &str) -> bool {
        self.workspaces.contains_key(id)
    }

    fn close(&self, id: &str) -> Result<(), WorkspaceError> {
        let mut workspace = self
            .workspaces
            .get_mut(id)
            .ok_or_else(|| WorkspaceError::NotFound(id.to_string()))?;
        if workspace.run_state.is_busy() {
            return Err(WorkspaceError::Transition(TransitionError {
                state: workspace.run_state,
                action: "close workspace",
            }));
        }
        workspace.last_activity = Utc::now();
        drop(workspace);

        self.workspaces.remove(id);
        tracing::info!(workspace_id = %id, "Workspace closed");
        Ok(())
    }

    fn begin_outline(&self, id: &str) -> Result<RunState, WorkspaceError> {
        let mut workspace = self
            .workspaces
            .get_mut(id)
            .ok_or_else(|| WorkspaceError::NotFound(id.to_string()))?;

        let previous = workspace.run_state;
        workspace.run_state = previous.begin_outline()?;
        workspace.progress = None;
        workspace.last_failure = None;
        workspace.last_activity = Utc::now();

        tracing::debug!(workspace_id = %id, from = %previous, "Run state -> outlining");
        Ok(previous)
    }

    fn begin_generation(&self, id: &str) -> Result<Project, WorkspaceError> {
        let mut workspace = self
            .workspaces
            .get_mut(id)
            .ok_or_else(|| WorkspaceError::NotFound(id.to_string()))?;

        let project = workspace
            .project
            .clone()
            .ok_or_else(|| WorkspaceError::NoProject(id.to_string()))?;

        let previous = workspace.run_state;
        workspace.run_state = previous.begin_generation()?;
        workspace.last_failure = None;
        workspace.last_activity = Utc::now();

        tracing::debug!(workspace_id = %id, from = %previous, "Run state -> generating");
        Ok(project)
    }

    fn set_run_state(
        &self,
        id: &str,
        state: RunState,
        failure: Option<RunFailure>,
    ) -> Result<(), WorkspaceError> {
        let mut workspace = self
            .workspaces
            .get_mut(id)
            .ok_or_else(|| WorkspaceError::NotFound(id.to_string()))?;

        let old_state = workspace.run_state;
        workspace.run_state = state;
        workspace.last_failure = failure;
        workspace.last_activity = Utc::now();

        tracing::debug!(
            workspace_id = %id,
            old_state = %old_state,
            new_state = %state,
            "Run state changed"
        );
        Ok(())
    }

    fn save_project(&self, id: &str, project: Project) -> Result<(), WorkspaceError> {
        let mut workspace = self
            .workspaces
            .get_mut(id)
            .ok_or_else(|| WorkspaceError::NotFound(id.to_string()))?;
        workspace.project = Some(project);
        workspace.last_activity = Utc::now();
        Ok(())
    }

    fn save_progress(&self, id: &str, progress: RunProgress) -> Result<(), WorkspaceError> {
        let mut workspace = self
            .workspaces
            .get_mut(id)
            .ok_or_else(|| WorkspaceError::NotFound(id.to_string()))?;
        workspace.progress = Some(progress);
        Ok(())
    }

    fn edit_project(
        &self,
        id: &str,
        edit: &mut dyn FnMut(&mut Project) -> Result<(), ProjectError>,
    ) -> Result<Project, WorkspaceError> {
        let mut workspace = self
            .workspaces
            .get_mut(id)
            .ok_or_else(|| WorkspaceError::NotFound(id.to_string()))?;

        if !workspace.run_state.can_edit() {
            return Err(WorkspaceError::Transition(TransitionError {
                state: workspace.run_state,
                action: "edit project",
            }));
        }

        let project = workspace
            .project
            .as_mut()
            .ok_or_else(|| WorkspaceError::NoProject(id.to_string()))?;
        edit(project)?;
        let snapshot = project.clone();

        workspace.last_activity = Utc::now();
        Ok(snapshot)
    }

    fn touch(&self, id: &str) {
        if let Some(mut workspace) = self.workspaces.get_mut(id) {
            workspace.last_activity = Utc::now();
        }
    }

    fn get_expired_workspaces(&self, idle_timeout_secs: u64) -> Vec<String> {
        let now = Utc::now();
        let timeout = chrono::Duration::seconds(idle_timeout_secs as i64);

        self.workspaces
            .iter()
            .filter_map(|entry| {
                let elapsed = now - entry.last_activity;
                if elapsed > timeout && !entry.run_state.is_busy() {
                    Some(entry.key().clone())
                } else {
                    None
                }
            })
            .collect()
    }
}
