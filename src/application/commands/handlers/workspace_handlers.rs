//! Workspace Command Handlers

use std::sync::Arc;

use crate::application::commands::workspace_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{Workspace, WorkspaceManagerPort};
use crate::infrastructure::events::EventPublisher;

/// CreateWorkspace Handler
pub struct CreateWorkspaceHandler {
    workspaces: Arc<dyn WorkspaceManagerPort>,
}

impl CreateWorkspaceHandler {
    pub fn new(workspaces: Arc<dyn WorkspaceManagerPort>) -> Self {
        Self { workspaces }
    }

    pub fn handle(
        &self,
        _cmd: CreateWorkspaceCommand,
    ) -> Result<CreateWorkspaceResponse, ApplicationError> {
        let workspace_id = self.workspaces.create(Workspace::new())?;
        Ok(CreateWorkspaceResponse { workspace_id })
    }
}

/// CloseWorkspace Handler - 运行中的工作区不能关闭
pub struct CloseWorkspaceHandler {
    workspaces: Arc<dyn WorkspaceManagerPort>,
    event_publisher: Arc<EventPublisher>,
}

impl CloseWorkspaceHandler {
    pub fn new(
        workspaces: Arc<dyn WorkspaceManagerPort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            workspaces,
            event_publisher,
        }
    }

    pub fn handle(
        &self,
        cmd: CloseWorkspaceCommand,
    ) -> Result<CloseWorkspaceResponse, ApplicationError> {
        self.workspaces.close(&cmd.workspace_id)?;
        self.event_publisher
            .publish_workspace_closed(&cmd.workspace_id, "Closed by client");

        Ok(CloseWorkspaceResponse {
            workspace_id: cmd.workspace_id,
        })
    }
}
