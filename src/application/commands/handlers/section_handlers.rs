//! Section Command Handlers - 审阅阶段编辑
//!
//! 运行中（outlining / generating）的工作区拒绝所有编辑，
//! 编辑成功后广播新的 Project 快照

use std::sync::Arc;

use crate::application::commands::section_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{SnapshotPublisherPort, WorkspaceManagerPort};
use crate::domain::project::{Project, SectionId};

/// EditSection Handler
pub struct EditSectionHandler {
    workspaces: Arc<dyn WorkspaceManagerPort>,
    publisher: Arc<dyn SnapshotPublisherPort>,
}

impl EditSectionHandler {
    pub fn new(
        workspaces: Arc<dyn WorkspaceManagerPort>,
        publisher: Arc<dyn SnapshotPublisherPort>,
    ) -> Self {
        Self {
            workspaces,
            publisher,
        }
    }

    pub fn handle(&self, cmd: EditSectionCommand) -> Result<Project, ApplicationError> {
        let EditSectionCommand {
            workspace_id,
            section_id,
            field,
            value,
        } = cmd;

        let mut value = Some(value);
        let project = self.workspaces.edit_project(&workspace_id, &mut |project| {
            project.edit_section(section_id, field, value.take().unwrap_or_default())
        })?;
        self.publisher.publish_project(&workspace_id, &project);

        tracing::debug!(
            workspace_id = %workspace_id,
            section_id = %section_id,
            field = ?field,
            "Section edited"
        );
        Ok(project)
    }
}

/// AddSection Handler - 在末尾追加章节
pub struct AddSectionHandler {
    workspaces: Arc<dyn WorkspaceManagerPort>,
    publisher: Arc<dyn SnapshotPublisherPort>,
}

impl AddSectionHandler {
    pub fn new(
        workspaces: Arc<dyn WorkspaceManagerPort>,
        publisher: Arc<dyn SnapshotPublisherPort>,
    ) -> Self {
        Self {
            workspaces,
            publisher,
        }
    }

    pub fn handle(&self, cmd: AddSectionCommand) -> Result<AddSectionResponse, ApplicationError> {
        let mut section_id: Option<SectionId> = None;
        let project = self.workspaces.edit_project(&cmd.workspace_id, &mut |project| {
            section_id = Some(project.add_section(cmd.title.clone(), cmd.description.clone()));
            Ok(())
        })?;
        self.publisher.publish_project(&cmd.workspace_id, &project);

        let section_id = section_id
            .ok_or_else(|| ApplicationError::internal("Section was not added"))?;
        tracing::debug!(workspace_id = %cmd.workspace_id, section_id = %section_id, "Section added");
        Ok(AddSectionResponse { section_id })
    }
}

/// RemoveSection Handler
pub struct RemoveSectionHandler {
    workspaces: Arc<dyn WorkspaceManagerPort>,
    publisher: Arc<dyn SnapshotPublisherPort>,
}

impl RemoveSectionHandler {
    pub fn new(
        workspaces: Arc<dyn WorkspaceManagerPort>,
        publisher: Arc<dyn SnapshotPublisherPort>,
    ) -> Self {
        Self {
            workspaces,
            publisher,
        }
    }

    pub fn handle(&self, cmd: RemoveSectionCommand) -> Result<Project, ApplicationError> {
        let project = self.workspaces.edit_project(&cmd.workspace_id, &mut |project| {
            project.remove_section(cmd.section_id).map(|_| ())
        })?;
        self.publisher.publish_project(&cmd.workspace_id, &project);

        tracing::debug!(workspace_id = %cmd.workspace_id, section_id = %cmd.section_id, "Section removed");
        Ok(project)
    }
}

/// RenameProject Handler
pub struct RenameProjectHandler {
    workspaces: Arc<dyn WorkspaceManagerPort>,
    publisher: Arc<dyn SnapshotPublisherPort>,
}

impl RenameProjectHandler {
    pub fn new(
        workspaces: Arc<dyn WorkspaceManagerPort>,
        publisher: Arc<dyn SnapshotPublisherPort>,
    ) -> Self {
        Self {
            workspaces,
            publisher,
        }
    }

    pub fn handle(&self, cmd: RenameProjectCommand) -> Result<Project, ApplicationError> {
        let title = cmd.title.trim().to_string();
        if title.is_empty() {
            return Err(ApplicationError::validation("Title cannot be empty"));
        }

        let project = self.workspaces.edit_project(&cmd.workspace_id, &mut |project| {
            project.rename(title.clone());
            Ok(())
        })?;
        self.publisher.publish_project(&cmd.workspace_id, &project);
        Ok(project)
    }
}
