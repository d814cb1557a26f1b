//! Generation Command Handlers

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::commands::generation_commands::*;
use crate::application::error::ApplicationError;
use crate::application::orchestrator::GenerationOrchestrator;
use crate::application::ports::{WorkspaceError, WorkspaceManagerPort};
use crate::domain::project::Project;

/// StartOutline Handler - 同步等待大纲生成完成
pub struct StartOutlineHandler {
    orchestrator: GenerationOrchestrator,
}

impl StartOutlineHandler {
    pub fn new(orchestrator: GenerationOrchestrator) -> Self {
        Self { orchestrator }
    }

    pub async fn handle(&self, cmd: StartOutlineCommand) -> Result<Project, ApplicationError> {
        if cmd.config.topic.trim().is_empty() {
            return Err(ApplicationError::validation("Topic cannot be empty"));
        }

        let project = self
            .orchestrator
            .synthesize_outline(&cmd.workspace_id, cmd.config)
            .await?;
        Ok(project)
    }
}

/// StartGeneration Handler - 校验后把工作区放入生成队列
///
/// 实际的状态迁移由 GenerationWorker 调用编排器时完成
pub struct StartGenerationHandler {
    workspaces: Arc<dyn WorkspaceManagerPort>,
    queue_sender: mpsc::Sender<String>,
}

impl StartGenerationHandler {
    pub fn new(workspaces: Arc<dyn WorkspaceManagerPort>, queue_sender: mpsc::Sender<String>) -> Self {
        Self {
            workspaces,
            queue_sender,
        }
    }

    pub fn handle(
        &self,
        cmd: StartGenerationCommand,
    ) -> Result<StartGenerationResponse, ApplicationError> {
        let workspace = self.workspaces.get(&cmd.workspace_id)?;
        workspace
            .run_state
            .begin_generation()
            .map_err(WorkspaceError::from)?;
        let project = workspace
            .project
            .ok_or_else(|| WorkspaceError::NoProject(cmd.workspace_id.clone()))?;

        let completed_sections = project.sections().iter().filter(|s| s.is_complete()).count();
        let total_sections = project.section_count();

        self.queue_sender
            .try_send(cmd.workspace_id.clone())
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    ApplicationError::invalid_state("Generation queue is full, retry later")
                }
                mpsc::error::TrySendError::Closed(_) => {
                    ApplicationError::internal("Generation worker is not running")
                }
            })?;

        tracing::info!(
            workspace_id = %cmd.workspace_id,
            completed_sections = completed_sections,
            total_sections = total_sections,
            "Generation queued"
        );

        Ok(StartGenerationResponse {
            workspace_id: cmd.workspace_id,
            completed_sections,
            total_sections,
        })
    }
}
