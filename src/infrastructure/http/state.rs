//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::{
    // Command handlers
    AddSectionHandler, CloseWorkspaceHandler, CreateWorkspaceHandler, EditSectionHandler,
    PaginateExportHandler, RemoveSectionHandler, RenameProjectHandler, StartGenerationHandler,
    StartOutlineHandler,
    // Query handlers
    GetProjectHandler, GetRunStatusHandler,
    // Orchestrator & ports
    GenerationOrchestrator, PageRendererPort, SnapshotPublisherPort, WorkspaceManagerPort,
};
use crate::config::ExportConfig;
use crate::infrastructure::events::EventPublisher;

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub workspaces: Arc<dyn WorkspaceManagerPort>,
    pub event_publisher: Arc<EventPublisher>,

    // ========== Command Handlers ==========
    pub create_workspace_handler: CreateWorkspaceHandler,
    pub close_workspace_handler: CloseWorkspaceHandler,
    pub start_outline_handler: StartOutlineHandler,
    pub start_generation_handler: StartGenerationHandler,
    pub edit_section_handler: EditSectionHandler,
    pub add_section_handler: AddSectionHandler,
    pub remove_section_handler: RemoveSectionHandler,
    pub rename_project_handler: RenameProjectHandler,
    pub paginate_export_handler: PaginateExportHandler,

    // ========== Query Handlers ==========
    pub get_project_handler: GetProjectHandler,
    pub get_run_status_handler: GetRunStatusHandler,
}

impl AppState {
    /// 创建应用状态
    ///
    /// orchestrator 与 GenerationWorker 共享同一组端口，
    /// generation_queue 为 Worker 队列的发送端
    pub fn new(
        orchestrator: GenerationOrchestrator,
        event_publisher: Arc<EventPublisher>,
        renderer: Arc<dyn PageRendererPort>,
        generation_queue: mpsc::Sender<String>,
        export_config: ExportConfig,
    ) -> Self {
        let workspaces = orchestrator.context().workspaces.clone();
        let publisher: Arc<dyn SnapshotPublisherPort> = event_publisher.clone();

        Self {
            // Ports
            workspaces: workspaces.clone(),
            event_publisher: event_publisher.clone(),

            // Command handlers
            create_workspace_handler: CreateWorkspaceHandler::new(workspaces.clone()),
            close_workspace_handler: CloseWorkspaceHandler::new(
                workspaces.clone(),
                event_publisher.clone(),
            ),
            start_outline_handler: StartOutlineHandler::new(orchestrator),
            start_generation_handler: StartGenerationHandler::new(
                workspaces.clone(),
                generation_queue,
            ),
            edit_section_handler: EditSectionHandler::new(workspaces.clone(), publisher.clone()),
            add_section_handler: AddSectionHandler::new(workspaces.clone(), publisher.clone()),
            remove_section_handler: RemoveSectionHandler::new(workspaces.clone(), publisher.clone()),
            rename_project_handler: RenameProjectHandler::new(workspaces.clone(), publisher),
            paginate_export_handler: PaginateExportHandler::new(
                workspaces.clone(),
                renderer,
                export_config,
            ),

            // Query handlers
            get_project_handler: GetProjectHandler::new(workspaces.clone()),
            get_run_status_handler: GetRunStatusHandler::new(workspaces),
        }
    }
}
