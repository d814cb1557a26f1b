//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（ContentProvider、WorkspaceManager、SnapshotPublisher、PageRenderer）
//! - orchestrator: 大纲 / 正文 / 插图三阶段生成编排
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod orchestrator;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    // Export commands
    PaginateExportCommand,
    PaginateExportResponse,
    // Generation commands
    StartGenerationCommand,
    StartGenerationResponse,
    StartOutlineCommand,
    // Section commands
    AddSectionCommand,
    AddSectionResponse,
    EditSectionCommand,
    RemoveSectionCommand,
    RenameProjectCommand,
    // Workspace commands
    CloseWorkspaceCommand,
    CloseWorkspaceResponse,
    CreateWorkspaceCommand,
    CreateWorkspaceResponse,
    // Handlers
    handlers::{
        AddSectionHandler, CloseWorkspaceHandler, CreateWorkspaceHandler, EditSectionHandler,
        PaginateExportHandler, RemoveSectionHandler, RenameProjectHandler, StartGenerationHandler,
        StartOutlineHandler,
    },
};

pub use error::ApplicationError;

pub use orchestrator::{
    GenerationContext, GenerationOrchestrator, OutlineError, RunError, RunOutcome,
    TEXT_FAILURE_PLACEHOLDER,
};

pub use ports::{
    // Content provider
    ContentProviderPort,
    GeneratedImage,
    ImageRequest,
    OutlineDraft,
    ProviderError,
    ProviderErrorKind,
    SectionTextRequest,
    TextStream,
    // Page renderer
    PageRendererPort,
    RenderError,
    RenderedPage,
    // Snapshot publisher
    SnapshotPublisherPort,
    // Workspace manager
    RunFailure,
    Workspace,
    WorkspaceError,
    WorkspaceManagerPort,
};

pub use queries::{
    GetProject,
    GetRunStatus,
    // Handlers
    handlers::{GetProjectHandler, GetRunStatusHandler, RunStatusResponse},
};
