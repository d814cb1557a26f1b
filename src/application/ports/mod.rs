//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod content_provider;
mod page_renderer;
mod snapshot_publisher;
mod workspace_manager;

pub use content_provider::{
    ContentProviderPort, GeneratedImage, ImageRequest, OutlineDraft, ProviderError,
    ProviderErrorKind, SectionTextRequest, TextStream,
};
pub use page_renderer::{PageRendererPort, RenderError, RenderedPage};
pub use snapshot_publisher::SnapshotPublisherPort;
pub use workspace_manager::{RunFailure, Workspace, WorkspaceError, WorkspaceManagerPort};
