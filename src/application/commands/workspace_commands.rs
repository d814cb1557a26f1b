//! Workspace Commands - 工作区生命周期命令

/// 创建工作区命令
#[derive(Debug, Clone, Default)]
pub struct CreateWorkspaceCommand;

/// 创建工作区响应
#[derive(Debug, Clone)]
pub struct CreateWorkspaceResponse {
    pub workspace_id: String,
}

/// 关闭工作区命令
#[derive(Debug, Clone)]
pub struct CloseWorkspaceCommand {
    pub workspace_id: String,
}

/// 关闭工作区响应
#[derive(Debug, Clone)]
pub struct CloseWorkspaceResponse {
    pub workspace_id: String,
}
