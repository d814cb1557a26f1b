//! Project Queries

/// 获取当前 Project 快照
#[derive(Debug, Clone)]
pub struct GetProject {
    pub workspace_id: String,
}

/// 获取运行状态与进度
#[derive(Debug, Clone)]
pub struct GetRunStatus {
    pub workspace_id: String,
}
