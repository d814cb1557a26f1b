//! Generation Commands - 大纲与生成运行命令

use crate::domain::project::GenerationConfig;

/// 生成大纲命令
#[derive(Debug, Clone)]
pub struct StartOutlineCommand {
    pub workspace_id: String,
    pub config: GenerationConfig,
}

/// 开始或续跑生成命令
#[derive(Debug, Clone)]
pub struct StartGenerationCommand {
    pub workspace_id: String,
}

/// 开始生成响应
#[derive(Debug, Clone)]
pub struct StartGenerationResponse {
    pub workspace_id: String,
    /// 已完成、将被跳过的章节数
    pub completed_sections: usize,
    pub total_sections: usize,
}
