//! Section Commands - 审阅阶段的编辑命令

use crate::domain::project::{SectionField, SectionId};

/// 编辑章节字段
#[derive(Debug, Clone)]
pub struct EditSectionCommand {
    pub workspace_id: String,
    pub section_id: SectionId,
    pub field: SectionField,
    pub value: String,
}

/// 追加章节
#[derive(Debug, Clone)]
pub struct AddSectionCommand {
    pub workspace_id: String,
    pub title: String,
    pub description: String,
}

/// 追加章节响应
#[derive(Debug, Clone)]
pub struct AddSectionResponse {
    pub section_id: SectionId,
}

/// 删除章节
#[derive(Debug, Clone)]
pub struct RemoveSectionCommand {
    pub workspace_id: String,
    pub section_id: SectionId,
}

/// 修改项目标题
#[derive(Debug, Clone)]
pub struct RenameProjectCommand {
    pub workspace_id: String,
    pub title: String,
}
