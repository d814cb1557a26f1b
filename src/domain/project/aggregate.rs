//! Project Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GenerationConfig, ImageRef, ProjectError, Section, SectionField, SectionId};

/// 大纲中的单个章节草稿
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Project 聚合根
///
/// 不变量:
/// - sections 的顺序即文档顺序，index + 1 为显示编号
/// - SectionId 由 next_section_id 单调分配，删除后不复用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    config: GenerationConfig,
    title: String,
    cover: Option<ImageRef>,
    sections: Vec<Section>,
    next_section_id: u32,
    created_at: DateTime<Utc>,
}

impl Project {
    /// 从大纲结果创建新项目
    ///
    /// 标题回退顺序: 生成服务标题 → 用户标题 → 主题
    pub fn from_outline(
        config: GenerationConfig,
        provider_title: Option<&str>,
        drafts: Vec<SectionDraft>,
    ) -> Result<Self, ProjectError> {
        if drafts.is_empty() {
            return Err(ProjectError::EmptyOutline);
        }

        let title = [provider_title.unwrap_or(""), config.title.as_str(), config.topic.as_str()]
            .into_iter()
            .map(str::trim)
            .find(|t| !t.is_empty())
            .unwrap_or_default()
            .to_string();

        let mut project = Self {
            config,
            title,
            cover: None,
            sections: Vec::with_capacity(drafts.len()),
            next_section_id: 1,
            created_at: Utc::now(),
        };

        for draft in drafts {
            let id = project.allocate_id();
            project
                .sections
                .push(Section::new(id, draft.title, draft.description));
        }

        Ok(project)
    }

    fn allocate_id(&mut self) -> SectionId {
        let id = SectionId::new(self.next_section_id);
        self.next_section_id += 1;
        id
    }

    // Getters
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn cover(&self) -> Option<&ImageRef> {
        self.cover.as_ref()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn get_section(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id() == id)
    }

    /// 可变章节切片（不能增删章节，仅供编排器推进生成阶段）
    pub fn sections_mut(&mut self) -> &mut [Section] {
        &mut self.sections
    }

    pub fn set_cover(&mut self, cover: ImageRef) {
        self.cover = Some(cover);
    }

    pub fn rename(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// 编辑章节字段
    pub fn edit_section(
        &mut self,
        id: SectionId,
        field: SectionField,
        value: String,
    ) -> Result<(), ProjectError> {
        let section = self
            .sections
            .iter_mut()
            .find(|s| s.id() == id)
            .ok_or(ProjectError::SectionNotFound(id))?;
        section.edit(field, value);
        Ok(())
    }

    /// 在末尾追加空白章节
    pub fn add_section(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> SectionId {
        let id = self.allocate_id();
        self.sections.push(Section::new(id, title, description));
        id
    }

    pub fn remove_section(&mut self, id: SectionId) -> Result<Section, ProjectError> {
        let index = self
            .sections
            .iter()
            .position(|s| s.id() == id)
            .ok_or(ProjectError::SectionNotFound(id))?;
        Ok(self.sections.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::project::SectionStatus;

    fn drafts(n: usize) -> Vec<SectionDraft> {
        (1..=n)
            .map(|i| SectionDraft {
                title: format!("Section {}", i),
                description: format!("About part {}", i),
            })
            .collect()
    }

    #[test]
    fn test_from_outline_assigns_ids_and_pending() {
        let project =
            Project::from_outline(GenerationConfig::new("Topic"), Some("Title"), drafts(3)).unwrap();

        assert_eq!(project.title(), "Title");
        let ids: Vec<u32> = project.sections().iter().map(|s| s.id().value()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(project
            .sections()
            .iter()
            .all(|s| s.status() == SectionStatus::Pending));
    }

    #[test]
    fn test_title_fallback_chain() {
        let mut config = GenerationConfig::new("Topic");
        config.title = "User Title".to_string();

        let project = Project::from_outline(config.clone(), Some("  "), drafts(3)).unwrap();
        assert_eq!(project.title(), "User Title");

        config.title = String::new();
        let project = Project::from_outline(config, None, drafts(3)).unwrap();
        assert_eq!(project.title(), "Topic");
    }

    #[test]
    fn test_empty_outline_rejected() {
        let result = Project::from_outline(GenerationConfig::new("Topic"), None, Vec::new());
        assert!(matches!(result, Err(ProjectError::EmptyOutline)));
    }

    #[test]
    fn test_ids_not_reused_after_removal() {
        let mut project =
            Project::from_outline(GenerationConfig::new("Topic"), None, drafts(3)).unwrap();

        project.remove_section(SectionId::new(3)).unwrap();
        let id = project.add_section("New", "");
        assert_eq!(id.value(), 4);
        assert_eq!(project.section_count(), 3);
    }

    #[test]
    fn test_edit_unknown_section() {
        let mut project =
            Project::from_outline(GenerationConfig::new("Topic"), None, drafts(3)).unwrap();
        let result = project.edit_section(SectionId::new(99), SectionField::Title, "x".into());
        assert!(matches!(result, Err(ProjectError::SectionNotFound(_))));
    }
}
