//! Project Context - Entities

use serde::{Deserialize, Serialize};

use super::{ImageRef, SectionId};

/// 章节生成阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    /// 等待生成
    #[default]
    Pending,
    /// 正文流式生成中
    Writing,
    /// 插图生成中
    Illustrating,
    /// 已完成（插图可能缺失）
    Done,
}

impl SectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionStatus::Pending => "pending",
            SectionStatus::Writing => "writing",
            SectionStatus::Illustrating => "illustrating",
            SectionStatus::Done => "done",
        }
    }
}

/// 可编辑的章节字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionField {
    Title,
    Description,
    Content,
}

/// 章节 - 文档中的一章或一页幻灯片
///
/// 不变量:
/// - id 在 Project 内唯一，创建后不变
/// - 流式写入期间 content 只追加，不缩短
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    id: SectionId,
    title: String,
    description: String,
    content: String,
    illustration: Option<ImageRef>,
    status: SectionStatus,
}

impl Section {
    pub fn new(id: SectionId, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            content: String::new(),
            illustration: None,
            status: SectionStatus::Pending,
        }
    }

    pub fn id(&self) -> SectionId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn illustration(&self) -> Option<&ImageRef> {
        self.illustration.as_ref()
    }

    pub fn status(&self) -> SectionStatus {
        self.status
    }

    /// 是否满足续跑跳过条件
    pub fn is_complete(&self) -> bool {
        self.status == SectionStatus::Done
            && !self.content.is_empty()
            && self.illustration.is_some()
    }

    /// 用户编辑
    pub fn edit(&mut self, field: SectionField, value: String) {
        match field {
            SectionField::Title => self.title = value,
            SectionField::Description => self.description = value,
            SectionField::Content => self.content = value,
        }
    }

    /// 进入正文生成阶段，清空上一次未完成的内容
    pub fn begin_writing(&mut self) {
        self.status = SectionStatus::Writing;
        self.content.clear();
        self.illustration = None;
    }

    pub fn append_content(&mut self, fragment: &str) {
        self.content.push_str(fragment);
    }

    /// 正文为空时写入占位文本
    pub fn fill_placeholder_if_empty(&mut self, placeholder: &str) -> bool {
        if self.content.is_empty() {
            self.content = placeholder.to_string();
            return true;
        }
        false
    }

    pub fn begin_illustrating(&mut self) {
        self.status = SectionStatus::Illustrating;
    }

    pub fn finish(&mut self, illustration: Option<ImageRef>) {
        self.illustration = illustration;
        self.status = SectionStatus::Done;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_lifecycle() {
        let mut section = Section::new(SectionId::new(1), "Intro", "Opening words");
        assert_eq!(section.status(), SectionStatus::Pending);

        section.begin_writing();
        section.append_content("Hello ");
        section.append_content("world");
        assert_eq!(section.content(), "Hello world");

        section.begin_illustrating();
        assert!(!section.is_complete());

        section.finish(Some(ImageRef::from_bytes("image/png", &[0])));
        assert!(section.is_complete());
    }

    #[test]
    fn test_done_without_illustration_is_not_complete() {
        let mut section = Section::new(SectionId::new(1), "Intro", "");
        section.begin_writing();
        section.append_content("text");
        section.finish(None);
        assert_eq!(section.status(), SectionStatus::Done);
        assert!(!section.is_complete());
    }

    #[test]
    fn test_placeholder_only_when_empty() {
        let mut section = Section::new(SectionId::new(1), "Intro", "");
        section.append_content("partial");
        assert!(!section.fill_placeholder_if_empty("failed"));
        assert_eq!(section.content(), "partial");

        let mut empty = Section::new(SectionId::new(2), "Body", "");
        assert!(empty.fill_placeholder_if_empty("failed"));
        assert_eq!(empty.content(), "failed");
    }
}
