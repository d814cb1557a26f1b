//! Project Context - Errors

use thiserror::Error;

use super::SectionId;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("章节不存在: {0}")]
    SectionNotFound(SectionId),

    #[error("大纲不包含任何章节")]
    EmptyOutline,
}
