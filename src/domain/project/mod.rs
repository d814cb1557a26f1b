//! Project Context - 文档项目限界上下文
//!
//! 职责:
//! - 项目聚合管理
//! - 章节实体及其生成阶段
//! - 生成配置值对象

mod aggregate;
mod entities;
mod errors;
mod value_objects;

pub use aggregate::{Project, SectionDraft};
pub use entities::{Section, SectionField, SectionStatus};
pub use errors::ProjectError;
pub use value_objects::{
    DocumentFormat, GenerationConfig, IllustrationStyle, ImageRef, SectionCount, SectionId, Tone,
};
