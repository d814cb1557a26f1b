//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Project Context: 文档项目与章节
//! - Run Context: 生成运行状态与进度

pub mod project;
pub mod run;

// 导出分页算法
mod pagination;

pub use pagination::{
    paginate, scaled_height, BitmapSize, PageGeometry, PagePlacement, PaginationError,
};
