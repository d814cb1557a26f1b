//! Page Renderer Port - 导出页面渲染抽象
//!
//! 将章节位图按分页结果合成为固定尺寸的页面图片，
//! 最终文档容器的组装由外部负责

use thiserror::Error;

use crate::domain::{PageGeometry, PaginationError};

/// 渲染错误
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Decoding error for bitmap {index}: {message}")]
    DecodingError { index: usize, message: String },

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error(transparent)]
    Pagination(#[from] PaginationError),
}

/// 渲染后的单页
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// 全局页码（从 0 开始）
    pub page_index: usize,
    /// 来源位图序号（封面为 0）
    pub source_index: usize,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Page Renderer Port
pub trait PageRendererPort: Send + Sync {
    /// 渲染所有页面
    ///
    /// # Arguments
    /// * `bitmaps` - 编码后的输入位图（封面在前，随后每个章节一张）
    /// * `geometry` - 页面尺寸与边距（像素）
    fn render(
        &self,
        bitmaps: &[Vec<u8>],
        geometry: &PageGeometry,
    ) -> Result<Vec<RenderedPage>, RenderError>;

    /// 读取位图尺寸（不解码像素）
    fn bitmap_width(&self, bitmap: &[u8]) -> Option<u32>;
}
