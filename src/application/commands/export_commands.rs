//! Export Commands - 导出分页

use crate::application::ports::RenderedPage;
use crate::domain::PageGeometry;

/// 分页命令
///
/// bitmaps 为展示层栅格化后的位图：封面在前，随后每个章节一张
#[derive(Debug, Clone)]
pub struct PaginateExportCommand {
    pub workspace_id: String,
    pub bitmaps: Vec<Vec<u8>>,
}

/// 分页响应
#[derive(Debug, Clone)]
pub struct PaginateExportResponse {
    /// 页面像素尺寸
    pub geometry: PageGeometry,
    pub pages: Vec<RenderedPage>,
}
