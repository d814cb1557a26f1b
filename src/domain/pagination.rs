//! 导出分页
//!
//! 将按固定宽度栅格化的高图切分到固定尺寸的页面上。
//! 每页绘制的是同一张完整缩放图，只是向上平移不同偏移量，
//! 内容区（去掉页边距）内可见的部分即为该页的切片。

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 浮点误差容忍度（避免整倍数高度时多出空白页）
const EPSILON: f64 = 1e-6;

#[derive(Debug, Error, PartialEq)]
pub enum PaginationError {
    #[error("invalid page geometry: {0}")]
    InvalidGeometry(String),

    #[error("bitmap {index} has zero width")]
    ZeroWidth { index: usize },
}

/// 页面尺寸（单位与渲染器一致，栅格渲染时为像素）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

impl PageGeometry {
    pub fn new(width: f64, height: f64, margin: f64) -> Result<Self, PaginationError> {
        let geometry = Self {
            width,
            height,
            margin,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    pub fn content_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    pub fn content_height(&self) -> f64 {
        self.height - 2.0 * self.margin
    }

    pub fn validate(&self) -> Result<(), PaginationError> {
        if self.margin < 0.0 {
            return Err(PaginationError::InvalidGeometry(
                "margin cannot be negative".to_string(),
            ));
        }
        if self.content_width() <= 0.0 || self.content_height() <= 0.0 {
            return Err(PaginationError::InvalidGeometry(format!(
                "margin {} leaves no content area on a {}x{} page",
                self.margin, self.width, self.height
            )));
        }
        Ok(())
    }
}

/// 输入位图尺寸
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitmapSize {
    pub width: u32,
    pub height: u32,
}

/// 单页上的图片摆放
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PagePlacement {
    /// 输入位图序号（封面为 0）
    pub source_index: usize,
    /// 该输入的第几页
    pub slice_index: usize,
    /// 图片左上角在页面上的坐标，y 可以为负
    pub x: f64,
    pub y: f64,
    /// 缩放后的完整图片尺寸
    pub draw_width: f64,
    pub draw_height: f64,
    /// 可见区带在缩放图中的起点与高度
    pub visible_top: f64,
    pub visible_height: f64,
}

/// 缩放到内容宽度后的高度
pub fn scaled_height(bitmap: BitmapSize, geometry: &PageGeometry) -> f64 {
    bitmap.height as f64 * geometry.content_width() / bitmap.width as f64
}

/// 计算所有输入的分页摆放
///
/// 每个输入从新页开始；高度不超过内容区时恰好一页，
/// 否则每 content_height 一页，共 ceil(H / C) 页。
pub fn paginate(
    bitmaps: &[BitmapSize],
    geometry: &PageGeometry,
) -> Result<Vec<PagePlacement>, PaginationError> {
    geometry.validate()?;

    let content_width = geometry.content_width();
    let content_height = geometry.content_height();
    let mut placements = Vec::new();

    for (index, bitmap) in bitmaps.iter().enumerate() {
        if bitmap.width == 0 {
            return Err(PaginationError::ZeroWidth { index });
        }

        let draw_height = scaled_height(*bitmap, geometry);
        let mut offset = 0.0;
        let mut slice_index = 0;

        loop {
            let visible_height = (draw_height - offset).min(content_height).max(0.0);
            placements.push(PagePlacement {
                source_index: index,
                slice_index,
                x: geometry.margin,
                y: geometry.margin - offset,
                draw_width: content_width,
                draw_height,
                visible_top: offset,
                visible_height,
            });

            offset += content_height;
            slice_index += 1;
            if offset >= draw_height - EPSILON {
                break;
            }
        }
    }

    Ok(placements)
}
