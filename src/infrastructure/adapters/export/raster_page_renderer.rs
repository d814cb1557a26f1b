//! Raster Page Renderer - 基于 image crate 的页面合成
//!
//! 解码 PNG/JPEG 输入，缩放到内容区宽度，
//! 每页从缩放图中裁出整数行的可见区带，放到带边距的白色页面上，输出 PNG

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, ImageReader, Rgba, RgbaImage};
use std::io::Cursor;

use crate::application::ports::{PageRendererPort, RenderError, RenderedPage};
use crate::domain::{paginate, BitmapSize, PageGeometry};

const PAGE_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// 栅格页面渲染器
#[derive(Debug, Clone, Default)]
pub struct RasterPageRenderer;

impl RasterPageRenderer {
    pub fn new() -> Self {
        Self
    }
}

fn decode(index: usize, bytes: &[u8]) -> Result<RgbaImage, RenderError> {
    image::load_from_memory(bytes)
        .map(|image| image.to_rgba8())
        .map_err(|e| RenderError::DecodingError {
            index,
            message: e.to_string(),
        })
}

fn encode_png(page: RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut data = Vec::new();
    DynamicImage::ImageRgba8(page)
        .write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
        .map_err(|e| RenderError::EncodingError(e.to_string()))?;
    Ok(data)
}

fn px(value: f64) -> u32 {
    value.round().max(1.0) as u32
}

/// 缩放图中本页可见区带的整数行范围 (top, height)
///
/// 下边界与下一页的上边界来自同一个浮点值，取整后首尾相接
fn visible_band(visible_top: f64, geometry: &PageGeometry, image_height: u32) -> (u32, u32) {
    let top = (visible_top.round().max(0.0) as u32).min(image_height);
    let bottom = ((visible_top + geometry.content_height()).round().max(0.0) as u32).min(image_height);
    (top, bottom.saturating_sub(top))
}

impl PageRendererPort for RasterPageRenderer {
    fn render(
        &self,
        bitmaps: &[Vec<u8>],
        geometry: &PageGeometry,
    ) -> Result<Vec<RenderedPage>, RenderError> {
        let decoded = bitmaps
            .iter()
            .enumerate()
            .map(|(index, bytes)| decode(index, bytes))
            .collect::<Result<Vec<_>, _>>()?;

        let sizes: Vec<BitmapSize> = decoded
            .iter()
            .map(|image| BitmapSize {
                width: image.width(),
                height: image.height(),
            })
            .collect();
        let placements = paginate(&sizes, geometry)?;

        let content_width = px(geometry.content_width());
        // 各页可见区带的上下边界分别取整，相邻两页共用同一个边界，
        // 区带高度因此在 floor(C) 与 ceil(C) 之间
        let content_height = geometry.content_height().ceil().max(1.0) as u32;
        let margin = geometry.margin.round() as i64;

        let mut pages = Vec::with_capacity(placements.len());
        let mut scaled: Option<(usize, RgbaImage)> = None;

        for (page_index, placement) in placements.iter().enumerate() {
            let source_index = placement.source_index;
            if scaled.as_ref().map(|(index, _)| *index) != Some(source_index) {
                let source = &decoded[source_index];
                let target_height = px(placement.draw_height);
                let image = if source.width() == content_width && source.height() == target_height
                {
                    source.clone()
                } else {
                    imageops::resize(source, content_width, target_height, FilterType::Triangle)
                };
                scaled = Some((source_index, image));
            }
            let Some((_, image)) = scaled.as_ref() else {
                continue;
            };

            let (band_top, band_height) = visible_band(placement.visible_top, geometry, image.height());
            let mut content = RgbaImage::from_pixel(content_width, content_height, PAGE_BACKGROUND);
            if band_height > 0 {
                let band = imageops::crop_imm(image, 0, band_top, image.width(), band_height).to_image();
                imageops::overlay(&mut content, &band, 0, 0);
            }

            let mut page = RgbaImage::from_pixel(px(geometry.width), px(geometry.height), PAGE_BACKGROUND);
            imageops::overlay(&mut page, &content, margin, margin);

            pages.push(RenderedPage {
                page_index,
                source_index,
                mime_type: "image/png".to_string(),
                data: encode_png(page)?,
            });
        }

        tracing::debug!(
            inputs = bitmaps.len(),
            pages = pages.len(),
            "Pages rendered"
        );
        Ok(pages)
    }

    fn bitmap_width(&self, bitmap: &[u8]) -> Option<u32> {
        ImageReader::new(Cursor::new(bitmap))
            .with_guessed_format()
            .ok()?
            .into_dimensions()
            .ok()
            .map(|(width, _)| width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([200, 0, 0, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 200, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 200, 255]);

    /// 每 100 行换一种颜色的测试图
    fn banded_png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_fn(width, height, |_, y| match y / 100 {
            0 => RED,
            1 => GREEN,
            _ => BLUE,
        });
        encode_png(image).unwrap()
    }

    fn load(page: &RenderedPage) -> RgbaImage {
        image::load_from_memory(&page.data).unwrap().to_rgba8()
    }

    fn geometry() -> PageGeometry {
        // 内容区 100x100
        PageGeometry::new(120.0, 120.0, 10.0).unwrap()
    }

    #[test]
    fn test_short_bitmap_fits_one_page() {
        let renderer = RasterPageRenderer::new();
        let pages = renderer.render(&[banded_png(100, 50)], &geometry()).unwrap();

        assert_eq!(pages.len(), 1);
        let page = load(&pages[0]);
        assert_eq!(page.dimensions(), (120, 120));
        assert_eq!(*page.get_pixel(0, 0), PAGE_BACKGROUND);
        assert_eq!(*page.get_pixel(10, 10), RED);
        assert_eq!(*page.get_pixel(50, 70), PAGE_BACKGROUND);
    }

    #[test]
    fn test_tall_bitmap_slices_in_order() {
        let renderer = RasterPageRenderer::new();
        let pages = renderer.render(&[banded_png(100, 250)], &geometry()).unwrap();

        assert_eq!(pages.len(), 3);
        assert_eq!(*load(&pages[0]).get_pixel(50, 10), RED);
        assert_eq!(*load(&pages[1]).get_pixel(50, 10), GREEN);

        let last = load(&pages[2]);
        assert_eq!(*last.get_pixel(50, 10), BLUE);
        // 只剩 50 行可见，其余留白
        assert_eq!(*last.get_pixel(50, 80), PAGE_BACKGROUND);
        // 页边距不被覆盖
        assert_eq!(*last.get_pixel(50, 115), PAGE_BACKGROUND);
    }

    /// 行号编码进像素: r/g 为行号低/高字节，b 为标记
    fn row_coded_png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_fn(width, height, |_, y| {
            Rgba([(y & 0xff) as u8, (y >> 8) as u8, 7, 255])
        });
        encode_png(image).unwrap()
    }

    #[test]
    fn test_fractional_content_height_covers_every_row_once() {
        // A4，10mm 边距，内容宽 800px；内容高约 1166.3px
        let config = crate::config::ExportConfig::default();
        let scale = config.raster_width as f64 / (config.page_width - 2.0 * config.margin);
        let geometry = PageGeometry::new(
            config.page_width * scale,
            config.page_height * scale,
            config.margin * scale,
        )
        .unwrap();
        assert!(geometry.content_height().fract() > 0.0);

        let renderer = RasterPageRenderer::new();
        let pages = renderer
            .render(&[row_coded_png(800, 3000)], &geometry)
            .unwrap();
        assert_eq!(pages.len(), 3);

        let column = geometry.margin.round() as u32 + 5;
        let mut seen = vec![0u32; 3000];
        for page in &pages {
            let page = load(page);
            for y in 0..page.height() {
                let pixel = page.get_pixel(column, y);
                if pixel[2] == 7 && pixel[3] == 255 {
                    let row = pixel[0] as usize | (pixel[1] as usize) << 8;
                    seen[row] += 1;
                }
            }
        }

        let missing: Vec<usize> = (0..3000).filter(|row| seen[*row] == 0).collect();
        let duplicated: Vec<usize> = (0..3000).filter(|row| seen[*row] > 1).collect();
        assert!(missing.is_empty(), "missing rows: {:?}", missing);
        assert!(duplicated.is_empty(), "duplicated rows: {:?}", duplicated);
    }

    #[test]
    fn test_visible_band_boundaries_are_shared() {
        let geometry = PageGeometry::new(842.1, 1250.5, 42.1).unwrap();
        let step = geometry.content_height();
        let (top0, height0) = visible_band(0.0, &geometry, 3000);
        let (top1, height1) = visible_band(step, &geometry, 3000);
        let (top2, height2) = visible_band(step + step, &geometry, 3000);

        assert_eq!(top0, 0);
        assert_eq!(top0 + height0, top1);
        assert_eq!(top1 + height1, top2);
        assert_eq!(top2 + height2, 3000);
    }

    #[test]
    fn test_each_input_starts_new_page() {
        let renderer = RasterPageRenderer::new();
        let pages = renderer
            .render(&[banded_png(100, 30), banded_png(100, 150)], &geometry())
            .unwrap();

        let sources: Vec<usize> = pages.iter().map(|p| p.source_index).collect();
        assert_eq!(sources, vec![0, 1, 1]);
        let indices: Vec<usize> = pages.iter().map(|p| p.page_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_narrow_bitmap_is_scaled_to_content_width() {
        let renderer = RasterPageRenderer::new();
        // 50x100 缩放为 100x200，两页
        let pages = renderer.render(&[banded_png(50, 100)], &geometry()).unwrap();
        assert_eq!(pages.len(), 2);
    }

    #[test]
    fn test_invalid_bitmap_reports_index() {
        let renderer = RasterPageRenderer::new();
        let err = renderer
            .render(&[banded_png(100, 50), b"not an image".to_vec()], &geometry())
            .unwrap_err();
        assert!(matches!(err, RenderError::DecodingError { index: 1, .. }));
    }

    #[test]
    fn test_bitmap_width() {
        let renderer = RasterPageRenderer::new();
        assert_eq!(renderer.bitmap_width(&banded_png(80, 10)), Some(80));
        assert_eq!(renderer.bitmap_width(b"garbage"), None);
    }
}
