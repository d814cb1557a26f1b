//! Export Adapter - 导出页面渲染

mod raster_page_renderer;

pub use raster_page_renderer::RasterPageRenderer;
