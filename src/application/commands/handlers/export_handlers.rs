//! Export Command Handlers

use std::sync::Arc;

use crate::application::commands::export_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{PageRendererPort, WorkspaceError, WorkspaceManagerPort};
use crate::config::ExportConfig;
use crate::domain::PageGeometry;

/// PaginateExport Handler
///
/// 页面尺寸按配置的毫米值换算为像素：内容区宽度恰好等于栅格化宽度，
/// 因此按配置宽度栅格化的位图无需再缩放
pub struct PaginateExportHandler {
    workspaces: Arc<dyn WorkspaceManagerPort>,
    renderer: Arc<dyn PageRendererPort>,
    config: ExportConfig,
}

impl PaginateExportHandler {
    pub fn new(
        workspaces: Arc<dyn WorkspaceManagerPort>,
        renderer: Arc<dyn PageRendererPort>,
        config: ExportConfig,
    ) -> Self {
        Self {
            workspaces,
            renderer,
            config,
        }
    }

    /// 像素页面尺寸
    pub fn pixel_geometry(&self) -> Result<PageGeometry, ApplicationError> {
        let content_width = self.config.page_width - 2.0 * self.config.margin;
        if content_width <= 0.0 {
            return Err(ApplicationError::internal("Export margin leaves no content area"));
        }
        let scale = self.config.raster_width as f64 / content_width;
        PageGeometry::new(
            self.config.page_width * scale,
            self.config.page_height * scale,
            self.config.margin * scale,
        )
        .map_err(|e| ApplicationError::internal(e.to_string()))
    }

    pub fn handle(
        &self,
        cmd: PaginateExportCommand,
    ) -> Result<PaginateExportResponse, ApplicationError> {
        let workspace = self.workspaces.get(&cmd.workspace_id)?;
        if workspace.run_state.is_busy() {
            return Err(ApplicationError::invalid_state(format!(
                "cannot export while {}",
                workspace.run_state
            )));
        }
        let project = workspace
            .project
            .ok_or_else(|| WorkspaceError::NoProject(cmd.workspace_id.clone()))?;

        // 封面在前，随后每个章节一张
        let expected = 1 + project.section_count();
        if cmd.bitmaps.len() != expected {
            return Err(ApplicationError::validation(format!(
                "Expected {} bitmaps (cover + {} sections), got {}",
                expected,
                project.section_count(),
                cmd.bitmaps.len()
            )));
        }

        for (index, bitmap) in cmd.bitmaps.iter().enumerate() {
            match self.renderer.bitmap_width(bitmap) {
                Some(width) if width != self.config.raster_width => {
                    tracing::warn!(
                        workspace_id = %cmd.workspace_id,
                        index = index,
                        width = width,
                        expected = self.config.raster_width,
                        "Bitmap width differs from rasterization width"
                    );
                }
                _ => {}
            }
        }

        let geometry = self.pixel_geometry()?;
        let pages = self.renderer.render(&cmd.bitmaps, &geometry)?;

        tracing::info!(
            workspace_id = %cmd.workspace_id,
            inputs = cmd.bitmaps.len(),
            pages = pages.len(),
            "Export paginated"
        );

        Ok(PaginateExportResponse { geometry, pages })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::Workspace;
    use crate::domain::project::{GenerationConfig, Project, SectionDraft};
    use crate::domain::run::RunState;
    use crate::infrastructure::adapters::RasterPageRenderer;
    use crate::infrastructure::memory::InMemoryWorkspaceManager;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut data = Vec::new();
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])))
            .write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
            .unwrap();
        data
    }

    fn setup(state: RunState) -> (PaginateExportHandler, Arc<InMemoryWorkspaceManager>, String) {
        let workspaces = Arc::new(InMemoryWorkspaceManager::new());
        let id = workspaces.create(Workspace::new()).unwrap();
        let project = Project::from_outline(
            GenerationConfig::new("Topic"),
            None,
            vec![SectionDraft {
                title: "One".into(),
                description: String::new(),
            }],
        )
        .unwrap();
        workspaces.save_project(&id, project).unwrap();
        workspaces.set_run_state(&id, state, None).unwrap();

        // 内容区 100 x 100，外加 10 的边距
        let config = ExportConfig {
            page_width: 120.0,
            page_height: 120.0,
            margin: 10.0,
            raster_width: 100,
        };
        let handler = PaginateExportHandler::new(
            workspaces.clone(),
            Arc::new(RasterPageRenderer::new()),
            config,
        );
        (handler, workspaces, id)
    }

    #[test]
    fn test_paginates_cover_and_sections() {
        let (handler, _, id) = setup(RunState::Completed);
        let response = handler
            .handle(PaginateExportCommand {
                workspace_id: id,
                bitmaps: vec![png(100, 80), png(100, 250)],
            })
            .unwrap();

        assert_eq!(response.geometry.width, 120.0);
        assert_eq!(response.pages.len(), 4);
        assert_eq!(response.pages[0].source_index, 0);
        assert!(response.pages[1..].iter().all(|p| p.source_index == 1));
    }

    #[test]
    fn test_rejects_wrong_bitmap_count() {
        let (handler, _, id) = setup(RunState::Completed);
        let err = handler
            .handle(PaginateExportCommand {
                workspace_id: id,
                bitmaps: vec![png(100, 80)],
            })
            .unwrap_err();
        assert!(matches!(err, ApplicationError::ValidationError(_)));
    }

    #[test]
    fn test_rejects_while_generating() {
        let (handler, _, id) = setup(RunState::Generating);
        let err = handler
            .handle(PaginateExportCommand {
                workspace_id: id,
                bitmaps: vec![png(100, 80), png(100, 80)],
            })
            .unwrap_err();
        assert!(matches!(err, ApplicationError::InvalidState(_)));
    }

    #[test]
    fn test_pixel_geometry_scales_to_raster_width() {
        let workspaces = Arc::new(InMemoryWorkspaceManager::new());
        let handler = PaginateExportHandler::new(
            workspaces,
            Arc::new(RasterPageRenderer::new()),
            ExportConfig::default(),
        );
        let geometry = handler.pixel_geometry().unwrap();
        assert!((geometry.content_width() - 800.0).abs() < 1e-9);
    }
}
