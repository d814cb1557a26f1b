//! Export Handlers - 导出分页
//!
//! 展示层将封面与各章节栅格化为位图（base64）上传，
//! 返回按页切分后的页面图片，最终文档容器由展示层组装

use axum::{extract::State, Json};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::PaginateExportCommand;
use crate::domain::PageGeometry;
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// Request/Response DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PaginateExportRequest {
    pub workspace_id: String,
    /// base64 编码的位图：封面在前，随后每个章节一张
    pub bitmaps: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ExportPageDto {
    pub page_index: usize,
    pub source_index: usize,
    pub mime_type: String,
    /// base64 编码的页面图片
    pub data: String,
}

#[derive(Debug, Serialize)]
pub struct PaginateExportResponseDto {
    pub geometry: PageGeometry,
    pub page_count: usize,
    pub pages: Vec<ExportPageDto>,
}

// ============================================================================
// Handlers
// ============================================================================

/// 页面像素尺寸（展示层按 content 宽度栅格化）
///
/// GET /api/export/geometry
pub async fn export_geometry(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<PageGeometry>>, ApiError> {
    let geometry = state.paginate_export_handler.pixel_geometry()?;
    Ok(Json(ApiResponse::success(geometry)))
}

/// 分页导出
///
/// POST /api/export/paginate
pub async fn paginate_export(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PaginateExportRequest>,
) -> Result<Json<ApiResponse<PaginateExportResponseDto>>, ApiError> {
    let engine = base64::engine::general_purpose::STANDARD;
    let bitmaps = req
        .bitmaps
        .iter()
        .enumerate()
        .map(|(index, encoded)| {
            engine
                .decode(encoded)
                .map_err(|e| ApiError::BadRequest(format!("Invalid base64 for bitmap {}: {}", index, e)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let response = state
        .paginate_export_handler
        .handle(PaginateExportCommand {
            workspace_id: req.workspace_id,
            bitmaps,
        })?;

    let pages: Vec<ExportPageDto> = response
        .pages
        .into_iter()
        .map(|page| ExportPageDto {
            page_index: page.page_index,
            source_index: page.source_index,
            mime_type: page.mime_type,
            data: engine.encode(&page.data),
        })
        .collect();

    Ok(Json(ApiResponse::success(PaginateExportResponseDto {
        geometry: response.geometry,
        page_count: pages.len(),
        pages,
    })))
}
