//! Section Handlers - 审阅阶段编辑
//!
//! 编辑结果同时通过 WebSocket 推送 ProjectUpdated

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::{AddSectionCommand, EditSectionCommand, RemoveSectionCommand};
use crate::domain::project::{Project, SectionField, SectionId};
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// Request/Response DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct EditSectionRequest {
    pub workspace_id: String,
    pub section_id: SectionId,
    pub field: SectionField,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct AddSectionRequest {
    pub workspace_id: String,
    #[serde(default = "default_section_title")]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

fn default_section_title() -> String {
    "New Section".to_string()
}

#[derive(Debug, Serialize)]
pub struct AddSectionResponseDto {
    pub section_id: SectionId,
}

#[derive(Debug, Deserialize)]
pub struct RemoveSectionRequest {
    pub workspace_id: String,
    pub section_id: SectionId,
}

// ============================================================================
// Handlers
// ============================================================================

/// 编辑章节字段
///
/// POST /api/section/edit
pub async fn edit_section(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EditSectionRequest>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    let project = state.edit_section_handler.handle(EditSectionCommand {
        workspace_id: req.workspace_id,
        section_id: req.section_id,
        field: req.field,
        value: req.value,
    })?;

    Ok(Json(ApiResponse::success(project)))
}

/// 追加章节
///
/// POST /api/section/add
pub async fn add_section(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddSectionRequest>,
) -> Result<Json<ApiResponse<AddSectionResponseDto>>, ApiError> {
    let response = state.add_section_handler.handle(AddSectionCommand {
        workspace_id: req.workspace_id,
        title: req.title,
        description: req.description,
    })?;

    Ok(Json(ApiResponse::success(AddSectionResponseDto {
        section_id: response.section_id,
    })))
}

/// 删除章节
///
/// POST /api/section/remove
pub async fn remove_section(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RemoveSectionRequest>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    let project = state.remove_section_handler.handle(RemoveSectionCommand {
        workspace_id: req.workspace_id,
        section_id: req.section_id,
    })?;

    Ok(Json(ApiResponse::success(project)))
}
