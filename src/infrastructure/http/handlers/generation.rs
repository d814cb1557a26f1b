//! Generation Handlers - 大纲生成与正文/插图运行

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::{StartGenerationCommand, StartOutlineCommand};
use crate::domain::project::{GenerationConfig, Project};
use crate::infrastructure::http::dto::{ApiResponse, WorkspaceRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// Request/Response DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartOutlineRequest {
    pub workspace_id: String,
    pub config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub struct StartGenerationResponseDto {
    pub workspace_id: String,
    pub completed_sections: usize,
    pub total_sections: usize,
    /// 是否为续跑
    pub resumed: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// 生成大纲
///
/// POST /api/outline/start
///
/// 同步等待大纲返回，成功后工作区进入 reviewing
pub async fn start_outline(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartOutlineRequest>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    let project = state
        .start_outline_handler
        .handle(StartOutlineCommand {
            workspace_id: req.workspace_id,
            config: req.config,
        })
        .await?;

    Ok(Json(ApiResponse::success(project)))
}

/// 开始（或续跑）生成
///
/// POST /api/generation/start
///
/// 运行在后台进行，进度通过 WebSocket 推送
pub async fn start_generation(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WorkspaceRequest>,
) -> Result<Json<ApiResponse<StartGenerationResponseDto>>, ApiError> {
    let response = state
        .start_generation_handler
        .handle(StartGenerationCommand {
            workspace_id: req.workspace_id,
        })?;

    Ok(Json(ApiResponse::success(StartGenerationResponseDto {
        resumed: response.completed_sections > 0,
        workspace_id: response.workspace_id,
        completed_sections: response.completed_sections,
        total_sections: response.total_sections,
    })))
}
