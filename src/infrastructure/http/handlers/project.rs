//! Project Handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::{GetProject, GetRunStatus, RenameProjectCommand, RunFailure};
use crate::domain::project::Project;
use crate::domain::run::{RunProgress, RunState};
use crate::infrastructure::http::dto::{ApiResponse, WorkspaceRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

// ============================================================================
// Request/Response DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ProjectResponseDto {
    /// 尚未生成大纲时为 null
    pub project: Option<Project>,
}

#[derive(Debug, Deserialize)]
pub struct RenameProjectRequest {
    pub workspace_id: String,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct RunStatusResponseDto {
    pub state: RunState,
    pub busy: bool,
    pub progress: Option<RunProgress>,
    pub last_failure: Option<RunFailure>,
    pub needs_credential: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// 获取当前 Project 快照
///
/// POST /api/project/get
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WorkspaceRequest>,
) -> Result<Json<ApiResponse<ProjectResponseDto>>, ApiError> {
    let project = state.get_project_handler.handle(GetProject {
        workspace_id: req.workspace_id,
    })?;

    Ok(Json(ApiResponse::success(ProjectResponseDto { project })))
}

/// 修改项目标题
///
/// POST /api/project/rename
pub async fn rename_project(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RenameProjectRequest>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    let project = state.rename_project_handler.handle(RenameProjectCommand {
        workspace_id: req.workspace_id,
        title: req.title,
    })?;

    Ok(Json(ApiResponse::success(project)))
}

/// 查询运行状态
///
/// POST /api/run/status
pub async fn run_status(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WorkspaceRequest>,
) -> Result<Json<ApiResponse<RunStatusResponseDto>>, ApiError> {
    let status = state.get_run_status_handler.handle(GetRunStatus {
        workspace_id: req.workspace_id,
    })?;

    Ok(Json(ApiResponse::success(RunStatusResponseDto {
        busy: status.state.is_busy(),
        state: status.state,
        progress: status.progress,
        last_failure: status.last_failure,
        needs_credential: status.needs_credential,
    })))
}
