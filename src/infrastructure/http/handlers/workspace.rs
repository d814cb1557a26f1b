//! Workspace Handlers

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::application::{CloseWorkspaceCommand, CreateWorkspaceCommand};
use crate::infrastructure::http::dto::{ApiResponse, Empty, WorkspaceRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreateWorkspaceResponseDto {
    pub workspace_id: String,
}

/// 创建工作区
///
/// POST /api/workspace/create
pub async fn create_workspace(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<CreateWorkspaceResponseDto>>, ApiError> {
    let response = state
        .create_workspace_handler
        .handle(CreateWorkspaceCommand)?;

    tracing::info!(workspace_id = %response.workspace_id, "Workspace created");

    Ok(Json(ApiResponse::success(CreateWorkspaceResponseDto {
        workspace_id: response.workspace_id,
    })))
}

/// 关闭工作区
///
/// POST /api/workspace/close
pub async fn close_workspace(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WorkspaceRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state.close_workspace_handler.handle(CloseWorkspaceCommand {
        workspace_id: req.workspace_id,
    })?;

    Ok(Json(ApiResponse::ok()))
}
