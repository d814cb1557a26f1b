//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                 GET   健康检查
//! - /api/workspace/create     POST  创建工作区
//! - /api/workspace/close      POST  关闭工作区
//! - /api/outline/start        POST  生成大纲（同步返回 Project）
//! - /api/generation/start     POST  开始或续跑生成（后台运行，通过 WS 推送）
//! - /api/project/get          POST  获取 Project 快照
//! - /api/project/rename       POST  修改标题
//! - /api/section/edit         POST  编辑章节字段
//! - /api/section/add          POST  追加章节
//! - /api/section/remove       POST  删除章节
//! - /api/run/status           POST  查询运行状态
//! - /api/export/geometry      GET   导出页面像素尺寸
//! - /api/export/paginate      POST  分页导出
//! - /ws/workspace/{id}        WS    工作区事件（快照 / 进度 / 状态）

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route(
            "/ws/workspace/:workspace_id",
            get(handlers::workspace_websocket_handler),
        )
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/workspace", workspace_routes())
        .route("/outline/start", post(handlers::start_outline))
        .route("/generation/start", post(handlers::start_generation))
        .nest("/project", project_routes())
        .nest("/section", section_routes())
        .route("/run/status", post(handlers::run_status))
        .nest("/export", export_routes())
}

/// Workspace 路由
fn workspace_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(handlers::create_workspace))
        .route("/close", post(handlers::close_workspace))
}

/// Project 路由
fn project_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/get", post(handlers::get_project))
        .route("/rename", post(handlers::rename_project))
}

/// Section 路由
fn section_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/edit", post(handlers::edit_section))
        .route("/add", post(handlers::add_section))
        .route("/remove", post(handlers::remove_section))
}

/// Export 路由
fn export_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/geometry", get(handlers::export_geometry))
        .route("/paginate", post(handlers::paginate_export))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{GenerationContext, GenerationOrchestrator};
    use crate::config::ExportConfig;
    use crate::infrastructure::adapters::{
        FakeContentProvider, FakeContentProviderConfig, RasterPageRenderer,
    };
    use crate::infrastructure::events::EventPublisher;
    use crate::infrastructure::memory::InMemoryWorkspaceManager;
    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, Request},
    };
    use serde_json::{json, Value};
    use tokio::sync::mpsc;
    use tower::util::ServiceExt;

    fn test_app() -> (Router, mpsc::Receiver<String>) {
        let event_publisher = Arc::new(EventPublisher::new());
        let orchestrator = GenerationOrchestrator::new(GenerationContext {
            provider: Arc::new(FakeContentProvider::new(FakeContentProviderConfig {
                section_count: Some(3),
                fragment_delay_ms: 0,
            })),
            workspaces: Arc::new(InMemoryWorkspaceManager::new()),
            publisher: event_publisher.clone(),
        });
        let (tx, rx) = mpsc::channel(4);
        let state = AppState::new(
            orchestrator,
            event_publisher,
            Arc::new(RasterPageRenderer::new()),
            tx,
            ExportConfig::default(),
        );
        (create_routes().with_state(Arc::new(state)), rx)
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Value {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create_workspace(app: &Router) -> String {
        let body = call(app, "POST", "/api/workspace/create", None).await;
        assert_eq!(body["errno"], 0);
        body["data"]["workspace_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_ping() {
        let (app, _rx) = test_app();
        let body = call(&app, "GET", "/api/ping", None).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_outline_then_review_edits() {
        let (app, _rx) = test_app();
        let id = create_workspace(&app).await;

        let body = call(
            &app,
            "POST",
            "/api/outline/start",
            Some(json!({ "workspace_id": id, "config": { "topic": "Tea" } })),
        )
        .await;
        assert_eq!(body["errno"], 0);
        assert_eq!(body["data"]["sections"].as_array().unwrap().len(), 3);

        let status = call(&app, "POST", "/api/run/status", Some(json!({ "workspace_id": id }))).await;
        assert_eq!(status["data"]["state"], "reviewing");
        assert_eq!(status["data"]["busy"], false);

        let section_id = body["data"]["sections"][0]["id"].clone();
        let edited = call(
            &app,
            "POST",
            "/api/section/edit",
            Some(json!({
                "workspace_id": id,
                "section_id": section_id,
                "field": "title",
                "value": "Origins"
            })),
        )
        .await;
        assert_eq!(edited["errno"], 0);
        assert_eq!(edited["data"]["sections"][0]["title"], "Origins");

        let added = call(
            &app,
            "POST",
            "/api/section/add",
            Some(json!({ "workspace_id": id })),
        )
        .await;
        assert_eq!(added["errno"], 0);

        let project = call(&app, "POST", "/api/project/get", Some(json!({ "workspace_id": id }))).await;
        let sections = project["data"]["project"]["sections"].as_array().unwrap();
        assert_eq!(sections.len(), 4);
        assert_eq!(sections[3]["title"], "New Section");
    }

    #[tokio::test]
    async fn test_empty_topic_is_bad_request() {
        let (app, _rx) = test_app();
        let id = create_workspace(&app).await;

        let body = call(
            &app,
            "POST",
            "/api/outline/start",
            Some(json!({ "workspace_id": id, "config": { "topic": "  " } })),
        )
        .await;
        assert_eq!(body["errno"], 400);
    }

    #[tokio::test]
    async fn test_unknown_workspace_is_not_found() {
        let (app, _rx) = test_app();
        let body = call(
            &app,
            "POST",
            "/api/project/get",
            Some(json!({ "workspace_id": "missing" })),
        )
        .await;
        assert_eq!(body["errno"], 404);
    }

    #[tokio::test]
    async fn test_start_generation_enqueues_workspace() {
        let (app, mut rx) = test_app();
        let id = create_workspace(&app).await;

        // 没有大纲时不能开始
        let rejected = call(
            &app,
            "POST",
            "/api/generation/start",
            Some(json!({ "workspace_id": id })),
        )
        .await;
        assert_ne!(rejected["errno"], 0);

        call(
            &app,
            "POST",
            "/api/outline/start",
            Some(json!({ "workspace_id": id, "config": { "topic": "Tea" } })),
        )
        .await;

        let body = call(
            &app,
            "POST",
            "/api/generation/start",
            Some(json!({ "workspace_id": id })),
        )
        .await;
        assert_eq!(body["errno"], 0);
        assert_eq!(body["data"]["total_sections"], 3);
        assert_eq!(body["data"]["resumed"], false);
        assert_eq!(rx.recv().await.unwrap(), id);
    }

    #[tokio::test]
    async fn test_export_rejects_wrong_bitmap_count() {
        let (app, _rx) = test_app();
        let id = create_workspace(&app).await;
        call(
            &app,
            "POST",
            "/api/outline/start",
            Some(json!({ "workspace_id": id, "config": { "topic": "Tea" } })),
        )
        .await;

        let body = call(
            &app,
            "POST",
            "/api/export/paginate",
            Some(json!({ "workspace_id": id, "bitmaps": [] })),
        )
        .await;
        assert_eq!(body["errno"], 400);

        let invalid = call(
            &app,
            "POST",
            "/api/export/paginate",
            Some(json!({ "workspace_id": id, "bitmaps": ["***"] })),
        )
        .await;
        assert_eq!(invalid["errno"], 400);
    }

    #[tokio::test]
    async fn test_close_workspace() {
        let (app, _rx) = test_app();
        let id = create_workspace(&app).await;

        let body = call(&app, "POST", "/api/workspace/close", Some(json!({ "workspace_id": id }))).await;
        assert_eq!(body["errno"], 0);

        let body = call(&app, "POST", "/api/run/status", Some(json!({ "workspace_id": id }))).await;
        assert_eq!(body["errno"], 404);
    }
}
