//! WebSocket Handler - 工作区事件推送

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::infrastructure::events::WsEvent;
use crate::infrastructure::http::state::AppState;

/// 工作区 WebSocket 连接处理
pub async fn workspace_websocket_handler(
    ws: WebSocketUpgrade,
    Path(workspace_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_workspace_socket(socket, workspace_id, state))
}

/// 连接建立时的初始快照
fn initial_events(state: &AppState, workspace_id: &str) -> Vec<WsEvent> {
    let Ok(workspace) = state.workspaces.get(workspace_id) else {
        return Vec::new();
    };

    let mut events = vec![WsEvent::RunStateChanged {
        workspace_id: workspace_id.to_string(),
        state: workspace.run_state,
        error: workspace.last_failure.as_ref().map(|f| f.message.clone()),
        error_kind: workspace
            .last_failure
            .as_ref()
            .map(|f| f.kind.as_str().to_string()),
        needs_credential: workspace
            .last_failure
            .as_ref()
            .map(|f| f.needs_credential())
            .unwrap_or(false),
    }];
    if let Some(project) = workspace.project {
        events.push(WsEvent::ProjectUpdated {
            workspace_id: workspace_id.to_string(),
            project,
        });
    }
    if let Some(progress) = workspace.progress {
        events.push(WsEvent::ProgressUpdated {
            workspace_id: workspace_id.to_string(),
            progress,
        });
    }
    events
}

fn to_message(event: &WsEvent) -> Option<Message> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Message::Text(json)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize event");
            None
        }
    }
}

async fn handle_workspace_socket(socket: WebSocket, workspace_id: String, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // 验证工作区存在
    if !state.workspaces.is_valid(&workspace_id) {
        tracing::warn!(workspace_id = %workspace_id, "WebSocket connection rejected: invalid workspace");
        let _ = sender.close().await;
        return;
    }

    // 先注册再取快照，避免丢失两者之间的事件
    let mut event_rx = state.event_publisher.register_workspace(&workspace_id);
    let initial = initial_events(&state, &workspace_id);

    tracing::info!(workspace_id = %workspace_id, "WebSocket connected");

    let workspace_id_for_forward = workspace_id.clone();
    let workspace_id_for_receive = workspace_id.clone();

    // 事件转发任务
    let mut forward_task = tokio::spawn(async move {
        for event in &initial {
            if let Some(msg) = to_message(event) {
                if sender.send(msg).await.is_err() {
                    return;
                }
            }
        }

        loop {
            let event = match event_rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    // 快照是全量的，丢失中间片段不影响最终结果
                    tracing::debug!(
                        workspace_id = %workspace_id_for_forward,
                        skipped = skipped,
                        "WebSocket receiver lagged"
                    );
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            let closing = matches!(event, WsEvent::WorkspaceClosed { .. });

            let Some(msg) = to_message(&event) else {
                continue;
            };
            if let Err(e) = sender.send(msg).await {
                tracing::debug!(
                    workspace_id = %workspace_id_for_forward,
                    error = %e,
                    "Failed to send WebSocket message"
                );
                break;
            }
            if closing {
                let _ = sender.close().await;
                break;
            }
        }
    });

    // 接收客户端消息（心跳）
    let workspaces = state.workspaces.clone();
    let mut receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::info!(workspace_id = %workspace_id_for_receive, "WebSocket closed by client");
                    break;
                }
                Err(e) => {
                    tracing::debug!(workspace_id = %workspace_id_for_receive, error = %e, "WebSocket error");
                    break;
                }
                _ => {
                    workspaces.touch(&workspace_id_for_receive);
                }
            }
        }
    });

    // 等待任一任务完成
    tokio::select! {
        _ = &mut forward_task => receive_task.abort(),
        _ = &mut receive_task => forward_task.abort(),
    }

    // 清理
    state.event_publisher.unregister_workspace(&workspace_id);
    tracing::info!(workspace_id = %workspace_id, "WebSocket disconnected");
}
