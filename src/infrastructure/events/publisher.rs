//! Event Publisher Implementation
//!
//! WebSocket 事件推送实现

use crate::application::ports::{RunFailure, SnapshotPublisherPort};
use crate::domain::project::Project;
use crate::domain::run::{RunProgress, RunState};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

/// WebSocket 事件类型
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum WsEvent {
    /// Project 快照
    ProjectUpdated {
        workspace_id: String,
        project: Project,
    },
    /// 进度变更
    ProgressUpdated {
        workspace_id: String,
        progress: RunProgress,
    },
    /// 运行状态变更
    RunStateChanged {
        workspace_id: String,
        state: RunState,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error_kind: Option<String>,
        /// 展示层据此提示用户补充凭证
        needs_credential: bool,
    },
    /// 工作区关闭
    WorkspaceClosed {
        workspace_id: String,
        reason: String,
    },
}

/// 事件发布器
pub struct EventPublisher {
    /// workspace_id -> broadcast sender
    workspace_channels: DashMap<String, broadcast::Sender<WsEvent>>,
    capacity: usize,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// 流式正文每个片段都会产生一个快照，容量需要足够大
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            workspace_channels: DashMap::new(),
            capacity,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅工作区的事件通道
    pub fn register_workspace(&self, workspace_id: &str) -> broadcast::Receiver<WsEvent> {
        if let Some(sender) = self.workspace_channels.get(workspace_id) {
            return sender.subscribe();
        }

        let (tx, rx) = broadcast::channel(self.capacity);
        self.workspace_channels.insert(workspace_id.to_string(), tx);
        rx
    }

    /// 没有剩余订阅者时移除通道
    pub fn unregister_workspace(&self, workspace_id: &str) {
        self.workspace_channels
            .remove_if(workspace_id, |_, sender| sender.receiver_count() == 0);
    }

    /// 发布工作区关闭事件
    pub fn publish_workspace_closed(&self, workspace_id: &str, reason: &str) {
        self.publish_to_workspace(
            workspace_id,
            WsEvent::WorkspaceClosed {
                workspace_id: workspace_id.to_string(),
                reason: reason.to_string(),
            },
        );
        self.workspace_channels.remove(workspace_id);
    }

    /// 发布事件到指定工作区
    fn publish_to_workspace(&self, workspace_id: &str, event: WsEvent) {
        if let Some(sender) = self.workspace_channels.get(workspace_id) {
            if let Err(e) = sender.send(event) {
                tracing::debug!(
                    workspace_id = %workspace_id,
                    error = %e,
                    "Failed to publish event (no receivers)"
                );
            }
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotPublisherPort for EventPublisher {
    fn publish_project(&self, workspace_id: &str, project: &Project) {
        self.publish_to_workspace(
            workspace_id,
            WsEvent::ProjectUpdated {
                workspace_id: workspace_id.to_string(),
                project: project.clone(),
            },
        );
    }

    fn publish_progress(&self, workspace_id: &str, progress: &RunProgress) {
        self.publish_to_workspace(
            workspace_id,
            WsEvent::ProgressUpdated {
                workspace_id: workspace_id.to_string(),
                progress: progress.clone(),
            },
        );
    }

    fn publish_run_state(&self, workspace_id: &str, state: RunState, failure: Option<&RunFailure>) {
        self.publish_to_workspace(
            workspace_id,
            WsEvent::RunStateChanged {
                workspace_id: workspace_id.to_string(),
                state,
                error: failure.map(|f| f.message.clone()),
                error_kind: failure.map(|f| f.kind.as_str().to_string()),
                needs_credential: failure.is_some_and(|f| f.needs_credential()),
            },
        );
    }
}
