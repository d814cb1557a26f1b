//! Snapshot Publisher Port - 增量状态发布
//!
//! 编排器每次修改 Project / 进度 / 运行状态后调用，供展示层实时观察

use super::RunFailure;
use crate::domain::project::Project;
use crate::domain::run::{RunProgress, RunState};

pub trait SnapshotPublisherPort: Send + Sync {
    /// 发布 Project 快照
    fn publish_project(&self, workspace_id: &str, project: &Project);

    /// 发布进度
    fn publish_progress(&self, workspace_id: &str, progress: &RunProgress);

    /// 发布运行状态变更
    fn publish_run_state(&self, workspace_id: &str, state: RunState, failure: Option<&RunFailure>);
}
