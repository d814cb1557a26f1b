//! Generation Worker - Background Generation Run Processor

use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};

use crate::application::orchestrator::{GenerationOrchestrator, RunError};
use crate::application::ports::{ProviderErrorKind, RunFailure, WorkspaceManagerPort};
use crate::domain::run::RunState;

/// Worker 配置
#[derive(Debug, Clone)]
pub struct GenerationWorkerConfig {
    /// 跨工作区的最大并发运行数（同一运行内的章节始终顺序执行）
    pub max_concurrent_runs: usize,
}

impl Default for GenerationWorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_runs: 2,
        }
    }
}

/// 生成 Worker
///
/// 从队列消费 workspace_id，对每个工作区执行一次生成运行（新运行或续跑）
pub struct GenerationWorker {
    config: GenerationWorkerConfig,
    queue_receiver: mpsc::Receiver<String>,
    orchestrator: GenerationOrchestrator,
    workspaces: Arc<dyn WorkspaceManagerPort>,
}

impl GenerationWorker {
    pub fn new(
        config: GenerationWorkerConfig,
        queue_receiver: mpsc::Receiver<String>,
        orchestrator: GenerationOrchestrator,
        workspaces: Arc<dyn WorkspaceManagerPort>,
    ) -> Self {
        Self {
            config,
            queue_receiver,
            orchestrator,
            workspaces,
        }
    }

    /// 启动 Worker
    pub async fn run(mut self) {
        tracing::info!(
            max_concurrent_runs = self.config.max_concurrent_runs,
            "GenerationWorker started"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_runs.max(1)));

        while let Some(workspace_id) = self.queue_receiver.recv().await {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to acquire semaphore permit");
                    continue;
                }
            };

            if !self.workspaces.is_valid(&workspace_id) {
                tracing::debug!(workspace_id = %workspace_id, "Workspace closed, skipping");
                continue;
            }

            let orchestrator = self.orchestrator.clone();
            tokio::spawn(async move {
                let _permit = permit;
                let run = tokio::spawn({
                    let orchestrator = orchestrator.clone();
                    let workspace_id = workspace_id.clone();
                    async move { Self::process_run(&workspace_id, &orchestrator).await }
                });
                if let Err(e) = run.await {
                    Self::recover_crashed_run(&workspace_id, &orchestrator, &e.to_string());
                }
            });
        }

        tracing::info!("GenerationWorker stopped");
    }

    /// 执行单次运行
    async fn process_run(workspace_id: &str, orchestrator: &GenerationOrchestrator) {
        match orchestrator.run_generation(workspace_id).await {
            Ok(outcome) => {
                tracing::info!(
                    workspace_id = %workspace_id,
                    steps_completed = outcome.progress.steps_completed,
                    steps_total = outcome.progress.steps_total,
                    "Generation run finished"
                );
            }
            Err(RunError::Aborted(e)) => {
                tracing::error!(
                    workspace_id = %workspace_id,
                    kind = e.kind.as_str(),
                    error = %e,
                    "Generation run aborted"
                );
            }
            Err(RunError::Workspace(e)) => {
                // 重复入队或状态已变化
                tracing::warn!(workspace_id = %workspace_id, error = %e, "Generation run not started");
            }
        }
    }

    /// 运行任务异常退出时把工作区从 generating 释放为 failed，
    /// 否则该工作区无法再编辑、关闭或续跑
    fn recover_crashed_run(workspace_id: &str, orchestrator: &GenerationOrchestrator, reason: &str) {
        tracing::error!(workspace_id = %workspace_id, reason = %reason, "Generation run crashed");

        let failure = RunFailure {
            kind: ProviderErrorKind::ProviderError,
            message: format!("Generation run crashed: {}", reason),
        };
        let ctx = orchestrator.context();
        ctx.publisher
            .publish_run_state(workspace_id, RunState::Failed, Some(&failure));
        if let Err(e) = ctx
            .workspaces
            .set_run_state(workspace_id, RunState::Failed, Some(failure))
        {
            tracing::warn!(workspace_id = %workspace_id, error = %e, "Failed to release crashed run");
        }
    }
}
