//! Phase A - 大纲生成

use crate::application::ports::{OutlineDraft, ProviderErrorKind, RunFailure};
use crate::domain::project::{GenerationConfig, Project, ProjectError, SectionDraft};
use crate::domain::run::RunState;

use super::{GenerationOrchestrator, OutlineError};

impl GenerationOrchestrator {
    /// 生成大纲并替换工作区中的 Project
    ///
    /// 成功: outlining → reviewing
    /// 失败: outlining → idle（缺少凭证时为 failed），原 Project 保持不变
    pub async fn synthesize_outline(
        &self,
        workspace_id: &str,
        config: GenerationConfig,
    ) -> Result<Project, OutlineError> {
        self.ctx.workspaces.begin_outline(workspace_id)?;
        self.ctx
            .publisher
            .publish_run_state(workspace_id, RunState::Outlining, None);

        tracing::info!(
            workspace_id = %workspace_id,
            topic = %config.topic,
            section_count = config.section_count.value(),
            format = config.format.as_str(),
            "Synthesizing outline"
        );

        match self.build_project(config).await {
            Ok(project) => {
                self.publish_project(workspace_id, &project);
                self.publish_run_state(workspace_id, RunState::Reviewing, None);
                tracing::info!(
                    workspace_id = %workspace_id,
                    title = %project.title(),
                    sections = project.section_count(),
                    "Outline ready for review"
                );
                Ok(project)
            }
            Err(err) => {
                let kind = err.kind();
                let next = if kind == ProviderErrorKind::CredentialMissing {
                    RunState::Failed
                } else {
                    RunState::Idle
                };
                tracing::error!(workspace_id = %workspace_id, error = %err, "Outline synthesis failed");
                self.publish_run_state(
                    workspace_id,
                    next,
                    Some(RunFailure {
                        kind,
                        message: err.to_string(),
                    }),
                );
                Err(err)
            }
        }
    }

    async fn build_project(&self, config: GenerationConfig) -> Result<Project, OutlineError> {
        let OutlineDraft { title, sections } = self
            .ctx
            .provider
            .synthesize_outline(&config)
            .await
            .map_err(OutlineError::Provider)?;

        if sections.iter().any(|s| s.title.trim().is_empty()) {
            return Err(OutlineError::Malformed(
                "section without a title".to_string(),
            ));
        }

        let drafts = sections
            .into_iter()
            .map(|s| SectionDraft {
                title: s.title.trim().to_string(),
                description: s.description.trim().to_string(),
            })
            .collect();

        Project::from_outline(config, title.as_deref(), drafts).map_err(|e| match e {
            ProjectError::EmptyOutline => {
                OutlineError::Malformed("outline contains no sections".to_string())
            }
            other => OutlineError::Malformed(other.to_string()),
        })
    }
}
