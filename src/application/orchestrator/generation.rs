//! Phase C - 全量生成（可续跑）
//!
//! 步骤总数 = 1（封面）+ 2 × 章节数（正文 + 插图）。
//! 章节严格按文档顺序串行生成：每章正文以前一章的描述作为衔接上下文。
//! 单步的服务错误降级为日志并使用兜底值，只有缺少凭证会终止整次运行。

use futures_util::StreamExt;

use crate::application::ports::{
    ImageRequest, ProviderError, RunFailure, SectionTextRequest,
};
use crate::domain::project::{ImageRef, Project};
use crate::domain::run::{RunProgress, RunState};

use super::prompts::{cover_prompt, section_prompt};
use super::{GenerationOrchestrator, RunError};

/// 正文生成失败且没有任何内容时写入的占位文本
pub const TEXT_FAILURE_PLACEHOLDER: &str = "*Content generation failed for this section.*";

/// 一次运行的结果
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub project: Project,
    pub progress: RunProgress,
}

impl GenerationOrchestrator {
    /// 开始或继续生成
    ///
    /// 已完成（done + 正文 + 插图）的章节直接跳过；
    /// 停留在 writing / illustrating 的章节从头重新生成
    pub async fn run_generation(&self, workspace_id: &str) -> Result<RunOutcome, RunError> {
        let mut project = self.ctx.workspaces.begin_generation(workspace_id)?;
        self.ctx
            .publisher
            .publish_run_state(workspace_id, RunState::Generating, None);

        let mut progress = RunProgress::for_sections(project.section_count());
        progress.set_message("Starting generation");
        self.publish_progress(workspace_id, &progress);

        tracing::info!(
            workspace_id = %workspace_id,
            sections = project.section_count(),
            steps_total = progress.steps_total,
            "Generation run started"
        );

        match self.generate(workspace_id, &mut project, &mut progress).await {
            Ok(()) => {
                progress.set_message("Generation complete");
                self.publish_progress(workspace_id, &progress);
                self.publish_run_state(workspace_id, RunState::Completed, None);
                tracing::info!(
                    workspace_id = %workspace_id,
                    steps_completed = progress.steps_completed,
                    "Generation run completed"
                );
                Ok(RunOutcome { project, progress })
            }
            Err(err) => {
                tracing::error!(
                    workspace_id = %workspace_id,
                    kind = err.kind.as_str(),
                    error = %err,
                    "Generation run failed"
                );
                progress.set_message(format!("Generation failed: {}", err));
                self.publish_progress(workspace_id, &progress);
                self.publish_run_state(
                    workspace_id,
                    RunState::Failed,
                    Some(RunFailure {
                        kind: err.kind,
                        message: err.message.clone(),
                    }),
                );
                Err(RunError::Aborted(err))
            }
        }
    }

    async fn generate(
        &self,
        workspace_id: &str,
        project: &mut Project,
        progress: &mut RunProgress,
    ) -> Result<(), ProviderError> {
        self.cover_step(workspace_id, project, progress).await?;

        for index in 0..project.section_count() {
            self.section_step(workspace_id, project, progress, index)
                .await?;
        }

        Ok(())
    }

    async fn cover_step(
        &self,
        workspace_id: &str,
        project: &mut Project,
        progress: &mut RunProgress,
    ) -> Result<(), ProviderError> {
        if project.cover().is_none() {
            progress.set_message("Designing cover");
            self.publish_progress(workspace_id, progress);

            let request = ImageRequest {
                prompt: cover_prompt(project),
                aspect_ratio: project.config().format.cover_aspect_ratio().to_string(),
            };

            match self.ctx.provider.synthesize_image(request).await {
                Ok(image) => {
                    project.set_cover(ImageRef::from_bytes(&image.mime_type, &image.bytes));
                    self.publish_project(workspace_id, project);
                }
                Err(e) if e.is_credential_missing() => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        workspace_id = %workspace_id,
                        error = %e,
                        "Cover generation failed, continuing without cover"
                    );
                }
            }
        } else {
            tracing::debug!(workspace_id = %workspace_id, "Cover already present, skipping");
        }

        progress.advance(1);
        self.publish_progress(workspace_id, progress);
        Ok(())
    }

    async fn section_step(
        &self,
        workspace_id: &str,
        project: &mut Project,
        progress: &mut RunProgress,
        index: usize,
    ) -> Result<(), ProviderError> {
        let number = index + 1;
        let section = &project.sections()[index];

        if section.is_complete() {
            tracing::debug!(
                workspace_id = %workspace_id,
                section_id = %section.id(),
                "Section already done, skipping"
            );
            progress.advance(2);
            self.publish_progress(workspace_id, progress);
            return Ok(());
        }

        let section_id = section.id();
        let section_title = section.title().to_string();
        let request = SectionTextRequest {
            section_title: section_title.clone(),
            section_description: section.description().to_string(),
            project_title: project.title().to_string(),
            config: project.config().clone(),
            previous_context: index
                .checked_sub(1)
                .map(|prev| project.sections()[prev].description().to_string()),
        };

        // 正文
        project.sections_mut()[index].begin_writing();
        progress.set_message(format!("Writing section {}: {}", number, section_title));
        self.publish_project(workspace_id, project);
        self.publish_progress(workspace_id, progress);

        self.write_section(workspace_id, project, index, request)
            .await?;
        progress.advance(1);

        // 插图
        project.sections_mut()[index].begin_illustrating();
        progress.set_message(format!("Illustrating section {}: {}", number, section_title));
        self.publish_project(workspace_id, project);
        self.publish_progress(workspace_id, progress);

        let request = ImageRequest {
            prompt: section_prompt(&section_title, project.config()),
            aspect_ratio: project
                .config()
                .format
                .illustration_aspect_ratio()
                .to_string(),
        };
        let illustration = match self.ctx.provider.synthesize_image(request).await {
            Ok(image) => Some(ImageRef::from_bytes(&image.mime_type, &image.bytes)),
            Err(e) if e.is_credential_missing() => return Err(e),
            Err(e) => {
                tracing::warn!(
                    workspace_id = %workspace_id,
                    section_id = %section_id,
                    error = %e,
                    "Illustration failed, section finished without image"
                );
                None
            }
        };

        project.sections_mut()[index].finish(illustration);
        progress.advance(1);
        self.publish_project(workspace_id, project);
        self.publish_progress(workspace_id, progress);

        tracing::info!(
            workspace_id = %workspace_id,
            section_id = %section_id,
            number = number,
            content_len = project.sections()[index].content().len(),
            "Section done"
        );
        Ok(())
    }

    /// 逐片段追加正文并发布快照
    ///
    /// 流中途失败时保留已有内容；没有任何内容时写入占位文本
    async fn write_section(
        &self,
        workspace_id: &str,
        project: &mut Project,
        index: usize,
        request: SectionTextRequest,
    ) -> Result<(), ProviderError> {
        let section_id = project.sections()[index].id();

        let mut stream = match self.ctx.provider.stream_section_text(request).await {
            Ok(stream) => Some(stream),
            Err(e) if e.is_credential_missing() => return Err(e),
            Err(e) => {
                tracing::warn!(
                    workspace_id = %workspace_id,
                    section_id = %section_id,
                    error = %e,
                    "Failed to open text stream"
                );
                None
            }
        };

        let mut failed = stream.is_none();
        if let Some(stream) = stream.as_mut() {
            while let Some(item) = stream.next().await {
                match item {
                    Ok(fragment) => {
                        if fragment.is_empty() {
                            continue;
                        }
                        project.sections_mut()[index].append_content(&fragment);
                        self.publish_project(workspace_id, project);
                    }
                    Err(e) if e.is_credential_missing() => return Err(e),
                    Err(e) => {
                        tracing::warn!(
                            workspace_id = %workspace_id,
                            section_id = %section_id,
                            error = %e,
                            "Text stream failed, keeping partial content"
                        );
                        failed = true;
                        break;
                    }
                }
            }
        }

        if failed
            && project.sections_mut()[index].fill_placeholder_if_empty(TEXT_FAILURE_PLACEHOLDER)
        {
            self.publish_project(workspace_id, project);
        }

        Ok(())
    }
}
