//! 编排器测试辅助：脚本化的内容服务与记录快照的发布器

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};

use super::{GenerationContext, GenerationOrchestrator};
use crate::application::ports::{
    ContentProviderPort, GeneratedImage, ImageRequest, OutlineDraft, ProviderError, RunFailure,
    SectionTextRequest, SnapshotPublisherPort, TextStream, Workspace, WorkspaceManagerPort,
};
use crate::domain::project::{GenerationConfig, Project, SectionDraft, SectionId, SectionStatus};
use crate::domain::run::{RunProgress, RunState};
use crate::infrastructure::memory::InMemoryWorkspaceManager;

pub fn outline(title: Option<&str>, sections: usize) -> OutlineDraft {
    OutlineDraft {
        title: title.map(str::to_string),
        sections: (1..=sections)
            .map(|i| SectionDraft {
                title: format!("Section {}", i),
                description: format!("About part {}", i),
            })
            .collect(),
    }
}

#[derive(Default)]
struct ScriptState {
    outline: Option<Result<OutlineDraft, ProviderError>>,
    texts: HashMap<String, Vec<Result<String, ProviderError>>>,
    failing_images: Vec<String>,
    credential_missing: bool,
    text_requests: Vec<SectionTextRequest>,
    calls: usize,
}

/// 按脚本返回结果的内容服务
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outline(self, draft: OutlineDraft) -> Self {
        self.state.lock().unwrap().outline = Some(Ok(draft));
        self
    }

    /// 指定章节标题对应的片段序列
    pub fn with_text(self, section_title: &str, fragments: Vec<Result<String, ProviderError>>) -> Self {
        self.state
            .lock()
            .unwrap()
            .texts
            .insert(section_title.to_string(), fragments);
        self
    }

    /// 提示词包含 needle 的图片请求失败
    pub fn failing_image_for(self, needle: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_images
            .push(needle.to_string());
        self
    }

    pub fn fail_outline(&self, error: ProviderError) {
        self.state.lock().unwrap().outline = Some(Err(error));
    }

    pub fn set_credential_missing(&self, missing: bool) {
        self.state.lock().unwrap().credential_missing = missing;
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls
    }

    pub fn text_requests(&self) -> Vec<SectionTextRequest> {
        self.state.lock().unwrap().text_requests.clone()
    }

    fn enter(&self) -> Result<(), ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        if state.credential_missing {
            return Err(ProviderError::credential_missing("API key is not configured"));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentProviderPort for ScriptedProvider {
    async fn synthesize_outline(
        &self,
        _config: &GenerationConfig,
    ) -> Result<OutlineDraft, ProviderError> {
        self.enter()?;
        self.state
            .lock()
            .unwrap()
            .outline
            .clone()
            .unwrap_or_else(|| Ok(outline(Some("Untitled"), 3)))
    }

    async fn stream_section_text(
        &self,
        request: SectionTextRequest,
    ) -> Result<TextStream, ProviderError> {
        self.enter()?;
        let mut state = self.state.lock().unwrap();
        let fragments = state
            .texts
            .get(&request.section_title)
            .cloned()
            .unwrap_or_else(|| {
                vec![
                    Ok(format!("{} body. ", request.section_title)),
                    Ok("More text.".to_string()),
                ]
            });
        state.text_requests.push(request);
        Ok(stream::iter(fragments).boxed())
    }

    async fn synthesize_image(
        &self,
        request: ImageRequest,
    ) -> Result<GeneratedImage, ProviderError> {
        self.enter()?;
        let state = self.state.lock().unwrap();
        if state
            .failing_images
            .iter()
            .any(|needle| request.prompt.contains(needle.as_str()))
        {
            return Err(ProviderError::provider("image model refused the prompt"));
        }
        Ok(GeneratedImage {
            bytes: request.prompt.into_bytes(),
            mime_type: "image/png".to_string(),
        })
    }
}

/// 记录所有发布事件的发布器
#[derive(Default)]
pub struct RecordingPublisher {
    projects: Mutex<Vec<Project>>,
    progress: Mutex<Vec<RunProgress>>,
    states: Mutex<Vec<RunState>>,
}

impl RecordingPublisher {
    /// 某章节在每个快照中的状态
    pub fn statuses_of(&self, id: SectionId) -> Vec<SectionStatus> {
        self.projects
            .lock()
            .unwrap()
            .iter()
            .filter_map(|p| p.get_section(id).map(|s| s.status()))
            .collect()
    }

    /// 某章节处于 writing 时每个快照中的正文
    pub fn contents_while_writing(&self, id: SectionId) -> Vec<String> {
        self.projects
            .lock()
            .unwrap()
            .iter()
            .filter_map(|p| p.get_section(id))
            .filter(|s| s.status() == SectionStatus::Writing)
            .map(|s| s.content().to_string())
            .collect()
    }

    pub fn states(&self) -> Vec<RunState> {
        self.states.lock().unwrap().clone()
    }

    pub fn progress_history(&self) -> Vec<RunProgress> {
        self.progress.lock().unwrap().clone()
    }
}

impl SnapshotPublisherPort for RecordingPublisher {
    fn publish_project(&self, _workspace_id: &str, project: &Project) {
        self.projects.lock().unwrap().push(project.clone());
    }

    fn publish_progress(&self, _workspace_id: &str, progress: &RunProgress) {
        self.progress.lock().unwrap().push(progress.clone());
    }

    fn publish_run_state(&self, _workspace_id: &str, state: RunState, _failure: Option<&RunFailure>) {
        self.states.lock().unwrap().push(state);
    }
}

pub struct Harness {
    pub orchestrator: GenerationOrchestrator,
    pub workspaces: Arc<InMemoryWorkspaceManager>,
    pub publisher: Arc<RecordingPublisher>,
    pub workspace_id: String,
}

pub fn harness(provider: ScriptedProvider) -> Harness {
    let workspaces = Arc::new(InMemoryWorkspaceManager::new());
    let publisher = Arc::new(RecordingPublisher::default());
    let workspace_id = workspaces.create(Workspace::new()).unwrap();

    let orchestrator = GenerationOrchestrator::new(GenerationContext {
        provider: Arc::new(provider),
        workspaces: workspaces.clone(),
        publisher: publisher.clone(),
    });

    Harness {
        orchestrator,
        workspaces,
        publisher,
        workspace_id,
    }
}
