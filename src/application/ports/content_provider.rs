//! Content Provider Port - 生成式内容服务抽象
//!
//! 定义大纲、章节正文（流式）与插图生成的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::project::{GenerationConfig, SectionDraft};

/// 错误分类
///
/// 编排器只根据 kind 判断是否终止整次运行，不检查错误消息内容
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    /// 缺少访问凭证（在任何网络请求之前检测）
    CredentialMissing,
    /// 服务调用失败（网络、HTTP 状态、内容被拦截等）
    ProviderError,
    /// 响应无法解析为预期结构
    ParseError,
}

impl ProviderErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderErrorKind::CredentialMissing => "credential_missing",
            ProviderErrorKind::ProviderError => "provider_error",
            ProviderErrorKind::ParseError => "parse_error",
        }
    }
}

/// 内容服务错误
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn credential_missing(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::CredentialMissing,
            message: message.into(),
        }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::ProviderError,
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::ParseError,
            message: message.into(),
        }
    }

    pub fn is_credential_missing(&self) -> bool {
        self.kind == ProviderErrorKind::CredentialMissing
    }
}

/// 大纲生成结果
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutlineDraft {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub sections: Vec<SectionDraft>,
}

/// 章节正文生成请求
#[derive(Debug, Clone)]
pub struct SectionTextRequest {
    pub section_title: String,
    pub section_description: String,
    pub project_title: String,
    pub config: GenerationConfig,
    /// 上一章节的描述，作为衔接上下文（第一章为空）
    pub previous_context: Option<String>,
}

/// 图片生成请求
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub prompt: String,
    pub aspect_ratio: String,
}

/// 生成的图片
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// 按到达顺序产出的文本片段流，可能在中途失败
pub type TextStream = BoxStream<'static, Result<String, ProviderError>>;

/// Content Provider Port
///
/// 外部生成式内容服务的抽象接口
#[async_trait]
pub trait ContentProviderPort: Send + Sync {
    /// 生成标题与章节大纲（单次请求）
    async fn synthesize_outline(
        &self,
        config: &GenerationConfig,
    ) -> Result<OutlineDraft, ProviderError>;

    /// 打开章节正文的流式生成
    async fn stream_section_text(
        &self,
        request: SectionTextRequest,
    ) -> Result<TextStream, ProviderError>;

    /// 生成单张插图
    async fn synthesize_image(&self, request: ImageRequest)
        -> Result<GeneratedImage, ProviderError>;

    /// 检查服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
