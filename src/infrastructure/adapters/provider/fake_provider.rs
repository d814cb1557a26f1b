//! Fake Content Provider - 离线内容服务
//!
//! 不调用任何外部服务，按配置返回确定性的大纲、正文片段和纯色 PNG

use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use image::{ImageBuffer, ImageFormat, Rgb};
use std::io::Cursor;
use std::time::Duration;

use crate::application::ports::{
    ContentProviderPort, GeneratedImage, ImageRequest, OutlineDraft, ProviderError,
    SectionTextRequest, TextStream,
};
use crate::domain::project::{GenerationConfig, SectionDraft};

/// Fake Provider 配置
#[derive(Debug, Clone, Default)]
pub struct FakeContentProviderConfig {
    /// 固定章节数，None 时使用 GenerationConfig 中的 section_count
    pub section_count: Option<usize>,
    /// 每个正文片段之间的模拟延迟（毫秒）
    pub fragment_delay_ms: u64,
}

/// Fake Content Provider
pub struct FakeContentProvider {
    config: FakeContentProviderConfig,
}

impl FakeContentProvider {
    pub fn new(config: FakeContentProviderConfig) -> Self {
        tracing::info!(
            section_count = ?config.section_count,
            fragment_delay_ms = config.fragment_delay_ms,
            "FakeContentProvider initialized"
        );
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(FakeContentProviderConfig::default())
    }
}

/// 按宽高比选择图片尺寸
fn image_dimensions(aspect_ratio: &str) -> (u32, u32) {
    match aspect_ratio {
        "3:4" => (96, 128),
        "16:9" => (160, 90),
        _ => (128, 96),
    }
}

/// 由提示词决定颜色，保证同一提示词输出相同
fn prompt_color(prompt: &str) -> Rgb<u8> {
    let hash = prompt
        .bytes()
        .fold(0x811c_9dc5_u32, |acc, b| (acc ^ b as u32).wrapping_mul(0x0100_0193));
    Rgb([
        (hash >> 16) as u8 | 0x40,
        (hash >> 8) as u8 | 0x40,
        hash as u8 | 0x40,
    ])
}

fn render_png(width: u32, height: u32, color: Rgb<u8>) -> Result<Vec<u8>, ProviderError> {
    let buffer = ImageBuffer::from_pixel(width, height, color);
    let mut bytes = Vec::new();
    buffer
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| ProviderError::provider(format!("Failed to encode image: {}", e)))?;
    Ok(bytes)
}

#[async_trait]
impl ContentProviderPort for FakeContentProvider {
    async fn synthesize_outline(
        &self,
        config: &GenerationConfig,
    ) -> Result<OutlineDraft, ProviderError> {
        let count = self
            .config
            .section_count
            .unwrap_or(config.section_count.value() as usize);
        let topic = config.topic.trim();

        let sections = (1..=count)
            .map(|i| SectionDraft {
                title: format!("{} part {}", topic, i),
                description: format!("Covers aspect {} of {}.", i, topic),
            })
            .collect();

        Ok(OutlineDraft {
            title: Some(format!("{}: An Illustrated Guide", topic)),
            sections,
        })
    }

    async fn stream_section_text(
        &self,
        request: SectionTextRequest,
    ) -> Result<TextStream, ProviderError> {
        let mut fragments = vec![
            format!("## {}\n\n", request.section_title),
            format!("{} ", request.section_description),
            format!(
                "This part of \"{}\" is written for {} readers.",
                request.project_title,
                request.config.tone.as_str()
            ),
        ];
        if let Some(previous) = request.previous_context.filter(|p| !p.is_empty()) {
            fragments.push(format!(" It builds on: {}", previous));
        }

        let delay = Duration::from_millis(self.config.fragment_delay_ms);
        let stream = stream::iter(fragments).then(move |fragment| async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Ok(fragment)
        });
        Ok(stream.boxed())
    }

    async fn synthesize_image(
        &self,
        request: ImageRequest,
    ) -> Result<GeneratedImage, ProviderError> {
        let (width, height) = image_dimensions(&request.aspect_ratio);
        let bytes = render_png(width, height, prompt_color(&request.prompt))?;
        Ok(GeneratedImage {
            bytes,
            mime_type: "image/png".to_string(),
        })
    }
}
