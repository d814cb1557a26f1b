//! Project Context - Value Objects

use serde::{Deserialize, Serialize};

/// 章节唯一标识
///
/// 由 Project 内部的单调计数器分配，删除后不会复用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(u32);

impl SectionId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "section-{}", self.0)
    }
}

/// 目标章节数（3-15，仅作为对生成服务的建议）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SectionCount(u32);

impl SectionCount {
    pub const MIN: u32 = 3;
    pub const MAX: u32 = 15;

    pub fn new(count: u32) -> Result<Self, String> {
        if !(Self::MIN..=Self::MAX).contains(&count) {
            return Err(format!(
                "section count must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                count
            ));
        }
        Ok(Self(count))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl Default for SectionCount {
    fn default() -> Self {
        Self(5)
    }
}

impl TryFrom<u32> for SectionCount {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SectionCount> for u32 {
    fn from(count: SectionCount) -> Self {
        count.0
    }
}

/// 文风
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Academic,
    Playful,
    Inspirational,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Academic => "academic",
            Tone::Playful => "playful",
            Tone::Inspirational => "inspirational",
        }
    }
}

/// 插图风格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IllustrationStyle {
    Photorealistic,
    #[default]
    Illustration,
    Watercolor,
    FlatVector,
    Sketch,
    ThreeDRender,
}

impl IllustrationStyle {
    /// 用于图片提示词的风格描述
    pub fn prompt_label(&self) -> &'static str {
        match self {
            IllustrationStyle::Photorealistic => "photorealistic photograph",
            IllustrationStyle::Illustration => "detailed digital illustration",
            IllustrationStyle::Watercolor => "soft watercolor painting",
            IllustrationStyle::FlatVector => "flat vector art",
            IllustrationStyle::Sketch => "pencil sketch",
            IllustrationStyle::ThreeDRender => "3D render",
        }
    }
}

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DocumentFormat {
    #[default]
    #[serde(rename = "document")]
    Document,
    #[serde(rename = "slide-deck")]
    SlideDeck,
}

impl DocumentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Document => "document",
            DocumentFormat::SlideDeck => "slide-deck",
        }
    }

    /// 封面图宽高比
    pub fn cover_aspect_ratio(&self) -> &'static str {
        match self {
            DocumentFormat::Document => "3:4",
            DocumentFormat::SlideDeck => "16:9",
        }
    }

    /// 章节插图宽高比
    pub fn illustration_aspect_ratio(&self) -> &'static str {
        match self {
            DocumentFormat::Document => "4:3",
            DocumentFormat::SlideDeck => "16:9",
        }
    }
}

/// 生成配置（每次运行不可变）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub topic: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub audience: String,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub enable_search: bool,
    #[serde(default)]
    pub style: IllustrationStyle,
    #[serde(default)]
    pub section_count: SectionCount,
    #[serde(default)]
    pub format: DocumentFormat,
}

impl GenerationConfig {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            title: String::new(),
            author_name: String::new(),
            audience: String::new(),
            tone: Tone::default(),
            enable_search: false,
            style: IllustrationStyle::default(),
            section_count: SectionCount::default(),
            format: DocumentFormat::default(),
        }
    }
}

/// 图片句柄
///
/// 不透明引用，实际为 `data:<mime>;base64,<payload>` 形式的 data URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        use base64::Engine;
        let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self(format!("data:{};base64,{}", mime_type, payload))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 解析出 MIME 类型与原始字节
    pub fn decode(&self) -> Option<(String, Vec<u8>)> {
        use base64::Engine;
        let rest = self.0.strip_prefix("data:")?;
        let (mime, payload) = rest.split_once(";base64,")?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .ok()?;
        Some((mime.to_string(), bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_count_bounds() {
        assert!(SectionCount::new(2).is_err());
        assert!(SectionCount::new(3).is_ok());
        assert!(SectionCount::new(15).is_ok());
        assert!(SectionCount::new(16).is_err());
    }

    #[test]
    fn test_config_deserialize_labels() {
        let json = r#"{
            "topic": "Topic",
            "tone": "playful",
            "style": "flat_vector",
            "section_count": 3,
            "format": "slide-deck"
        }"#;
        let config: GenerationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.tone, Tone::Playful);
        assert_eq!(config.style, IllustrationStyle::FlatVector);
        assert_eq!(config.section_count.value(), 3);
        assert_eq!(config.format, DocumentFormat::SlideDeck);
        assert!(config.title.is_empty());
    }

    #[test]
    fn test_config_rejects_out_of_range_count() {
        let json = r#"{"topic": "Topic", "section_count": 40}"#;
        assert!(serde_json::from_str::<GenerationConfig>(json).is_err());
    }

    #[test]
    fn test_image_ref_data_url() {
        let image = ImageRef::from_bytes("image/png", &[1, 2, 3]);
        assert!(image.as_str().starts_with("data:image/png;base64,"));
        let (mime, bytes) = image.decode().unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, vec![1, 2, 3]);
    }
}
