//! Gemini Client - 调用 Gemini Generative Language API
//!
//! 实现 ContentProviderPort：
//! - 大纲: `models/{text_model}:generateContent`，JSON 响应 schema
//! - 正文: `models/{text_model}:streamGenerateContent?alt=sse`，逐片段推送
//! - 插图: `models/{image_model}:generateContent`，读取 `inlineData`

use async_trait::async_trait;
use base64::Engine;
use futures_util::{stream, StreamExt};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::mpsc;

use super::prompts::{outline_prompt, section_text_prompt};
use crate::application::ports::{
    ContentProviderPort, GeneratedImage, ImageRequest, OutlineDraft, ProviderError,
    SectionTextRequest, TextStream,
};
use crate::domain::project::GenerationConfig;

/// Gemini 客户端配置
#[derive(Debug, Clone)]
pub struct GeminiClientConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for GeminiClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            text_model: "gemini-2.5-flash".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            timeout_secs: 180,
        }
    }
}

impl GeminiClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

/// Gemini 客户端
pub struct GeminiClient {
    client: Client,
    config: GeminiClientConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiClientConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::provider(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// 在任何网络请求之前检查凭证
    fn api_key(&self) -> Result<&str, ProviderError> {
        self.config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ProviderError::credential_missing("Gemini API key is not configured"))
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.base_url.trim_end_matches('/'),
            model,
            method
        )
    }

    async fn post(&self, url: &str, body: &Value) -> Result<reqwest::Response, ProviderError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::provider("Gemini request timed out")
                } else if e.is_connect() {
                    ProviderError::provider(format!("Cannot connect to Gemini: {}", e))
                } else {
                    ProviderError::provider(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        Err(status_error(status, &error_text))
    }
}

fn status_error(status: StatusCode, body: &str) -> ProviderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ProviderError::credential_missing(format!("Gemini rejected the API key (HTTP {})", status))
        }
        _ => ProviderError::provider(format!("HTTP {}: {}", status, body)),
    }
}

fn outline_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "sections": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "description": { "type": "STRING" }
                    },
                    "required": ["title", "description"]
                }
            }
        },
        "required": ["title", "sections"]
    })
}

/// 拼接第一个候选结果中所有文本 part
fn candidate_text(response: &Value) -> Option<String> {
    let parts = response["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    Some(text)
}

/// 解析大纲 JSON，容忍 Markdown 代码块包裹
fn parse_outline(text: &str) -> Result<OutlineDraft, ProviderError> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str(body.trim())
        .map_err(|e| ProviderError::parse(format!("Outline response is not valid JSON: {}", e)))
}

/// 解析一行 SSE，返回其中的文本片段
///
/// 非 `data:` 行与空片段返回 None
fn parse_sse_line(line: &str) -> Option<Result<String, ProviderError>> {
    let data = line.strip_prefix("data:")?.trim_start();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }

    let json: Value = match serde_json::from_str(data) {
        Ok(json) => json,
        Err(e) => {
            return Some(Err(ProviderError::parse(format!(
                "Malformed stream chunk: {}",
                e
            ))))
        }
    };

    if let Some(message) = json["error"]["message"].as_str() {
        return Some(Err(ProviderError::provider(message.to_string())));
    }
    if let Some(reason) = json["promptFeedback"]["blockReason"].as_str() {
        return Some(Err(ProviderError::provider(format!(
            "Prompt blocked: {}",
            reason
        ))));
    }

    candidate_text(&json)
        .filter(|text| !text.is_empty())
        .map(Ok)
}

/// SSE 行缓冲
///
/// 网络分片既可能截断行，也可能截断多字节 UTF-8 字符，
/// 因此按字节缓存，只解码完整的行
#[derive(Debug, Default)]
struct SseLineBuffer {
    pending: Vec<u8>,
}

impl SseLineBuffer {
    fn extend(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
    }

    /// 取出下一整行（不含换行符）
    fn next_line(&mut self) -> Option<Result<String, ProviderError>> {
        let newline = self.pending.iter().position(|b| *b == b'\n')?;
        let mut line: Vec<u8> = self.pending.drain(..=newline).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(decode_line(line))
    }

    /// 流结束时剩余的不完整行
    fn finish(self) -> Result<String, ProviderError> {
        decode_line(self.pending)
    }
}

fn decode_line(line: Vec<u8>) -> Result<String, ProviderError> {
    String::from_utf8(line)
        .map_err(|e| ProviderError::parse(format!("Stream line is not valid UTF-8: {}", e)))
}

#[async_trait]
impl ContentProviderPort for GeminiClient {
    async fn synthesize_outline(
        &self,
        config: &GenerationConfig,
    ) -> Result<OutlineDraft, ProviderError> {
        let url = self.model_url(&self.config.text_model, "generateContent");
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": outline_prompt(config) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": outline_schema()
            }
        });

        tracing::debug!(topic = %config.topic, model = %self.config.text_model, "Requesting outline");

        let response = self.post(&url, &body).await?;
        let json: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::parse(format!("Failed to read outline response: {}", e)))?;

        let text = candidate_text(&json)
            .ok_or_else(|| ProviderError::parse("Outline response has no content"))?;
        let draft = parse_outline(&text)?;

        tracing::info!(sections = draft.sections.len(), "Outline received");
        Ok(draft)
    }

    async fn stream_section_text(
        &self,
        request: SectionTextRequest,
    ) -> Result<TextStream, ProviderError> {
        let url = format!(
            "{}?alt=sse",
            self.model_url(&self.config.text_model, "streamGenerateContent")
        );
        let mut body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": section_text_prompt(&request) }] }]
        });
        if request.config.enable_search {
            body["tools"] = json!([{ "googleSearch": {} }]);
        }

        tracing::debug!(section = %request.section_title, "Opening section text stream");

        let response = self.post(&url, &body).await?;
        let (tx, rx) = mpsc::channel::<Result<String, ProviderError>>(64);

        tokio::spawn(async move {
            let mut bytes = response.bytes_stream();
            let mut lines = SseLineBuffer::default();

            while let Some(item) = bytes.next().await {
                match item {
                    Ok(chunk) => {
                        lines.extend(&chunk);

                        while let Some(line) = lines.next_line() {
                            let fragment = match line {
                                Ok(line) => parse_sse_line(&line),
                                Err(e) => Some(Err(e)),
                            };
                            if let Some(fragment) = fragment {
                                let failed = fragment.is_err();
                                if tx.send(fragment).await.is_err() || failed {
                                    return;
                                }
                            }
                        }
                    }
                    Err(e) => {
                        let _ = tx
                            .send(Err(ProviderError::provider(format!(
                                "Stream interrupted: {}",
                                e
                            ))))
                            .await;
                        return;
                    }
                }
            }

            let fragment = match lines.finish() {
                Ok(rest) => parse_sse_line(rest.trim()),
                Err(e) => Some(Err(e)),
            };
            if let Some(fragment) = fragment {
                let _ = tx.send(fragment).await;
            }
        });

        let fragments = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        Ok(fragments.boxed())
    }

    async fn synthesize_image(
        &self,
        request: ImageRequest,
    ) -> Result<GeneratedImage, ProviderError> {
        let url = self.model_url(&self.config.image_model, "generateContent");
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": request.prompt }] }],
            "generationConfig": {
                "responseModalities": ["IMAGE"],
                "imageConfig": { "aspectRatio": request.aspect_ratio }
            }
        });

        let response = self.post(&url, &body).await?;
        let json: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::parse(format!("Failed to read image response: {}", e)))?;

        let (data, mime_type) = json["candidates"][0]["content"]["parts"]
            .as_array()
            .and_then(|parts| {
                parts.iter().find_map(|p| {
                    let inline = &p["inlineData"];
                    inline["data"]
                        .as_str()
                        .map(|data| (data, inline["mimeType"].as_str().unwrap_or("image/png")))
                })
            })
            .ok_or_else(|| ProviderError::provider("Image response contains no image data"))?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|e| ProviderError::parse(format!("Invalid image payload: {}", e)))?;
        let mime_type = mime_type.to_string();

        tracing::debug!(
            aspect_ratio = %request.aspect_ratio,
            mime_type = %mime_type,
            size = bytes.len(),
            "Image received"
        );

        Ok(GeneratedImage { bytes, mime_type })
    }

    async fn health_check(&self) -> bool {
        let Ok(api_key) = self.api_key() else {
            return false;
        };
        let url = format!("{}/models/{}", self.config.base_url.trim_end_matches('/'), self.config.text_model);

        match self
            .client
            .get(&url)
            .header("x-goog-api-key", api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::ProviderErrorKind;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GeminiClient {
        let mut config = GeminiClientConfig::new(server.uri()).with_api_key("test-key");
        config.text_model = "text-model".into();
        config.image_model = "image-model".into();
        GeminiClient::new(config).unwrap()
    }

    fn text_request() -> SectionTextRequest {
        SectionTextRequest {
            section_title: "Hives".into(),
            section_description: "Choosing a hive".into(),
            project_title: "Bees".into(),
            config: GenerationConfig::new("Bees"),
            previous_context: None,
        }
    }

    #[test]
    fn test_parse_sse_line() {
        let line = r#"data: {"candidates":[{"content":{"parts":[{"text":"Hello"}]}}]}"#;
        assert_eq!(parse_sse_line(line).unwrap().unwrap(), "Hello");

        assert!(parse_sse_line(": keep-alive").is_none());
        assert!(parse_sse_line("data: ").is_none());

        let empty = r#"data: {"candidates":[{"content":{"parts":[{"text":""}]}}]}"#;
        assert!(parse_sse_line(empty).is_none());

        let broken = parse_sse_line("data: {not json").unwrap().unwrap_err();
        assert_eq!(broken.kind, ProviderErrorKind::ParseError);
    }

    #[test]
    fn test_line_buffer_keeps_multibyte_char_split_across_chunks() {
        let line = "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"café\"}]}}]}\r\n";
        let bytes = line.as_bytes();
        // 在 'é' (0xC3 0xA9) 的两个字节之间切开
        let split = bytes.iter().position(|b| *b == 0xC3).unwrap() + 1;

        let mut lines = SseLineBuffer::default();
        lines.extend(&bytes[..split]);
        assert!(lines.next_line().is_none());

        lines.extend(&bytes[split..]);
        let decoded = lines.next_line().unwrap().unwrap();
        assert_eq!(parse_sse_line(&decoded).unwrap().unwrap(), "café");
        assert!(lines.next_line().is_none());
        assert_eq!(lines.finish().unwrap(), "");
    }

    #[test]
    fn test_line_buffer_rejects_invalid_utf8() {
        let mut lines = SseLineBuffer::default();
        lines.extend(b"data: \xFF\xFE\n");
        let err = lines.next_line().unwrap().unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::ParseError);
    }

    #[test]
    fn test_line_buffer_returns_unterminated_tail() {
        let mut lines = SseLineBuffer::default();
        lines.extend(b"data: one\ndata: t");
        lines.extend("wö".as_bytes());
        assert_eq!(lines.next_line().unwrap().unwrap(), "data: one");
        assert!(lines.next_line().is_none());
        assert_eq!(lines.finish().unwrap(), "data: twö");
    }

    #[test]
    fn test_parse_outline_with_code_fence() {
        let text = "```json\n{\"title\":\"T\",\"sections\":[{\"title\":\"A\",\"description\":\"a\"}]}\n```";
        let draft = parse_outline(text).unwrap();
        assert_eq!(draft.title.as_deref(), Some("T"));
        assert_eq!(draft.sections.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let server = MockServer::start().await;
        let client = GeminiClient::new(GeminiClientConfig::new(server.uri())).unwrap();

        let err = client
            .synthesize_outline(&GenerationConfig::new("Bees"))
            .await
            .unwrap_err();
        assert!(err.is_credential_missing());

        let err = client.stream_section_text(text_request()).await.err().unwrap();
        assert!(err.is_credential_missing());

        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_outline_request() {
        let server = MockServer::start().await;
        let outline = json!({
            "title": "Bees on the Roof",
            "sections": [
                { "title": "Why bees", "description": "Motivation" },
                { "title": "Hives", "description": "Choosing a hive" }
            ]
        });
        Mock::given(method("POST"))
            .and(path("/models/text-model:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": outline.to_string() }] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let draft = client(&server)
            .synthesize_outline(&GenerationConfig::new("Bees"))
            .await
            .unwrap();
        assert_eq!(draft.title.as_deref(), Some("Bees on the Roof"));
        assert_eq!(draft.sections[1].title, "Hives");
    }

    #[tokio::test]
    async fn test_forbidden_maps_to_credential_missing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let err = client(&server)
            .synthesize_outline(&GenerationConfig::new("Bees"))
            .await
            .unwrap_err();
        assert!(err.is_credential_missing());
    }

    #[tokio::test]
    async fn test_server_error_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client(&server)
            .synthesize_image(ImageRequest {
                prompt: "p".into(),
                aspect_ratio: "4:3".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::ProviderError);
    }

    #[tokio::test]
    async fn test_stream_yields_fragments_in_order() {
        let server = MockServer::start().await;
        let chunk = |text: &str| {
            format!(
                "data: {}\r\n\r\n",
                json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
            )
        };
        let body = format!("{}{}{}", chunk("Hello "), chunk("bees"), chunk("!"));

        Mock::given(method("POST"))
            .and(path("/models/text-model:streamGenerateContent"))
            .and(query_param("alt", "sse"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let fragments: Vec<String> = client(&server)
            .stream_section_text(text_request())
            .await
            .unwrap()
            .map(|f| f.unwrap())
            .collect()
            .await;
        assert_eq!(fragments, vec!["Hello ", "bees", "!"]);
    }

    #[tokio::test]
    async fn test_stream_surfaces_mid_stream_error() {
        let server = MockServer::start().await;
        let body = format!(
            "data: {}\n\ndata: {}\n\n",
            json!({ "candidates": [{ "content": { "parts": [{ "text": "Intro. " }] } }] }),
            json!({ "error": { "message": "quota exceeded" } })
        );
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let items: Vec<Result<String, ProviderError>> = client(&server)
            .stream_section_text(text_request())
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "Intro. ");
        assert_eq!(items[1].as_ref().unwrap_err().message, "quota exceeded");
    }

    #[tokio::test]
    async fn test_image_inline_data() {
        let server = MockServer::start().await;
        let payload = base64::engine::general_purpose::STANDARD.encode(b"png-bytes");
        Mock::given(method("POST"))
            .and(path("/models/image-model:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [
                    { "text": "Here is your image" },
                    { "inlineData": { "mimeType": "image/jpeg", "data": payload } }
                ] } }]
            })))
            .mount(&server)
            .await;

        let image = client(&server)
            .synthesize_image(ImageRequest {
                prompt: "a hive".into(),
                aspect_ratio: "3:4".into(),
            })
            .await
            .unwrap();
        assert_eq!(image.bytes, b"png-bytes");
        assert_eq!(image.mime_type, "image/jpeg");
    }
}
