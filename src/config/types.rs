//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 内容服务配置
    #[serde(default)]
    pub provider: ProviderConfig,

    /// 生成任务配置
    #[serde(default)]
    pub generation: GenerationSettings,

    /// 导出配置
    #[serde(default)]
    pub export: ExportConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 工作区空闲多久后回收（秒），0 表示不回收
    #[serde(default = "default_workspace_idle")]
    pub workspace_idle_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5080
}

fn default_workspace_idle() -> u64 {
    86400 // 24 小时
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workspace_idle_secs: default_workspace_idle(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 内容服务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// 离线假服务
    #[default]
    Fake,
    /// Gemini API
    Gemini,
}

/// 内容服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub kind: ProviderKind,

    /// 为空时所有调用返回 credential_missing
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_provider_url")]
    pub base_url: String,

    #[serde(default = "default_text_model")]
    pub text_model: String,

    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

fn default_provider_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_text_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_image_model() -> String {
    "gemini-2.5-flash-image".to_string()
}

fn default_provider_timeout() -> u64 {
    180
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            api_key: None,
            base_url: default_provider_url(),
            text_model: default_text_model(),
            image_model: default_image_model(),
            timeout_secs: default_provider_timeout(),
        }
    }
}

/// 生成任务配置
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationSettings {
    /// 跨工作区的最大并发运行数
    #[serde(default = "default_max_concurrent_runs")]
    pub max_concurrent_runs: usize,

    /// 等待队列容量
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_max_concurrent_runs() -> usize {
    2
}

fn default_queue_capacity() -> usize {
    64
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_concurrent_runs: default_max_concurrent_runs(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

/// 导出配置
///
/// 页面尺寸单位为毫米，默认 A4
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_page_width")]
    pub page_width: f64,

    #[serde(default = "default_page_height")]
    pub page_height: f64,

    #[serde(default = "default_margin")]
    pub margin: f64,

    /// 展示层栅格化页面内容时使用的像素宽度
    #[serde(default = "default_raster_width")]
    pub raster_width: u32,
}

fn default_page_width() -> f64 {
    210.0
}

fn default_page_height() -> f64 {
    297.0
}

fn default_margin() -> f64 {
    10.0
}

fn default_raster_width() -> u32 {
    800
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            page_width: default_page_width(),
            page_height: default_page_height(),
            margin: default_margin(),
            raster_width: default_raster_width(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5080);
        assert_eq!(config.provider.kind, ProviderKind::Fake);
        assert!(config.provider.api_key.is_none());
        assert_eq!(config.generation.max_concurrent_runs, 2);
        assert_eq!(config.export.page_width, 210.0);
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:5080");
    }
}
