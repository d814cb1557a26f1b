//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, ProviderKind};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// # 环境变量示例
/// - `FOLIO_SERVER__PORT=8080`
/// - `FOLIO_PROVIDER__KIND=gemini`
/// - `FOLIO_PROVIDER__API_KEY=...`
/// - `FOLIO_GENERATION__MAX_CONCURRENT_RUNS=4`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5080)?
        .set_default("server.workspace_idle_secs", 86400)?
        .set_default("provider.kind", "fake")?
        .set_default("provider.timeout_secs", 180)?
        .set_default("generation.max_concurrent_runs", 2)?
        .set_default("generation.queue_capacity", 64)?
        .set_default("export.page_width", 210.0)?
        .set_default("export.page_height", 297.0)?
        .set_default("export.margin", 10.0)?
        .set_default("export.raster_width", 800)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 前缀: FOLIO_，层级分隔符: __
    builder = builder.add_source(
        Environment::with_prefix("FOLIO")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.provider.kind == ProviderKind::Gemini && config.provider.base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Provider base URL cannot be empty".to_string(),
        ));
    }

    if config.generation.max_concurrent_runs == 0 || config.generation.queue_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "Generation concurrency and queue capacity must be positive".to_string(),
        ));
    }

    let export = &config.export;
    if export.page_width - 2.0 * export.margin <= 0.0
        || export.page_height - 2.0 * export.margin <= 0.0
    {
        return Err(ConfigError::ValidationError(
            "Export margin leaves no content area".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Provider: {:?}", config.provider.kind);
    if config.provider.kind == ProviderKind::Gemini {
        tracing::info!("Provider URL: {}", config.provider.base_url);
        tracing::info!("Text Model: {}", config.provider.text_model);
        tracing::info!("Image Model: {}", config.provider.image_model);
        tracing::info!(
            "API Key: {}",
            if config.provider.api_key.as_deref().is_some_and(|k| !k.is_empty()) {
                "configured"
            } else {
                "missing"
            }
        );
    }
    tracing::info!(
        "Max Concurrent Runs: {}",
        config.generation.max_concurrent_runs
    );
    tracing::info!(
        "Export Page: {}x{} (margin {})",
        config.export.page_width,
        config.export.page_height,
        config.export.margin
    );
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_concurrency() {
        let mut config = AppConfig::default();
        config.generation.max_concurrent_runs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_oversized_margin() {
        let mut config = AppConfig::default();
        config.export.margin = 105.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9090

[provider]
kind = "gemini"
api_key = "test-key"

[export]
margin = 15.0
"#
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.provider.kind, ProviderKind::Gemini);
        assert_eq!(config.provider.api_key.as_deref(), Some("test-key"));
        assert_eq!(config.provider.text_model, "gemini-2.5-flash");
        assert_eq!(config.export.margin, 15.0);
        assert_eq!(config.export.page_width, 210.0);
    }
}
