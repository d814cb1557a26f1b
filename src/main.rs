//! Folio - 图文文档生成服务
//!
//! 架构:
//! - Domain: project/, run/, pagination
//! - Application: orchestrator, commands, queries, ports
//! - Infrastructure: http, memory, worker, adapters, events

use std::sync::Arc;
use std::time::Duration;

use folio::application::{
    ContentProviderPort, GenerationContext, GenerationOrchestrator, WorkspaceManagerPort,
};
use folio::config::{load_config, print_config, AppConfig, ProviderKind};
use folio::infrastructure::adapters::{
    FakeContentProvider, FakeContentProviderConfig, GeminiClient, GeminiClientConfig,
    RasterPageRenderer,
};
use folio::infrastructure::events::EventPublisher;
use folio::infrastructure::http::{AppState, HttpServer};
use folio::infrastructure::memory::InMemoryWorkspaceManager;
use folio::infrastructure::worker::{GenerationWorker, GenerationWorkerConfig};
use tokio::sync::mpsc;

/// 空闲工作区回收间隔
const WORKSPACE_GC_INTERVAL: Duration = Duration::from_secs(60);

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},folio={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn create_provider(config: &AppConfig) -> anyhow::Result<Arc<dyn ContentProviderPort>> {
    let provider: Arc<dyn ContentProviderPort> = match config.provider.kind {
        ProviderKind::Fake => Arc::new(FakeContentProvider::new(FakeContentProviderConfig {
            section_count: None,
            fragment_delay_ms: 40,
        })),
        ProviderKind::Gemini => {
            let mut client_config = GeminiClientConfig {
                api_key: None,
                base_url: config.provider.base_url.clone(),
                text_model: config.provider.text_model.clone(),
                image_model: config.provider.image_model.clone(),
                timeout_secs: config.provider.timeout_secs,
            };
            if let Some(api_key) = config.provider.api_key.as_deref().filter(|k| !k.is_empty()) {
                client_config = client_config.with_api_key(api_key);
            } else {
                // 缺少凭证时照常启动，运行时返回 credential_missing
                tracing::warn!("No provider API key configured, generation will ask for a credential");
            }
            Arc::new(
                GeminiClient::new(client_config)
                    .map_err(|e| anyhow::anyhow!("Failed to create Gemini client: {}", e))?,
            )
        }
    };
    Ok(provider)
}

/// 定期关闭长时间无访问的工作区
fn spawn_workspace_gc(
    workspaces: Arc<dyn WorkspaceManagerPort>,
    event_publisher: Arc<EventPublisher>,
    idle_secs: u64,
) {
    if idle_secs == 0 {
        return;
    }

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(WORKSPACE_GC_INTERVAL);
        loop {
            ticker.tick().await;
            for workspace_id in workspaces.get_expired_workspaces(idle_secs) {
                match workspaces.close(&workspace_id) {
                    Ok(()) => {
                        event_publisher.publish_workspace_closed(&workspace_id, "Idle timeout");
                        tracing::info!(workspace_id = %workspace_id, "Idle workspace closed");
                    }
                    Err(e) => {
                        tracing::debug!(workspace_id = %workspace_id, error = %e, "Idle workspace kept");
                    }
                }
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Folio - illustrated document generator");
    print_config(&config);

    // 内容服务
    let provider = create_provider(&config)?;
    if !provider.health_check().await {
        tracing::warn!(kind = ?config.provider.kind, "Content provider health check failed");
    }

    // 工作区与事件
    let workspaces: Arc<dyn WorkspaceManagerPort> = Arc::new(InMemoryWorkspaceManager::new());
    let event_publisher = Arc::new(EventPublisher::new());

    let orchestrator = GenerationOrchestrator::new(GenerationContext {
        provider,
        workspaces: workspaces.clone(),
        publisher: event_publisher.clone(),
    });

    // 生成队列与 Worker
    let (queue_tx, queue_rx) = mpsc::channel(config.generation.queue_capacity);
    let worker = GenerationWorker::new(
        GenerationWorkerConfig {
            max_concurrent_runs: config.generation.max_concurrent_runs,
        },
        queue_rx,
        orchestrator.clone(),
        workspaces.clone(),
    );
    tokio::spawn(worker.run());

    spawn_workspace_gc(
        workspaces.clone(),
        event_publisher.clone(),
        config.server.workspace_idle_secs,
    );

    // 创建 HTTP 服务器
    let state = AppState::new(
        orchestrator,
        event_publisher,
        Arc::new(RasterPageRenderer::new()),
        queue_tx,
        config.export.clone(),
    );
    let server = HttpServer::new(config.server.clone(), state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                return;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
