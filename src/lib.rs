//! Folio - 图文文档生成服务
//!
//! 根据主题生成大纲，审阅后逐章流式生成正文与插图，支持中断续跑与分页导出
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Project Context: 文档、章节、生成配置
//! - Run Context: 运行状态机与进度
//! - Pagination: 导出分页算法
//!
//! 应用层 (application/):
//! - Ports: 端口定义（ContentProvider, WorkspaceManager, SnapshotPublisher, PageRenderer）
//! - Orchestrator: 大纲 / 正文 / 插图生成编排
//! - Commands: CQRS 命令处理器
//! - Queries: CQRS 查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + WebSocket
//! - Memory: WorkspaceManager 内存实现
//! - Worker: GenerationWorker 后台运行
//! - Adapters: Gemini Client, Fake Provider, Raster Page Renderer
//! - Events: WebSocket 事件发布

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
