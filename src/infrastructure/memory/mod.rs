//! Memory Layer - In-Memory State Management
//!
//! 实现 WorkspaceManager，管理工作区（Project + 运行状态 + 进度）的内存状态

mod workspace_manager;

pub use workspace_manager::InMemoryWorkspaceManager;
