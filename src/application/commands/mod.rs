//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：处理所有写操作

mod export_commands;
mod generation_commands;
mod section_commands;
mod workspace_commands;

pub mod handlers;

pub use export_commands::*;
pub use generation_commands::*;
pub use section_commands::*;
pub use workspace_commands::*;
