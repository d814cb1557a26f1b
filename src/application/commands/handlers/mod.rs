//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod export_handlers;
mod generation_handlers;
mod section_handlers;
mod workspace_handlers;

pub use export_handlers::*;
pub use generation_handlers::*;
pub use section_handlers::*;
pub use workspace_handlers::*;
