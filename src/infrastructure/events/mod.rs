//! Events Layer - 实时推送
//!
//! 按工作区广播 Project 快照、进度与运行状态

mod publisher;

pub use publisher::{EventPublisher, WsEvent};
