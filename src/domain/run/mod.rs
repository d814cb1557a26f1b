//! Run Context - 生成运行状态与进度

mod progress;
mod state;

pub use progress::RunProgress;
pub use state::{RunState, TransitionError};
