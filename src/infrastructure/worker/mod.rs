//! Worker Layer - Background Task Processing
//!
//! 实现 GenerationWorker，处理排队的生成运行

mod generation_worker;

pub use generation_worker::{GenerationWorker, GenerationWorkerConfig};
