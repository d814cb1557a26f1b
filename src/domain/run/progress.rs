//! Run Context - 进度

use serde::{Deserialize, Serialize};

/// 单次运行的进度，每次运行重建，不持久化
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunProgress {
    pub steps_completed: u32,
    pub steps_total: u32,
    pub status_message: String,
}

impl RunProgress {
    /// 封面 1 步，每个章节 2 步（正文 + 插图）
    pub fn for_sections(section_count: usize) -> Self {
        Self {
            steps_completed: 0,
            steps_total: 1 + 2 * section_count as u32,
            status_message: String::new(),
        }
    }

    pub fn advance(&mut self, steps: u32) {
        self.steps_completed = (self.steps_completed + steps).min(self.steps_total);
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    pub fn is_finished(&self) -> bool {
        self.steps_completed == self.steps_total
    }
}
