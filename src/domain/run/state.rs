//! Run Context - 运行状态机

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 非法状态迁移
#[derive(Debug, Error)]
#[error("cannot {action} while {state}")]
pub struct TransitionError {
    pub state: RunState,
    pub action: &'static str,
}

/// 顶层运行阶段
///
/// idle → outlining → reviewing → generating → {completed | failed}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Idle,
    Outlining,
    Reviewing,
    Generating,
    Completed,
    Failed,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Outlining => "outlining",
            RunState::Reviewing => "reviewing",
            RunState::Generating => "generating",
            RunState::Completed => "completed",
            RunState::Failed => "failed",
        }
    }

    /// 正在运行的阶段独占 Project 写权限
    pub fn is_busy(&self) -> bool {
        matches!(self, RunState::Outlining | RunState::Generating)
    }

    pub fn begin_outline(self) -> Result<RunState, TransitionError> {
        match self {
            RunState::Idle | RunState::Reviewing | RunState::Completed | RunState::Failed => {
                Ok(RunState::Outlining)
            }
            _ => Err(TransitionError {
                state: self,
                action: "start outline",
            }),
        }
    }

    pub fn begin_generation(self) -> Result<RunState, TransitionError> {
        match self {
            RunState::Reviewing | RunState::Completed | RunState::Failed => {
                Ok(RunState::Generating)
            }
            _ => Err(TransitionError {
                state: self,
                action: "start generation",
            }),
        }
    }

    pub fn can_edit(&self) -> bool {
        !self.is_busy()
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
