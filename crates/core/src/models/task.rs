use serde::{Deserialize, Serialize};

use crate::errors::{SchedulerError, SchedulerResult};

fn default_required_capacity() -> u32 {
    1
}

/// 等待分配的任务描述（由任务队列提供，本子系统只读）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    pub id: String,
    pub task_type: String,
    pub dataset: String,
    /// 占用的任务槽位数，通常为1
    #[serde(default = "default_required_capacity")]
    pub required_capacity: u32,
    /// 为空表示不限制Worker版本
    #[serde(default)]
    pub minimum_worker_version: Option<String>,
    #[serde(default)]
    pub availability_group: Option<String>,
}

impl TaskDescriptor {
    pub fn new(id: &str, task_type: &str, dataset: &str) -> Self {
        Self {
            id: id.to_string(),
            task_type: task_type.to_string(),
            dataset: dataset.to_string(),
            required_capacity: default_required_capacity(),
            minimum_worker_version: None,
            availability_group: None,
        }
    }

    pub fn with_required_capacity(mut self, required_capacity: u32) -> Self {
        self.required_capacity = required_capacity;
        self
    }

    pub fn with_minimum_worker_version(mut self, version: &str) -> Self {
        self.minimum_worker_version = Some(version.to_string());
        self
    }

    pub fn with_availability_group(mut self, group: &str) -> Self {
        self.availability_group = Some(group.to_string());
        self
    }

    /// 在进入选择算法之前校验任务描述
    pub fn validate(&self) -> SchedulerResult<()> {
        if self.id.trim().is_empty() {
            return Err(SchedulerError::invalid_task(&self.id, "任务ID不能为空"));
        }
        if self.task_type.trim().is_empty() {
            return Err(SchedulerError::invalid_task(&self.id, "任务类型不能为空"));
        }
        if self.required_capacity == 0 {
            return Err(SchedulerError::invalid_task(
                &self.id,
                "required_capacity必须大于0",
            ));
        }
        Ok(())
    }
}
