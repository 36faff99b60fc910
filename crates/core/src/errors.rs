use thiserror::Error;

/// 调度器错误类型定义
///
/// 选择算法本身从不返回错误：没有合适的Worker时结果为 `None`。
/// 这里的错误只出现在边界上（快照构造、配置解析与校验）。
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("无效的Worker快照 {identity}: {message}")]
    InvalidWorker { identity: String, message: String },

    #[error("无效的任务描述 {id}: {message}")]
    InvalidTask { id: String, message: String },

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
}

impl SchedulerError {
    pub fn invalid_worker(identity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidWorker {
            identity: identity.into(),
            message: message.into(),
        }
    }

    pub fn invalid_task(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTask {
            id: id.into(),
            message: message.into(),
        }
    }
}

/// 统一的Result类型
pub type SchedulerResult<T> = std::result::Result<T, SchedulerError>;
