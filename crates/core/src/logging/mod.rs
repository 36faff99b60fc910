pub mod log_config;
pub mod log_level;

pub use log_config::{LoggingConfig, OutputFormat as LogFormat};
pub use log_level::LogLevel;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::errors::{SchedulerError, SchedulerResult};

/// 初始化日志系统
///
/// `RUST_LOG` 存在时优先于配置中的级别。日志输出到stderr。
/// 只能调用一次，重复初始化返回错误。
pub fn init_logging(config: &LoggingConfig) -> SchedulerResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.filter()));

    let registry = tracing_subscriber::registry().with(env_filter);

    // 标准输出留给命令的JSON结果，日志统一写到stderr
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let result = match config.format {
        LogFormat::Json => registry.with(layer.json()).try_init(),
        LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
        LogFormat::Text => registry.with(layer).try_init(),
    };

    result.map_err(|e| SchedulerError::Configuration(format!("初始化日志系统失败: {e}")))
}
