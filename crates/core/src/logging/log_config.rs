use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{SchedulerError, SchedulerResult};
use crate::logging::log_level::LogLevel;

/// Output format for log entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON format
    Json,
    /// Multi-line human readable format
    #[default]
    Pretty,
    /// Single-line plain text format
    Text,
}

impl FromStr for OutputFormat {
    type Err = SchedulerError;

    fn from_str(format: &str) -> Result<Self, Self::Err> {
        match format.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "pretty" => Ok(OutputFormat::Pretty),
            "text" => Ok(OutputFormat::Text),
            _ => Err(SchedulerError::Configuration(format!(
                "Invalid log format: {format}"
            ))),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level, overridden by `RUST_LOG` when set
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default)]
    pub format: OutputFormat,
    /// Extra `EnvFilter` directives, e.g. `scheduler_dispatcher=trace`
    #[serde(default)]
    pub directives: Vec<String>,
}

impl LoggingConfig {
    pub fn with_level(level: LogLevel) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    /// Full filter string: base level followed by extra directives
    pub fn filter(&self) -> String {
        std::iter::once(self.level.as_filter().to_string())
            .chain(self.directives.iter().cloned())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn validate(&self) -> SchedulerResult<()> {
        if self.directives.iter().any(|d| d.trim().is_empty()) {
            return Err(SchedulerError::Configuration(
                "Log filter directives must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
