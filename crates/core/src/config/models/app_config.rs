use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use super::{behavior::BehaviorConfig, runner::RunnerConfig};
use crate::logging::LoggingConfig;

/// 选择器进程配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectorConfig {
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Worker行为文档（JSON）路径，未配置时使用 `equalDistribution`
    #[serde(default)]
    pub behavior_file: Option<PathBuf>,
}

impl SelectorConfig {
    /// Load configuration from config file and environment variables
    ///
    /// Load order:
    /// 1. Defaults
    /// 2. Config file (TOML format), if given
    /// 3. Environment variable overrides (prefix: `SELECTOR_`, nesting separator `__`),
    ///    e.g. `SELECTOR_RUNNER__ALLOW_AVAILABILITY_GROUP_CROWDING=true`
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_path {
            if !Path::new(path).exists() {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("SELECTOR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: SelectorConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: SelectorConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }

    /// 加载 `behavior_file` 指向的Worker行为文档
    pub fn load_behavior(&self) -> Result<BehaviorConfig> {
        match &self.behavior_file {
            Some(path) => BehaviorConfig::load(path)
                .with_context(|| format!("加载Worker行为配置失败: {}", path.display())),
            None => Ok(BehaviorConfig::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.runner.validate().context("Runner配置验证失败")?;
        self.logging.validate().context("日志配置验证失败")?;
        Ok(())
    }
}
