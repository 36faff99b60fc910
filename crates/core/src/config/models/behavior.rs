use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{SchedulerError, SchedulerResult};
use crate::models::TierAffinityConfig;

/// Worker选择策略配置，按 `type` 字段区分
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StrategyConfig {
    /// 只按容量均衡
    #[default]
    EqualDistribution,
    /// 先按Tier过滤，再按容量均衡
    EqualDistributionWithTierSpec {
        #[serde(default, rename = "workerTierSpec")]
        worker_tier_spec: TierAffinityConfig,
    },
}

impl StrategyConfig {
    pub fn type_name(&self) -> &'static str {
        match self {
            StrategyConfig::EqualDistribution => "equalDistribution",
            StrategyConfig::EqualDistributionWithTierSpec { .. } => "equalDistributionWithTierSpec",
        }
    }
}

/// Worker行为文档
///
/// ```json
/// {
///   "selectStrategy": {
///     "type": "equalDistributionWithTierSpec",
///     "workerTierSpec": { "strong": false, "tierMap": {} }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorConfig {
    #[serde(default)]
    pub select_strategy: StrategyConfig,
}

impl BehaviorConfig {
    pub fn new(select_strategy: StrategyConfig) -> Self {
        Self { select_strategy }
    }

    /// 解析并校验JSON文档
    pub fn from_json_str(json: &str) -> SchedulerResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载
    pub fn load(path: &Path) -> SchedulerResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchedulerError::Configuration(format!(
                "读取Worker行为配置 {} 失败: {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&content)
    }

    pub fn to_json_pretty(&self) -> SchedulerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> SchedulerResult<()> {
        match &self.select_strategy {
            StrategyConfig::EqualDistribution => Ok(()),
            StrategyConfig::EqualDistributionWithTierSpec { worker_tier_spec } => {
                worker_tier_spec.validate()
            }
        }
    }
}
