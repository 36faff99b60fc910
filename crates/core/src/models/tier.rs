//! Tier亲和配置
//!
//! 线上格式：
//!
//! ```json
//! {
//!   "strong": true,
//!   "tierMap": {
//!     "index_kafka": { "defaultTier": "t1", "tiers": { "ds1": "t2" } }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{SchedulerError, SchedulerResult};

/// 单个任务类型的Tier偏好规则
///
/// 两个字段都为空时等价于没有规则，不会被当作“偏好名为null的Tier”。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierRule {
    #[serde(default)]
    pub default_tier: Option<String>,
    /// dataset -> tier，优先于 `default_tier`
    #[serde(default, rename = "tiers")]
    pub dataset_overrides: Option<BTreeMap<String, String>>,
}

impl TierRule {
    pub fn new(
        default_tier: Option<&str>,
        dataset_overrides: Option<BTreeMap<String, String>>,
    ) -> Self {
        Self {
            default_tier: default_tier.map(str::to_string),
            dataset_overrides,
        }
    }

    /// 解析任务的偏好Tier：先查dataset覆盖，再取默认Tier
    pub fn preferred_tier(&self, dataset: &str) -> Option<&str> {
        self.dataset_overrides
            .as_ref()
            .and_then(|overrides| overrides.get(dataset))
            .or(self.default_tier.as_ref())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.default_tier.is_none() && self.dataset_overrides.is_none()
    }
}

/// 按任务类型配置的Tier亲和规则
///
/// 加载后不可变；热更新通过整体替换完成。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierAffinityConfig {
    /// 为true时偏好Tier没有可用Worker则放弃分配，不回退到其他Tier
    #[serde(default)]
    pub strong: bool,
    #[serde(default, rename = "tierMap", deserialize_with = "null_as_empty")]
    pub by_task_type: BTreeMap<String, TierRule>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeMap<String, TierRule>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BTreeMap<String, TierRule>>::deserialize(deserializer)?.unwrap_or_default())
}

impl TierAffinityConfig {
    pub fn new(by_task_type: BTreeMap<String, TierRule>, strong: bool) -> Self {
        Self {
            strong,
            by_task_type,
        }
    }

    pub fn with_rule(mut self, task_type: &str, rule: TierRule) -> Self {
        self.by_task_type.insert(task_type.to_string(), rule);
        self
    }

    /// 任务类型未配置时返回None，表示不限制Tier
    pub fn preferred_tier(&self, task_type: &str, dataset: &str) -> Option<&str> {
        self.by_task_type
            .get(task_type)
            .and_then(|rule| rule.preferred_tier(dataset))
    }

    pub fn from_json_str(json: &str) -> SchedulerResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> SchedulerResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// 加载时校验，选择算法假定配置已通过校验
    pub fn validate(&self) -> SchedulerResult<()> {
        for (task_type, rule) in &self.by_task_type {
            if task_type.trim().is_empty() {
                return Err(SchedulerError::Configuration(
                    "tierMap中的任务类型不能为空".to_string(),
                ));
            }
            if let Some(tier) = &rule.default_tier {
                if tier.trim().is_empty() {
                    return Err(SchedulerError::Configuration(format!(
                        "任务类型 {task_type} 的defaultTier不能为空字符串"
                    )));
                }
            }
            for (dataset, tier) in rule.dataset_overrides.iter().flatten() {
                if dataset.trim().is_empty() || tier.trim().is_empty() {
                    return Err(SchedulerError::Configuration(format!(
                        "任务类型 {task_type} 的tiers中存在空的dataset或tier"
                    )));
                }
            }
        }
        Ok(())
    }
}
