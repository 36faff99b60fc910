use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::errors::{SchedulerError, SchedulerResult};

/// Worker版本比较规则
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionOrdering {
    /// 按字符串字典序比较
    #[default]
    Lexicographic,
    /// 按点分数字逐段比较，如 `1.10.0 > 1.9`，允许 `v` 前缀；缺失的段视为0
    DottedNumeric,
}

impl VersionOrdering {
    /// 比较两个版本；无法比较时返回None
    pub fn compare(&self, lhs: &str, rhs: &str) -> Option<Ordering> {
        match self {
            VersionOrdering::Lexicographic => Some(lhs.cmp(rhs)),
            VersionOrdering::DottedNumeric => {
                let lhs = parse_dotted(lhs)?;
                let rhs = parse_dotted(rhs)?;
                let len = lhs.len().max(rhs.len());
                let ordering = (0..len)
                    .map(|i| {
                        let a = lhs.get(i).copied().unwrap_or(0);
                        let b = rhs.get(i).copied().unwrap_or(0);
                        a.cmp(&b)
                    })
                    .find(|ordering| *ordering != Ordering::Equal)
                    .unwrap_or(Ordering::Equal);
                Some(ordering)
            }
        }
    }
}

fn parse_dotted(version: &str) -> Option<Vec<u64>> {
    let version = version.strip_prefix('v').unwrap_or(version);
    if version.is_empty() {
        return None;
    }
    version
        .split('.')
        .map(|segment| segment.parse::<u64>().ok())
        .collect()
}

/// 任务运行器的通用配置中与Worker选择相关的部分
///
/// 由外部加载后注入选择算法，算法本身不硬编码任何策略常量。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// 集群范围的Worker最低版本，与任务自身的最低版本同时生效
    #[serde(default)]
    pub min_worker_version: Option<String>,
    #[serde(default)]
    pub version_ordering: VersionOrdering,
    /// 为true时允许同一可用组的任务落在同一个Worker上
    #[serde(default)]
    pub allow_availability_group_crowding: bool,
}

impl RunnerConfig {
    /// `worker_version >= minimum`，无法比较视为不满足
    pub fn version_satisfies(&self, worker_version: &str, minimum: &str) -> bool {
        matches!(
            self.version_ordering.compare(worker_version, minimum),
            Some(Ordering::Greater | Ordering::Equal)
        )
    }

    pub fn validate(&self) -> SchedulerResult<()> {
        if let Some(version) = &self.min_worker_version {
            if self.version_ordering.compare(version, version).is_none() {
                return Err(SchedulerError::Configuration(format!(
                    "min_worker_version {version} 无法按 {:?} 规则比较",
                    self.version_ordering
                )));
            }
        }
        Ok(())
    }
}
