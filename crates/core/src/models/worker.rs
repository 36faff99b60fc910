use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{SchedulerError, SchedulerResult};
use crate::models::TaskDescriptor;

/// 一个调度周期内的Worker集合，按identity有序
pub type WorkerSet = BTreeMap<String, WorkerSnapshot>;

/// Worker发现模块上报的原始记录
///
/// 这是线上传输的形态，字段全部公开；经 [`WorkerRecord::build`] 校验后
/// 才成为调度算法可用的 [`WorkerSnapshot`]。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRecord {
    pub identity: String,
    pub tier: String,
    pub version: String,
    pub total_capacity: u32,
    #[serde(default)]
    pub running_task_ids: BTreeSet<String>,
    #[serde(default)]
    pub running_availability_groups: BTreeSet<String>,
    /// 多槽位任务在每个任务ID之外额外占用的槽位数
    #[serde(default, skip_serializing_if = "is_zero")]
    pub reserved_capacity: u32,
    #[serde(default = "never_completed")]
    pub last_completed_at: DateTime<Utc>,
}

fn never_completed() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl WorkerRecord {
    /// 创建一个空闲Worker记录
    pub fn new(identity: &str, tier: &str, version: &str, total_capacity: u32) -> Self {
        Self {
            identity: identity.to_string(),
            tier: tier.to_string(),
            version: version.to_string(),
            total_capacity,
            running_task_ids: BTreeSet::new(),
            running_availability_groups: BTreeSet::new(),
            reserved_capacity: 0,
            last_completed_at: never_completed(),
        }
    }

    pub fn with_running_task(mut self, task_id: &str) -> Self {
        self.running_task_ids.insert(task_id.to_string());
        self
    }

    pub fn with_availability_group(mut self, group: &str) -> Self {
        self.running_availability_groups.insert(group.to_string());
        self
    }

    pub fn with_last_completed_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_completed_at = at;
        self
    }

    /// 校验并生成不可变快照
    pub fn build(self) -> SchedulerResult<WorkerSnapshot> {
        WorkerSnapshot::try_from(self)
    }
}

/// Worker节点在某一时刻的不可变视图
///
/// 构造时保证 `total_capacity >= 1`，因此 [`WorkerSnapshot::load_ratio`]
/// 永远不会出现除零。快照只能被整体替换，不能原地修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WorkerRecord", into = "WorkerRecord")]
pub struct WorkerSnapshot {
    identity: String,
    tier: String,
    version: String,
    total_capacity: u32,
    running_task_ids: BTreeSet<String>,
    running_availability_groups: BTreeSet<String>,
    reserved_capacity: u32,
    last_completed_at: DateTime<Utc>,
}

impl TryFrom<WorkerRecord> for WorkerSnapshot {
    type Error = SchedulerError;

    fn try_from(record: WorkerRecord) -> SchedulerResult<Self> {
        if record.identity.trim().is_empty() {
            return Err(SchedulerError::invalid_worker(
                record.identity,
                "identity不能为空",
            ));
        }
        if record.tier.trim().is_empty() {
            return Err(SchedulerError::invalid_worker(record.identity, "tier不能为空"));
        }
        if record.total_capacity == 0 {
            return Err(SchedulerError::invalid_worker(
                record.identity,
                "total_capacity必须大于0",
            ));
        }

        Ok(Self {
            identity: record.identity,
            tier: record.tier,
            version: record.version,
            total_capacity: record.total_capacity,
            running_task_ids: record.running_task_ids,
            running_availability_groups: record.running_availability_groups,
            reserved_capacity: record.reserved_capacity,
            last_completed_at: record.last_completed_at,
        })
    }
}

impl From<WorkerSnapshot> for WorkerRecord {
    fn from(snapshot: WorkerSnapshot) -> Self {
        Self {
            identity: snapshot.identity,
            tier: snapshot.tier,
            version: snapshot.version,
            total_capacity: snapshot.total_capacity,
            running_task_ids: snapshot.running_task_ids,
            running_availability_groups: snapshot.running_availability_groups,
            reserved_capacity: snapshot.reserved_capacity,
            last_completed_at: snapshot.last_completed_at,
        }
    }
}

impl WorkerSnapshot {
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn tier(&self) -> &str {
        &self.tier
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn total_capacity(&self) -> u32 {
        self.total_capacity
    }

    pub fn running_task_ids(&self) -> &BTreeSet<String> {
        &self.running_task_ids
    }

    pub fn running_availability_groups(&self) -> &BTreeSet<String> {
        &self.running_availability_groups
    }

    pub fn last_completed_at(&self) -> DateTime<Utc> {
        self.last_completed_at
    }

    /// 已占用的任务槽位数：每个运行中的任务一个，加上多槽位任务的额外占用
    pub fn used_capacity(&self) -> u32 {
        u32::try_from(self.running_task_ids.len())
            .unwrap_or(u32::MAX)
            .saturating_add(self.reserved_capacity)
    }

    /// 剩余任务槽位数；过期快照上报的运行任务数超过容量时为0
    pub fn remaining_capacity(&self) -> u32 {
        self.total_capacity.saturating_sub(self.used_capacity())
    }

    /// 获取Worker负载率（0.0 ~ 1.0）
    pub fn load_ratio(&self) -> f64 {
        f64::from(self.used_capacity()) / f64::from(self.total_capacity)
    }

    /// 精确比较两个Worker的负载率
    ///
    /// 交叉相乘 `used_a * total_b` 与 `used_b * total_a`，避免浮点误差。
    pub fn cmp_load_ratio(&self, other: &Self) -> Ordering {
        let lhs = u64::from(self.used_capacity()) * u64::from(other.total_capacity);
        let rhs = u64::from(other.used_capacity()) * u64::from(self.total_capacity);
        lhs.cmp(&rhs)
    }

    pub fn is_running_group(&self, group: &str) -> bool {
        self.running_availability_groups.contains(group)
    }

    /// 返回分配了 `task` 之后的新快照，原快照保持不变
    ///
    /// 新快照恰好多占用 `task.required_capacity` 个槽位。
    pub fn with_assigned_task(&self, task: &TaskDescriptor) -> Self {
        let mut next = self.clone();
        let before = next.used_capacity();
        next.running_task_ids.insert(task.id.clone());
        let counted = next.used_capacity() - before;
        next.reserved_capacity = next
            .reserved_capacity
            .saturating_add(task.required_capacity.saturating_sub(counted));
        if let Some(group) = &task.availability_group {
            next.running_availability_groups.insert(group.clone());
        }
        next
    }
}

/// 由发现模块的记录构建Worker集合，拒绝非法记录和重复identity
pub fn build_worker_set(
    records: impl IntoIterator<Item = WorkerRecord>,
) -> SchedulerResult<WorkerSet> {
    let mut workers = WorkerSet::new();
    for record in records {
        let snapshot = record.build()?;
        if workers.contains_key(snapshot.identity()) {
            return Err(SchedulerError::invalid_worker(
                snapshot.identity(),
                "重复的Worker identity",
            ));
        }
        workers.insert(snapshot.identity().to_string(), snapshot);
    }
    Ok(workers)
}
