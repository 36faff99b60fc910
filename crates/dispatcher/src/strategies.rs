use std::cmp::Ordering;

use tracing::debug;

use scheduler_core::{
    config::{BehaviorConfig, RunnerConfig, StrategyConfig},
    models::{TaskDescriptor, TierAffinityConfig, WorkerSet, WorkerSnapshot},
    traits::WorkerSelectStrategy,
};

/// 检查Worker是否可以接受任务：剩余容量、版本、可用组互斥
///
/// Runner配置中的集群最低版本与任务自身的最低版本同时生效。
pub fn is_eligible(runner: &RunnerConfig, worker: &WorkerSnapshot, task: &TaskDescriptor) -> bool {
    if worker.remaining_capacity() < task.required_capacity {
        return false;
    }

    let version_ok = [
        runner.min_worker_version.as_deref(),
        task.minimum_worker_version.as_deref(),
    ]
    .into_iter()
    .flatten()
    .all(|minimum| runner.version_satisfies(worker.version(), minimum));
    if !version_ok {
        return false;
    }

    match &task.availability_group {
        Some(group) if !runner.allow_availability_group_crowding => !worker.is_running_group(group),
        _ => true,
    }
}

/// Worker排序规则，越靠前越优先
///
/// 负载率升序 → 总容量降序 → 最近完成时间升序（空闲最久者优先）→ identity升序。
/// 最后一级保证全序，结果与输入顺序无关。
pub fn rank_workers(a: &WorkerSnapshot, b: &WorkerSnapshot) -> Ordering {
    a.cmp_load_ratio(b)
        .then_with(|| b.total_capacity().cmp(&a.total_capacity()))
        .then_with(|| a.last_completed_at().cmp(&b.last_completed_at()))
        .then_with(|| a.identity().cmp(b.identity()))
}

/// 容量均衡策略：不感知Tier
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualDistributionStrategy;

impl EqualDistributionStrategy {
    pub fn new() -> Self {
        Self
    }

    /// 过滤出可以接受任务的Worker
    pub fn eligible_workers<'a>(
        &self,
        runner: &RunnerConfig,
        workers: &'a WorkerSet,
        task: &TaskDescriptor,
    ) -> Vec<&'a WorkerSnapshot> {
        workers
            .values()
            .filter(|worker| is_eligible(runner, worker, task))
            .collect()
    }

    /// 在候选集合中选出排名最高的Worker
    pub fn select_from<'a>(&self, candidates: &[&'a WorkerSnapshot]) -> Option<&'a WorkerSnapshot> {
        candidates
            .iter()
            .copied()
            .min_by(|a, b| rank_workers(a, b))
    }
}

impl WorkerSelectStrategy for EqualDistributionStrategy {
    fn select_worker<'a>(
        &self,
        runner: &RunnerConfig,
        workers: &'a WorkerSet,
        task: &TaskDescriptor,
    ) -> Option<&'a WorkerSnapshot> {
        let eligible = self.eligible_workers(runner, workers, task);
        if eligible.is_empty() {
            debug!(
                "没有可以接受任务 {} 的Worker (候选: {})",
                task.id,
                workers.len()
            );
            return None;
        }

        let selected = self.select_from(&eligible)?;
        debug!(
            "容量均衡策略选择Worker: {} (负载: {:.1}%, 容量: {})",
            selected.identity(),
            selected.load_ratio() * 100.0,
            selected.total_capacity()
        );
        Some(selected)
    }

    fn name(&self) -> &str {
        "EqualDistribution"
    }
}

/// Tier感知的容量均衡策略
///
/// 持有一个 [`EqualDistributionStrategy`]，先按任务类型解析偏好Tier，
/// 在该Tier内做容量均衡；偏好Tier没有可用Worker时，`strong` 决定放弃还是回退。
#[derive(Debug, Clone, Default)]
pub struct TierAwareStrategy {
    tier_spec: TierAffinityConfig,
    balancer: EqualDistributionStrategy,
}

impl TierAwareStrategy {
    pub fn new(tier_spec: TierAffinityConfig) -> Self {
        Self {
            tier_spec,
            balancer: EqualDistributionStrategy::new(),
        }
    }

    pub fn tier_spec(&self) -> &TierAffinityConfig {
        &self.tier_spec
    }
}

impl WorkerSelectStrategy for TierAwareStrategy {
    fn select_worker<'a>(
        &self,
        runner: &RunnerConfig,
        workers: &'a WorkerSet,
        task: &TaskDescriptor,
    ) -> Option<&'a WorkerSnapshot> {
        let eligible = self.balancer.eligible_workers(runner, workers, task);

        let Some(preferred) = self
            .tier_spec
            .preferred_tier(&task.task_type, &task.dataset)
        else {
            debug!("任务类型 {} 没有Tier偏好", task.task_type);
            return self.balancer.select_from(&eligible);
        };

        let in_tier: Vec<&WorkerSnapshot> = eligible
            .iter()
            .copied()
            .filter(|worker| worker.tier() == preferred)
            .collect();

        if let Some(selected) = self.balancer.select_from(&in_tier) {
            debug!(
                "Tier感知策略在Tier {} 中选择Worker: {} (负载: {:.1}%)",
                preferred,
                selected.identity(),
                selected.load_ratio() * 100.0
            );
            return Some(selected);
        }

        if self.tier_spec.strong {
            debug!(
                "Tier {} 没有可用Worker，强Tier约束下任务 {} 暂不分配",
                preferred, task.id
            );
            return None;
        }

        debug!(
            "Tier {} 没有可用Worker，任务 {} 回退到全部Worker",
            preferred, task.id
        );
        self.balancer.select_from(&eligible)
    }

    fn name(&self) -> &str {
        "EqualDistributionWithTierSpec"
    }
}

/// 两种选择策略的组合类型，由Worker行为配置构建
#[derive(Debug, Clone)]
pub enum SelectStrategy {
    EqualDistribution(EqualDistributionStrategy),
    TierAware(TierAwareStrategy),
}

impl SelectStrategy {
    pub fn from_config(config: &StrategyConfig) -> Self {
        match config {
            StrategyConfig::EqualDistribution => {
                SelectStrategy::EqualDistribution(EqualDistributionStrategy::new())
            }
            StrategyConfig::EqualDistributionWithTierSpec { worker_tier_spec } => {
                SelectStrategy::TierAware(TierAwareStrategy::new(worker_tier_spec.clone()))
            }
        }
    }

    pub fn from_behavior(behavior: &BehaviorConfig) -> Self {
        Self::from_config(&behavior.select_strategy)
    }
}

impl Default for SelectStrategy {
    fn default() -> Self {
        SelectStrategy::EqualDistribution(EqualDistributionStrategy::new())
    }
}

impl From<TierAffinityConfig> for SelectStrategy {
    fn from(tier_spec: TierAffinityConfig) -> Self {
        SelectStrategy::TierAware(TierAwareStrategy::new(tier_spec))
    }
}

impl WorkerSelectStrategy for SelectStrategy {
    fn select_worker<'a>(
        &self,
        runner: &RunnerConfig,
        workers: &'a WorkerSet,
        task: &TaskDescriptor,
    ) -> Option<&'a WorkerSnapshot> {
        match self {
            SelectStrategy::EqualDistribution(strategy) => {
                strategy.select_worker(runner, workers, task)
            }
            SelectStrategy::TierAware(strategy) => strategy.select_worker(runner, workers, task),
        }
    }

    fn name(&self) -> &str {
        match self {
            SelectStrategy::EqualDistribution(strategy) => strategy.name(),
            SelectStrategy::TierAware(strategy) => strategy.name(),
        }
    }
}
