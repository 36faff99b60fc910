//! 调度循环的参考实现：对一批任务依次做Worker选择
//!
//! 选择策略只保证“在给定快照上正确”。这里负责调用方的那一半职责：
//! 分配前重新校验，分配后用新快照替换被选中的Worker，
//! 保证同一批次里后面的任务能看到已经被占用的槽位。

use std::path::Path;

use anyhow::{Context, Result};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use scheduler_core::{
    build_worker_set, RunnerConfig, TaskDescriptor, WorkerRecord, WorkerSelectStrategy, WorkerSet,
};
use scheduler_dispatcher::is_eligible;

/// 单个任务的分配结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PlacementDecision {
    Assigned { task_id: String, worker: String },
    /// 本轮没有合适的Worker，任务留在队列中等待下一轮
    Pending { task_id: String },
}

impl PlacementDecision {
    pub fn task_id(&self) -> &str {
        match self {
            PlacementDecision::Assigned { task_id, .. }
            | PlacementDecision::Pending { task_id } => task_id,
        }
    }

    pub fn worker(&self) -> Option<&str> {
        match self {
            PlacementDecision::Assigned { worker, .. } => Some(worker),
            PlacementDecision::Pending { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementSummary {
    pub assigned: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementReport {
    pub strategy: String,
    pub decisions: Vec<PlacementDecision>,
    pub summary: PlacementSummary,
}

/// 一次批量分配
pub struct PlacementPass<'s> {
    strategy: &'s dyn WorkerSelectStrategy,
    runner: RunnerConfig,
    workers: WorkerSet,
    summary: PlacementSummary,
}

impl<'s> PlacementPass<'s> {
    pub fn new(
        strategy: &'s dyn WorkerSelectStrategy,
        runner: RunnerConfig,
        workers: WorkerSet,
    ) -> Self {
        Self {
            strategy,
            runner,
            workers,
            summary: PlacementSummary::default(),
        }
    }

    /// 当前的本地Worker视图（包含本批次已分配的任务）
    pub fn workers(&self) -> &WorkerSet {
        &self.workers
    }

    pub fn summary(&self) -> &PlacementSummary {
        &self.summary
    }

    /// 为单个任务选择Worker并更新本地视图
    pub fn place(&mut self, task: &TaskDescriptor) -> PlacementDecision {
        let chosen = self
            .strategy
            .select_worker(&self.runner, &self.workers, task)
            .map(|worker| worker.identity().to_string());

        let Some(worker_id) = chosen else {
            info!(
                "任务 {} (类型: {}, 数据集: {}) 暂无可用Worker，等待下一轮调度",
                task.id, task.task_type, task.dataset
            );
            return self.pending(task);
        };

        let Some(current) = self.workers.get(&worker_id) else {
            warn!("策略 {} 返回了未知的Worker: {}", self.strategy.name(), worker_id);
            return self.pending(task);
        };
        if !is_eligible(&self.runner, current, task) {
            warn!("Worker {} 重新校验失败，任务 {} 留待下一轮", worker_id, task.id);
            return self.pending(task);
        }

        let next = current.with_assigned_task(task);
        debug!(
            "任务 {} 分配到Worker {} (剩余容量: {})",
            task.id,
            worker_id,
            next.remaining_capacity()
        );
        self.workers.insert(worker_id.clone(), next);

        self.summary.assigned += 1;
        counter!("worker_select_placements_total", "outcome" => "assigned").increment(1);

        PlacementDecision::Assigned {
            task_id: task.id.clone(),
            worker: worker_id,
        }
    }

    fn pending(&mut self, task: &TaskDescriptor) -> PlacementDecision {
        self.summary.pending += 1;
        counter!("worker_select_placements_total", "outcome" => "pending").increment(1);
        PlacementDecision::Pending {
            task_id: task.id.clone(),
        }
    }

    /// 按顺序分配一批任务
    pub fn run(mut self, tasks: &[TaskDescriptor]) -> PlacementReport {
        let decisions: Vec<PlacementDecision> = tasks.iter().map(|task| self.place(task)).collect();

        info!(
            "本轮分配完成: 策略 {}, 已分配 {}, 等待 {}",
            self.strategy.name(),
            self.summary.assigned,
            self.summary.pending
        );

        PlacementReport {
            strategy: self.strategy.name().to_string(),
            decisions,
            summary: self.summary,
        }
    }
}

/// 读取Worker快照文件（`WorkerRecord` 的JSON数组）
pub async fn load_workers(path: &Path) -> Result<WorkerSet> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("读取Worker快照失败: {}", path.display()))?;
    let records: Vec<WorkerRecord> = serde_json::from_str(&content)
        .with_context(|| format!("解析Worker快照失败: {}", path.display()))?;
    build_worker_set(records).context("Worker快照校验失败")
}

/// 读取任务文件（`TaskDescriptor` 的JSON数组）
pub async fn load_tasks(path: &Path) -> Result<Vec<TaskDescriptor>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("读取任务文件失败: {}", path.display()))?;
    let tasks: Vec<TaskDescriptor> = serde_json::from_str(&content)
        .with_context(|| format!("解析任务文件失败: {}", path.display()))?;
    for task in &tasks {
        task.validate().context("任务校验失败")?;
    }
    Ok(tasks)
}
