use crate::{
    config::RunnerConfig,
    models::{TaskDescriptor, WorkerSet, WorkerSnapshot},
};

/// Worker选择策略接口
///
/// 实现必须是纯函数：不修改输入、不做IO、对同一组输入总是返回同一个结果，
/// 因此可以在多个线程中针对同一个 `workers` 并发调用。
///
/// 前置条件：`workers` 中的快照与策略持有的配置都已在边界处校验
/// （`total_capacity >= 1`、Tier规则结构合法）。策略不会重复校验。
///
/// 返回 `None` 表示本轮没有合适的Worker，这是正常的背压信号，
/// 调用方应在后续周期重试，而不是当作错误处理。
pub trait WorkerSelectStrategy: Send + Sync {
    /// 选择Worker执行任务
    fn select_worker<'a>(
        &self,
        runner: &RunnerConfig,
        workers: &'a WorkerSet,
        task: &TaskDescriptor,
    ) -> Option<&'a WorkerSnapshot>;

    /// 获取策略名称
    fn name(&self) -> &str;
}
