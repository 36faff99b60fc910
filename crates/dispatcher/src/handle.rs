use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, warn};

use scheduler_core::{
    config::BehaviorConfig, traits::WorkerSelectStrategy, SchedulerResult,
};

use crate::strategies::SelectStrategy;

/// 当前生效的选择策略，支持热更新
///
/// 更新总是整体替换 `Arc`，正在进行的选择持有旧策略的引用并照常完成，
/// 不会看到半更新的配置。锁只在克隆或替换 `Arc` 时持有。
#[derive(Debug, Default)]
pub struct StrategyHandle {
    current: RwLock<Arc<SelectStrategy>>,
}

impl StrategyHandle {
    pub fn new(strategy: SelectStrategy) -> Self {
        Self {
            current: RwLock::new(Arc::new(strategy)),
        }
    }

    pub fn from_behavior(behavior: &BehaviorConfig) -> Self {
        Self::new(SelectStrategy::from_behavior(behavior))
    }

    /// 获取当前策略
    pub fn current(&self) -> Arc<SelectStrategy> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// 替换当前策略，返回被替换的旧策略
    pub fn replace(&self, strategy: SelectStrategy) -> Arc<SelectStrategy> {
        let next = Arc::new(strategy);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        info!(
            "选择策略已更新: {} -> {}",
            guard.name(),
            next.name()
        );
        std::mem::replace(&mut *guard, next)
    }

    /// 从JSON文档重新加载；文档无效时保留当前策略
    pub fn reload_from_json(&self, json: &str) -> SchedulerResult<()> {
        match BehaviorConfig::from_json_str(json) {
            Ok(behavior) => {
                self.replace(SelectStrategy::from_behavior(&behavior));
                Ok(())
            }
            Err(e) => {
                warn!("Worker行为配置无效，继续使用当前策略: {e}");
                Err(e)
            }
        }
    }

    /// 从文件重新加载；文件无效时保留当前策略
    pub fn reload_from_file(&self, path: &Path) -> SchedulerResult<()> {
        match BehaviorConfig::load(path) {
            Ok(behavior) => {
                self.replace(SelectStrategy::from_behavior(&behavior));
                Ok(())
            }
            Err(e) => {
                warn!(
                    "重新加载 {} 失败，继续使用当前策略: {e}",
                    path.display()
                );
                Err(e)
            }
        }
    }
}
