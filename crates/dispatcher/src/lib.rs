//! Worker选择策略
//!
//! 给定Runner配置、一轮调度的Worker快照集合和一个待分配任务，
//! 选出唯一的Worker或返回None。所有策略都是无副作用的纯函数。

pub mod handle;
pub mod strategies;


pub use handle::StrategyHandle;
pub use strategies::*;
